// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Reaction loop command
//!
//! Feeds an observation stream through interpret/react and prints the chosen
//! output for each observation. Memory is resumed from the configured data
//! directory and every pending snapshot is flushed before exit.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde_json::json;
use tracing::info;

use autodiscover_cortex::application::AssociationEngine;
use autodiscover_cortex::domain::CortexConfig;

use crate::observation::ObservationReader;

#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// JSON-lines observation file (default: stdin)
    #[arg(short, long, value_name = "FILE")]
    pub observations: Option<PathBuf>,

    /// Seed the exploration RNG for reproducible runs
    #[arg(long)]
    pub seed: Option<u64>,

    /// Emit one JSON object per observation instead of plain text
    #[arg(long)]
    pub json: bool,
}

/// Counters reported once the stream is exhausted
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub observations: usize,
    pub interpreted: usize,
    pub reacted: usize,
}

pub async fn handle_command(args: RunArgs, config_override: Option<PathBuf>) -> Result<()> {
    let config = CortexConfig::load_or_default(config_override)
        .context("Failed to load configuration")?;

    let memory = super::load_snapshot(&config).await?;
    if memory.is_some() {
        info!("Resuming from stored memory");
    }

    let mut builder = AssociationEngine::builder()
        .config(&config)
        .memory(memory.unwrap_or_default());
    if let Some(seed) = args.seed {
        builder = builder.seed(seed);
    }
    let mut engine = builder.build().context("Stored memory is inconsistent")?;

    let reader: Box<dyn BufRead> = match &args.observations {
        Some(path) => Box::new(BufReader::new(
            File::open(path)
                .with_context(|| format!("Failed to open observations {}", path.display()))?,
        )),
        None => Box::new(BufReader::new(io::stdin())),
    };

    // blocking reads; the snapshot writer keeps running on the other workers
    let summary = tokio::task::block_in_place(|| {
        let stdout = io::stdout();
        process(&mut engine, reader, &mut stdout.lock(), args.json)
    })?;

    engine.flush().await;

    eprintln!(
        "{}",
        format!(
            "✓ {} observations, {} interpreted, {} reactions",
            summary.observations, summary.interpreted, summary.reacted
        )
        .green()
    );
    Ok(())
}

/// Run every observation from `reader` through the engine, writing one line
/// per observation to `out`
pub fn process<R: BufRead, W: Write>(
    engine: &mut AssociationEngine,
    reader: R,
    out: &mut W,
    json: bool,
) -> Result<RunSummary> {
    let mut summary = RunSummary::default();

    for observation in ObservationReader::new(reader) {
        let observation = observation?;
        summary.observations += 1;

        let input = engine
            .interpret(&observation.history, &observation.source)
            .map(|input| input.id.clone());
        if input.is_some() {
            summary.interpreted += 1;
        }

        let output = engine.react(input.as_ref());
        if output.is_some() {
            summary.reacted += 1;
        }

        let input = input.as_ref().map(|id| id.as_str());
        let cmd = output.as_ref().map(|output| output.cmd.as_str());
        if json {
            writeln!(out, "{}", json!({ "input": input, "output": cmd }))?;
        } else {
            writeln!(out, "{}\t{}", input.unwrap_or("-"), cmd.unwrap_or("-"))?;
        }
    }

    Ok(summary)
}

// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Memory inspection command

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use autodiscover_cortex::domain::{CortexConfig, Memory};

#[derive(Args, Debug, Clone)]
pub struct InspectArgs {
    /// Number of strongest reactions to list
    #[arg(long, default_value_t = 10)]
    pub top: usize,
}

pub async fn handle_command(args: InspectArgs, config_override: Option<PathBuf>) -> Result<()> {
    let config = CortexConfig::load_or_default(config_override)
        .context("Failed to load configuration")?;

    let Some(snapshot_path) = config.snapshot_path() else {
        println!("{}", "Persistence is disabled (no data_path configured)".yellow());
        return Ok(());
    };

    let Some(memory) = super::load_snapshot(&config).await? else {
        println!(
            "{} {}",
            "No memory stored at".yellow(),
            snapshot_path.display()
        );
        return Ok(());
    };

    memory.validate().context("Stored memory is inconsistent")?;

    println!("{} {}", "Memory:".bold(), snapshot_path.display().to_string().dimmed());
    println!();
    for line in render(&memory, args.top) {
        println!("{}", line);
    }

    Ok(())
}

/// Plain-text report: totals followed by the strongest reactions
pub fn render(memory: &Memory, top: usize) -> Vec<String> {
    let stats = memory.stats();
    let mut lines = vec![
        format!("  Inputs:        {}", stats.inputs),
        format!("  Outputs:       {}", stats.outputs),
        format!("  Reactions:     {}", stats.reactions),
        format!("  Total uses:    {}", stats.total_uses),
        format!("  Mean affinity: {:.3}", stats.mean_affinity),
    ];

    let strongest = memory.strongest_reactions(top);
    if strongest.is_empty() {
        return lines;
    }

    lines.push(String::new());
    lines.push(format!("Strongest reactions (top {}):", strongest.len()));
    for (id, reaction) in strongest {
        lines.push(format!(
            "  {:<5} {:>6.3}  used {:<4} {} -> {}",
            id.to_string(),
            reaction.affinity,
            reaction.used,
            reaction.input.as_ref().map(|i| i.as_str()).unwrap_or("-"),
            reaction.output.as_ref().map(|o| o.as_str()).unwrap_or("-"),
        ));
    }
    lines
}

// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # autodiscover CLI
//!
//! The `autodiscover` binary drives a reaction cortex from a stream of
//! observations and inspects what it has learned.
//!
//! ## Commands
//!
//! - `autodiscover run [--observations FILE]` - Interpret and react to observations
//! - `autodiscover inspect [--top N]` - Summarize stored memory
//! - `autodiscover config show|validate|generate` - Configuration management

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use autodiscover::commands::{self, ConfigCommand, InspectArgs, RunArgs};

/// autodiscover - learn which device commands follow which signals
#[derive(Parser)]
#[command(name = "autodiscover")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(
        short,
        long,
        global = true,
        env = "AUTODISCOVER_CONFIG_PATH",
        value_name = "FILE"
    )]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "AUTODISCOVER_LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Feed observations through the reaction loop
    #[command(name = "run")]
    Run(RunArgs),

    /// Summarize the stored memory snapshot
    #[command(name = "inspect")]
    Inspect(InspectArgs),

    /// Configuration management
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_level)?;

    match cli.command {
        Commands::Run(args) => commands::run::handle_command(args, cli.config).await,
        Commands::Inspect(args) => commands::inspect::handle_command(args, cli.config).await,
        Commands::Config { command } => {
            commands::config::handle_command(command, cli.config).await
        }
    }
}

/// Initialize tracing subscriber for logging
fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    // stdout carries reaction output
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    Ok(())
}

// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Configuration management commands
//!
//! Commands: show, validate, generate

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use autodiscover_cortex::domain::{CortexConfig, CONFIG_PATH_ENV, DATA_PATH_ENV, DEFAULT_CONFIG_FILE};

const SAMPLE_CONFIG: &str = include_str!("../../templates/autodiscover.yaml");

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Show config file paths checked
        #[arg(long)]
        paths: bool,

        /// Print the effective configuration as YAML
        #[arg(long)]
        yaml: bool,
    },

    /// Validate configuration file
    Validate {
        /// Path to config file (default: discover)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Generate sample configuration
    Generate {
        /// Output path
        #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
        output: PathBuf,
    },
}

pub async fn handle_command(
    command: ConfigCommand,
    config_override: Option<PathBuf>,
) -> Result<()> {
    match command {
        ConfigCommand::Show { paths, yaml } => show(config_override, paths, yaml).await,
        ConfigCommand::Validate { file } => validate(file.or(config_override)).await,
        ConfigCommand::Generate { output } => generate(output).await,
    }
}

async fn show(config_override: Option<PathBuf>, show_paths: bool, yaml: bool) -> Result<()> {
    let config = CortexConfig::load_or_default(config_override.clone())
        .context("Failed to load configuration")?;

    if show_paths {
        println!("{}", "Configuration discovery paths:".bold());
        if let Some(path) = &config_override {
            println!("  1. --config flag: {}", path.display());
        } else {
            println!("  1. --config flag: {}", "(not set)".dimmed());
        }
        println!(
            "  2. {}: {}",
            CONFIG_PATH_ENV,
            std::env::var(CONFIG_PATH_ENV)
                .unwrap_or_else(|_| "(not set)".to_string())
                .dimmed()
        );
        println!("  3. ./{}", DEFAULT_CONFIG_FILE);
        println!();
    }

    if yaml {
        print!("{}", config.to_yaml_string()?);
        return Ok(());
    }

    println!("{}", "Current configuration:".bold());
    println!();

    println!("  Delimiter: {:?}", config.delimiter);
    match config.snapshot_path() {
        Some(path) => println!("  Snapshot:  {}", path.display()),
        None => println!("  Snapshot:  {}", "(persistence disabled)".dimmed()),
    }
    if let Ok(value) = std::env::var(DATA_PATH_ENV) {
        println!("  {} {}", "Overridden by".dimmed(), format!("{}={}", DATA_PATH_ENV, value).dimmed());
    }
    println!();

    println!("{}", "Devices:".bold());
    if config.devices.is_empty() {
        println!("  {}", "(none, exploration disabled)".dimmed());
    }
    for device in &config.devices {
        println!("  {} ({} commands)", device.id.bold(), device.commands.len());
        for command in &device.commands {
            println!("    - {}.{}", device.id, command);
        }
    }
    println!();

    Ok(())
}

async fn validate(config_path: Option<PathBuf>) -> Result<()> {
    println!("Validating configuration...");

    let config = CortexConfig::load_or_default(config_path)
        .context("Failed to load configuration")?;

    config
        .validate()
        .context("Configuration validation failed")?;

    println!("{}", "✓ Configuration is valid".green());

    Ok(())
}

async fn generate(output: PathBuf) -> Result<()> {
    std::fs::write(&output, SAMPLE_CONFIG)
        .with_context(|| format!("Failed to write config to {:?}", output))?;

    println!(
        "{}",
        format!("✓ Configuration generated: {}", output.display()).green()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_config_is_valid() {
        let config = CortexConfig::from_yaml_str(SAMPLE_CONFIG).unwrap();
        config.validate().unwrap();
        assert_eq!(config.devices.len(), 2);
        assert!(config.data_path.is_some());
    }

    #[tokio::test]
    async fn test_generate_writes_sample() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("autodiscover.yaml");

        generate(output.clone()).await.unwrap();

        let written = CortexConfig::from_yaml_file(&output).unwrap();
        assert_eq!(written, CortexConfig::from_yaml_str(SAMPLE_CONFIG).unwrap());
    }
}

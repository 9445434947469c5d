// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Cortex Configuration
//
// YAML-backed settings for an association engine:
// - delimiter joining an input's source and vector code
// - devices available for exploration and their commands
// - optional data directory for memory snapshots (absent => no persistence)

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_DELIMITER: &str = "|";
pub const DEFAULT_CONFIG_FILE: &str = "autodiscover.yaml";
pub const CONFIG_PATH_ENV: &str = "AUTODISCOVER_CONFIG_PATH";
pub const DATA_PATH_ENV: &str = "AUTODISCOVER_DATA_PATH";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CortexConfig {
    /// Separator between source and vector code in input ids
    #[serde(default = "default_delimiter")]
    pub delimiter: String,

    /// Directory receiving `memory.json` snapshots
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_path: Option<PathBuf>,

    /// Devices offered to the engine for exploration
    #[serde(default)]
    pub devices: Vec<DeviceConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceConfig {
    pub id: String,
    pub commands: Vec<String>,
}

fn default_delimiter() -> String {
    DEFAULT_DELIMITER.to_string()
}

impl Default for CortexConfig {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
            data_path: None,
            devices: Vec::new(),
        }
    }
}

impl CortexConfig {
    /// Load configuration from YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    /// Parse configuration from YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    pub fn to_yaml_string(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Discover configuration file using precedence order
    /// 1. AUTODISCOVER_CONFIG_PATH environment variable
    /// 2. ./autodiscover.yaml (working directory)
    pub fn discover_config() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        let cwd = PathBuf::from(DEFAULT_CONFIG_FILE);
        if cwd.exists() {
            return Some(cwd);
        }

        None
    }

    /// Load configuration with discovery, fallback to default
    pub fn load_or_default(cli_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut config = match cli_path.or_else(Self::discover_config) {
            Some(path) => {
                tracing::info!("Loading configuration from {:?}", path);
                Self::from_yaml_file(&path)?
            }
            None => {
                tracing::warn!("No configuration file found. Using defaults.");
                Self::default()
            }
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides to configuration
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var(DATA_PATH_ENV) {
            if val.is_empty() {
                tracing::info!("Environment override: {} is empty, persistence disabled", DATA_PATH_ENV);
                self.data_path = None;
            } else {
                tracing::info!("Environment override: {}={}", DATA_PATH_ENV, val);
                self.data_path = Some(PathBuf::from(val));
            }
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.delimiter.is_empty() {
            return Err(ConfigError::Invalid("delimiter cannot be empty".to_string()));
        }

        let mut seen = HashSet::new();
        for device in &self.devices {
            if device.id.is_empty() {
                return Err(ConfigError::Invalid("device id cannot be empty".to_string()));
            }
            if device.id.contains('.') {
                return Err(ConfigError::Invalid(format!(
                    "device id '{}' cannot contain '.'",
                    device.id
                )));
            }
            if !seen.insert(device.id.as_str()) {
                return Err(ConfigError::Invalid(format!("duplicate device id '{}'", device.id)));
            }
            if device.commands.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "device '{}' must have at least one command",
                    device.id
                )));
            }
            if device.commands.iter().any(|c| c.is_empty()) {
                return Err(ConfigError::Invalid(format!(
                    "device '{}' has an empty command",
                    device.id
                )));
            }
        }

        Ok(())
    }

    /// Location of the memory snapshot, if persistence is enabled
    pub fn snapshot_path(&self) -> Option<PathBuf> {
        self.data_path.as_ref().map(|dir| dir.join(super::persistence::SNAPSHOT_FILE))
    }
}

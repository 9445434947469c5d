// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Command implementations for autodiscover CLI

pub mod config;
pub mod inspect;
pub mod run;

pub use self::config::ConfigCommand;
pub use self::inspect::InspectArgs;
pub use self::run::RunArgs;

use anyhow::{Context, Result};
use autodiscover_cortex::domain::{CortexConfig, Memory};
use autodiscover_cortex::infrastructure::JsonFileSnapshotStore;

/// Load the stored memory snapshot for a configuration, if persistence is
/// enabled and a snapshot exists
pub(crate) async fn load_snapshot(config: &CortexConfig) -> Result<Option<Memory>> {
    let Some(data_path) = &config.data_path else {
        return Ok(None);
    };

    let store = JsonFileSnapshotStore::new(data_path);
    store
        .load()
        .await
        .with_context(|| format!("Failed to load memory from {}", store.snapshot_path().display()))
}

// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Snapshot Sink - durable storage for memory snapshots
//!
//! The engine queues a full [`Memory`] snapshot after every reaction and
//! never waits for the result. Snapshots reach the sink one at a time, newest
//! last; ones superseded while a write is in flight are skipped. Failures
//! surface through the event bus, not to the caller.

use async_trait::async_trait;
use thiserror::Error;

use super::memory::Memory;

/// File name of the snapshot inside a data directory
pub const SNAPSHOT_FILE: &str = "memory.json";

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("no async runtime available to dispatch the write")]
    NoRuntime,

    #[error("write task failed: {0}")]
    Task(String),
}

#[async_trait]
pub trait SnapshotSink: Send + Sync {
    /// Store the snapshot, replacing whatever was stored before
    async fn persist(&self, snapshot: &Memory) -> Result<(), PersistenceError>;
}

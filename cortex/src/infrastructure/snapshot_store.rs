// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Memory snapshot stores
//!
//! - [`JsonFileSnapshotStore`]: pretty-printed JSON at `<data_path>/memory.json`
//! - [`InMemorySnapshotStore`]: keeps every snapshot, for tests and embedding

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::io::AsyncWriteExt;

use crate::domain::{Memory, PersistenceError, SnapshotSink, SNAPSHOT_FILE};

/// Distinguishes temp files of concurrent writers in one process
static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Local filesystem snapshot store
///
/// Each write goes to a temp file in the data directory which is then
/// renamed over `memory.json`, so readers see either the previous snapshot
/// or the new one in full. Writes through one store (and its clones) are
/// serialized.
#[derive(Debug, Clone)]
pub struct JsonFileSnapshotStore {
    data_path: PathBuf,
    write_lock: Arc<tokio::sync::Mutex<()>>,
}

impl JsonFileSnapshotStore {
    pub fn new(data_path: impl Into<PathBuf>) -> Self {
        Self {
            data_path: data_path.into(),
            write_lock: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.data_path.join(SNAPSHOT_FILE)
    }

    fn temp_path(&self) -> PathBuf {
        let n = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        self.data_path
            .join(format!("{}.tmp-{}-{}", SNAPSHOT_FILE, std::process::id(), n))
    }

    async fn write_atomically(&self, temp_path: &Path, json: &[u8]) -> std::io::Result<()> {
        let mut file = tokio::fs::File::create(temp_path).await?;
        file.write_all(json).await?;
        file.sync_all().await?;
        drop(file);
        tokio::fs::rename(temp_path, self.snapshot_path()).await
    }

    /// Read the stored snapshot; `Ok(None)` if nothing was written yet
    pub async fn load(&self) -> Result<Option<Memory>, PersistenceError> {
        let path = self.snapshot_path();
        let content = match tokio::fs::read(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let memory = serde_json::from_slice(&content)?;
        tracing::debug!(path = %path.display(), "Loaded memory snapshot");
        Ok(Some(memory))
    }
}

#[async_trait]
impl SnapshotSink for JsonFileSnapshotStore {
    async fn persist(&self, snapshot: &Memory) -> Result<(), PersistenceError> {
        let json = serde_json::to_vec_pretty(snapshot)?;
        let _guard = self.write_lock.lock().await;

        tokio::fs::create_dir_all(&self.data_path).await?;
        let temp_path = self.temp_path();
        if let Err(e) = self.write_atomically(&temp_path, &json).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(e.into());
        }
        Ok(())
    }
}

/// In-memory snapshot store for testing
#[derive(Debug, Default)]
pub struct InMemorySnapshotStore {
    snapshots: Mutex<Vec<Memory>>,
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot_count(&self) -> usize {
        self.snapshots.lock().len()
    }

    pub fn latest(&self) -> Option<Memory> {
        self.snapshots.lock().last().cloned()
    }
}

#[async_trait]
impl SnapshotSink for InMemorySnapshotStore {
    async fn persist(&self, snapshot: &Memory) -> Result<(), PersistenceError> {
        self.snapshots.lock().push(snapshot.clone());
        Ok(())
    }
}

// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Background snapshot writer
//!
//! One task per engine drains a `watch` channel holding the newest snapshot.
//! Snapshots submitted while a write is in flight replace each other, so at
//! most one is pending and writes land in submission order.

use std::sync::Arc;

use chrono::Utc;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::application::EventBus;
use crate::domain::{CortexEvent, Memory, PersistenceError, SnapshotSink};

#[derive(Clone)]
struct Snapshot {
    sequence: u64,
    memory: Arc<Memory>,
}

pub struct SnapshotWriter {
    snapshots: watch::Sender<Option<Snapshot>>,
    written: watch::Receiver<u64>,
    submitted: u64,
    task: JoinHandle<()>,
}

impl SnapshotWriter {
    /// Start the writer task on `handle`
    pub fn spawn(
        handle: &Handle,
        sink: Arc<dyn SnapshotSink>,
        event_bus: Option<Arc<dyn EventBus>>,
    ) -> Self {
        let (snapshots, receiver) = watch::channel(None);
        let (written_tx, written) = watch::channel(0);
        let task = handle.spawn(write_loop(sink, event_bus, receiver, written_tx));

        Self {
            snapshots,
            written,
            submitted: 0,
            task,
        }
    }

    /// Queue `memory` as the next snapshot, replacing any snapshot not yet
    /// picked up by the writer
    pub fn submit(&mut self, memory: Memory) {
        self.submitted += 1;
        self.snapshots.send_replace(Some(Snapshot {
            sequence: self.submitted,
            memory: Arc::new(memory),
        }));
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Whether the latest submitted snapshot is still waiting to be written
    pub fn is_pending(&self) -> bool {
        *self.written.borrow() < self.submitted
    }

    /// Wait until the latest submitted snapshot has been handed to the sink
    pub async fn flush(&mut self) -> Result<(), PersistenceError> {
        let target = self.submitted;
        match self.written.wait_for(|&written| written >= target).await {
            Ok(_) => Ok(()),
            Err(_) => Err(PersistenceError::Task(
                "snapshot writer stopped before the last snapshot was written".to_string(),
            )),
        }
    }
}

async fn write_loop(
    sink: Arc<dyn SnapshotSink>,
    event_bus: Option<Arc<dyn EventBus>>,
    mut snapshots: watch::Receiver<Option<Snapshot>>,
    written: watch::Sender<u64>,
) {
    while snapshots.changed().await.is_ok() {
        let current: Option<Snapshot> = (*snapshots.borrow_and_update()).clone();
        let Some(snapshot) = current else {
            continue;
        };

        match sink.persist(&snapshot.memory).await {
            Ok(()) => {
                let reactions = snapshot.memory.reactions().len();
                debug!(sequence = snapshot.sequence, reactions, "Persisted memory snapshot");
                if let Some(bus) = event_bus.as_ref() {
                    bus.publish(CortexEvent::MemoryPersisted {
                        reactions,
                        timestamp: Utc::now(),
                    });
                }
            }
            Err(e) => report_failure(event_bus.as_ref(), e),
        }
        written.send_replace(snapshot.sequence);
    }
}

pub(crate) fn report_failure(event_bus: Option<&Arc<dyn EventBus>>, error: PersistenceError) {
    warn!("Memory snapshot write failed: {}", error);
    if let Some(bus) = event_bus {
        bus.publish(CortexEvent::PersistenceFailed {
            error: error.to_string(),
            timestamp: Utc::now(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::InMemorySnapshotStore;
    use async_trait::async_trait;
    use tokio::sync::Semaphore;

    /// Holds every write until a permit is released
    struct GatedSink {
        gate: Semaphore,
        inner: InMemorySnapshotStore,
    }

    #[async_trait]
    impl SnapshotSink for GatedSink {
        async fn persist(&self, snapshot: &Memory) -> Result<(), PersistenceError> {
            let permit = self
                .gate
                .acquire()
                .await
                .map_err(|e| PersistenceError::Task(e.to_string()))?;
            permit.forget();
            self.inner.persist(snapshot).await
        }
    }

    fn memory_with(reactions: usize) -> Memory {
        let mut memory = Memory::new();
        for _ in 0..reactions {
            memory.push_reaction(crate::domain::Reaction::new(None, None));
        }
        memory
    }

    #[tokio::test]
    async fn test_flush_waits_for_latest_snapshot() {
        let store = Arc::new(InMemorySnapshotStore::new());
        let mut writer = SnapshotWriter::spawn(&Handle::current(), store.clone(), None);

        for n in 1..=5 {
            writer.submit(memory_with(n));
        }
        writer.flush().await.unwrap();

        assert!(!writer.is_pending());
        assert_eq!(store.latest(), Some(memory_with(5)));
    }

    #[tokio::test]
    async fn test_submissions_coalesce_while_writing() {
        let sink = Arc::new(GatedSink {
            gate: Semaphore::new(0),
            inner: InMemorySnapshotStore::new(),
        });
        let mut writer = SnapshotWriter::spawn(&Handle::current(), sink.clone(), None);

        // first write blocks in the sink, the rest pile up behind it
        writer.submit(memory_with(1));
        tokio::task::yield_now().await;
        for n in 2..=10 {
            writer.submit(memory_with(n));
        }
        assert!(writer.is_pending());

        sink.gate.add_permits(10);
        writer.flush().await.unwrap();

        let count = sink.inner.snapshot_count();
        assert!((1..=2).contains(&count), "wrote {count} snapshots");
        assert_eq!(sink.inner.latest(), Some(memory_with(10)));
    }

    #[tokio::test]
    async fn test_flush_without_submissions() {
        let store = Arc::new(InMemorySnapshotStore::new());
        let mut writer = SnapshotWriter::spawn(&Handle::current(), store.clone(), None);

        writer.flush().await.unwrap();
        assert!(writer.is_running());
        assert_eq!(store.snapshot_count(), 0);
    }
}

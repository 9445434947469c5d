// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Infrastructure layer for the reaction cortex

pub mod devices;
pub mod event_bus;
pub mod recognizer;
pub mod snapshot_store;

pub use devices::CommandDevice;
pub use event_bus::{BroadcastEventBus, EventBusError, EventReceiver};
pub use recognizer::DeltaPatternRecognizer;
pub use snapshot_store::{InMemorySnapshotStore, JsonFileSnapshotStore};

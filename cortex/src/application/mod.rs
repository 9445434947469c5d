// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod association_engine;
pub mod selection;
pub mod snapshot_writer;

pub use association_engine::*;
pub use selection::*;
pub use snapshot_writer::SnapshotWriter;

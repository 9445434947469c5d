// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Mod
//!
//! Provides the reaction cortex domain model.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Inputs, outputs, reactions and the memory that owns them,
//!   plus the collaborator contracts the engine consumes

pub mod config;
pub mod device;
pub mod entropy;
pub mod events;
pub mod input;
pub mod memory;
pub mod output;
pub mod pattern;
pub mod persistence;
pub mod reaction;

pub use config::*;
pub use device::*;
pub use entropy::*;
pub use events::*;
pub use input::*;
pub use memory::*;
pub use output::*;
pub use pattern::*;
pub use persistence::*;
pub use reaction::*;

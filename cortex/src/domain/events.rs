// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Domain events for the reaction cortex
//! Published to the EventBus for observability and integration

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::input::InputId;
use super::output::OutputCmd;
use super::reaction::ReactionId;

/// Cortex domain events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CortexEvent {
    /// A history produced an input that was not known before
    InputDiscovered {
        input_id: InputId,
        source: String,
        vector_code: String,
        timestamp: DateTime<Utc>,
    },

    /// A new variant history was attached to an existing input
    InputGeneralized {
        input_id: InputId,
        history: String,
        related_count: usize,
        timestamp: DateTime<Utc>,
    },

    /// Exploration produced a new output
    OutputSynthesized {
        cmd: OutputCmd,
        timestamp: DateTime<Utc>,
    },

    /// No existing reaction matched, so one was created
    ReactionCreated {
        reaction_id: ReactionId,
        input_id: Option<InputId>,
        output_cmd: Option<OutputCmd>,
        timestamp: DateTime<Utc>,
    },

    /// A reaction was selected and strengthened
    ReactionReinforced {
        reaction_id: ReactionId,
        old_affinity: f64,
        new_affinity: f64,
        used: u64,
        timestamp: DateTime<Utc>,
    },

    /// A memory snapshot reached its sink
    MemoryPersisted {
        reactions: usize,
        timestamp: DateTime<Utc>,
    },

    /// A memory snapshot could not be stored
    PersistenceFailed {
        error: String,
        timestamp: DateTime<Utc>,
    },
}

impl CortexEvent {
    /// Get the timestamp of the event
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            CortexEvent::InputDiscovered { timestamp, .. } => *timestamp,
            CortexEvent::InputGeneralized { timestamp, .. } => *timestamp,
            CortexEvent::OutputSynthesized { timestamp, .. } => *timestamp,
            CortexEvent::ReactionCreated { timestamp, .. } => *timestamp,
            CortexEvent::ReactionReinforced { timestamp, .. } => *timestamp,
            CortexEvent::MemoryPersisted { timestamp, .. } => *timestamp,
            CortexEvent::PersistenceFailed { timestamp, .. } => *timestamp,
        }
    }

    /// Get the event type as a string
    pub fn event_type(&self) -> &'static str {
        match self {
            CortexEvent::InputDiscovered { .. } => "input_discovered",
            CortexEvent::InputGeneralized { .. } => "input_generalized",
            CortexEvent::OutputSynthesized { .. } => "output_synthesized",
            CortexEvent::ReactionCreated { .. } => "reaction_created",
            CortexEvent::ReactionReinforced { .. } => "reaction_reinforced",
            CortexEvent::MemoryPersisted { .. } => "memory_persisted",
            CortexEvent::PersistenceFailed { .. } => "persistence_failed",
        }
    }
}

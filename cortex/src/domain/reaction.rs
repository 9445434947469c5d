// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # Reaction
//!
//! A learned link between one input and one output. Either side may be
//! absent while the reaction waits for a partner.
//!
//! Reactions live in a single arena owned by [`Memory`](super::memory::Memory)
//! and are never removed, so a [`ReactionId`] stays valid for the lifetime of
//! the memory (and across snapshots).
//!
//! ## Affinity
//!
//! Affinity starts at 0 and is capped at [`AFFINITY_MAX`]. Selection favours
//! high affinity cubically (see [`selection_weight`]); anything at or below
//! zero is never selected from memory.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::input::InputId;
use super::output::OutputCmd;

pub const AFFINITY_MAX: f64 = 1.0;
pub const AFFINITY_MIN: f64 = -1.0;

/// Upper bound (exclusive) of a single reinforcement increment
pub const REINFORCEMENT_STEP: f64 = 0.25;

/// Number of weight levels per unit of affinity
const WEIGHT_LEVELS: f64 = 20.0;

/// Index of a reaction in the memory arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReactionId(pub usize);

impl fmt::Display for ReactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reaction {
    pub input: Option<InputId>,
    pub output: Option<OutputCmd>,
    pub affinity: f64,
    pub used: u64,
    pub last_used: Option<DateTime<Utc>>,
}

impl Reaction {
    pub fn new(input: Option<InputId>, output: Option<OutputCmd>) -> Self {
        Self {
            input,
            output,
            affinity: 0.0,
            used: 0,
            last_used: None,
        }
    }

    /// Whether this reaction links the given sides.
    ///
    /// With both sides present both must match; with one side present only
    /// that side is compared. Nothing matches when both are absent.
    pub fn matches(&self, input: Option<&InputId>, output: Option<&OutputCmd>) -> bool {
        match (input, output) {
            (Some(input), Some(output)) => {
                self.input.as_ref() == Some(input) && self.output.as_ref() == Some(output)
            }
            (Some(input), None) => self.input.as_ref() == Some(input),
            (None, Some(output)) => self.output.as_ref() == Some(output),
            (None, None) => false,
        }
    }

    /// Strengthen the reaction by `increment` (expected in `[0, REINFORCEMENT_STEP)`).
    /// Returns the affinity before the update.
    pub fn reinforce(&mut self, increment: f64, now: DateTime<Utc>) -> f64 {
        let old = self.affinity;
        self.last_used = Some(now);
        self.affinity = (self.affinity + increment).min(AFFINITY_MAX);
        self.used += 1;
        old
    }

    /// Weaken the reaction. The engine never calls this; it exists for
    /// callers that feed negative experiences back into memory.
    pub fn penalize(&mut self, amount: f64) -> f64 {
        let old = self.affinity;
        self.affinity = (self.affinity - amount.abs()).max(AFFINITY_MIN);
        old
    }

    pub fn selection_weight(&self) -> u64 {
        selection_weight(self.affinity)
    }
}

/// `floor(affinity * 20)^3`, with non-positive levels mapped to 0.
///
/// | affinity | weight |
/// |----------|--------|
/// | 1.0      | 8000   |
/// | 0.75     | 3375   |
/// | 0.5      | 1000   |
/// | 0.25     | 125    |
/// | <= 0     | 0      |
pub fn selection_weight(affinity: f64) -> u64 {
    let level = (affinity * WEIGHT_LEVELS).floor();
    // NaN fails this comparison as well
    if !(level > 0.0) {
        return 0;
    }
    (level as u64).saturating_pow(3)
}

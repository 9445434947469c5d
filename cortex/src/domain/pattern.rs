// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use serde::{Deserialize, Serialize};

/// Identity derived from an observation history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pattern {
    /// Stable code shared by histories describing the same situation
    pub vector_code: String,
    /// Content fingerprint of the exact history
    pub hash: String,
}

/// Turns raw observation histories into patterns.
/// Implementations must be deterministic.
pub trait PatternRecognizer: Send + Sync {
    fn recognize(&self, history: &[f64]) -> Pattern;
}

/// Textual form of a history: samples joined with `,` in shortest notation
pub fn canonical_history(history: &[f64]) -> String {
    history
        .iter()
        .map(|sample| sample.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

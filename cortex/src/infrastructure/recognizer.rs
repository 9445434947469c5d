// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Shape-based pattern recognizer
//!
//! Histories are reduced to the direction of movement between consecutive
//! samples (`+` rise, `-` fall, `=` flat) with repeated directions collapsed,
//! so `1,2,3,2` and `0,5,9,1` share the vector code `+-`. The hash is the
//! SHA-256 of the canonical history and distinguishes the two.

use sha2::{Digest, Sha256};

use crate::domain::{canonical_history, Pattern, PatternRecognizer};

#[derive(Debug, Clone, Copy, Default)]
pub struct DeltaPatternRecognizer {
    /// Changes with an absolute size up to this value count as flat
    tolerance: f64,
}

impl DeltaPatternRecognizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tolerance(tolerance: f64) -> Self {
        Self {
            tolerance: tolerance.abs(),
        }
    }

    fn direction(&self, from: f64, to: f64) -> char {
        let delta = to - from;
        if delta > self.tolerance {
            '+'
        } else if delta < -self.tolerance {
            '-'
        } else {
            '='
        }
    }
}

impl PatternRecognizer for DeltaPatternRecognizer {
    fn recognize(&self, history: &[f64]) -> Pattern {
        let mut vector_code = String::new();
        for pair in history.windows(2) {
            let direction = self.direction(pair[0], pair[1]);
            if !vector_code.ends_with(direction) {
                vector_code.push(direction);
            }
        }
        if vector_code.is_empty() {
            vector_code.push('=');
        }

        let hash = hex::encode(Sha256::digest(canonical_history(history).as_bytes()));

        Pattern { vector_code, hash }
    }
}

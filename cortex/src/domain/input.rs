// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Input records: recognized perceptual events keyed by source and vector code

use std::fmt;

use serde::{Deserialize, Serialize};

use super::pattern::Pattern;
use super::reaction::ReactionId;

/// Input identifier: `source + delimiter + vector_code`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InputId(pub String);

impl InputId {
    pub fn compose(source: &str, delimiter: &str, vector_code: &str) -> Self {
        Self(format!("{source}{delimiter}{vector_code}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InputId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Input {
    pub id: InputId,
    pub source: String,
    pub hash: String,
    pub vector_code: String,
    /// Canonical form of the history that first produced this input
    pub history: String,
    /// Other histories that map to the same id (append-only, no duplicates)
    #[serde(default)]
    pub related: Vec<String>,
    #[serde(default)]
    pub reactions: Vec<ReactionId>,
}

impl Input {
    pub fn new(id: InputId, source: &str, pattern: Pattern, history: String) -> Self {
        Self {
            id,
            source: source.to_string(),
            hash: pattern.hash,
            vector_code: pattern.vector_code,
            history,
            related: Vec::new(),
            reactions: Vec::new(),
        }
    }

    /// Record an alternate history for this input.
    /// Returns true when `history` was new and got appended.
    pub fn generalize(&mut self, history: &str) -> bool {
        if self.history == history || self.related.iter().any(|h| h == history) {
            return false;
        }
        self.related.push(history.to_string());
        true
    }

    /// Link a reaction, ignoring ids already present
    pub fn link(&mut self, reaction: ReactionId) -> bool {
        if self.reactions.contains(&reaction) {
            return false;
        }
        self.reactions.push(reaction);
        true
    }
}

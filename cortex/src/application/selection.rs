// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Affinity-weighted reaction selection
//!
//! Each candidate gets `selection_weight(affinity)` tickets; one ticket is
//! drawn uniformly over the total and resolved with a single binary search
//! over the running totals.

use crate::domain::{Entropy, Input, Memory, ReactionId};

/// Running weight totals for a candidate list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeightedChoice {
    cumulative: Vec<u64>,
}

impl WeightedChoice {
    pub fn new(weights: impl IntoIterator<Item = u64>) -> Self {
        let mut total = 0u64;
        let cumulative = weights
            .into_iter()
            .map(|weight| {
                total = total.saturating_add(weight);
                total
            })
            .collect();
        Self { cumulative }
    }

    pub fn total(&self) -> u64 {
        self.cumulative.last().copied().unwrap_or(0)
    }

    /// Candidate owning `ticket`, where tickets `[0, total)` are laid out in
    /// candidate order
    pub fn index_for(&self, ticket: u64) -> Option<usize> {
        if ticket >= self.total() {
            return None;
        }
        Some(self.cumulative.partition_point(|&running| running <= ticket))
    }

    /// Draw a candidate; `None` when every weight is zero
    pub fn sample(&self, entropy: &mut dyn Entropy) -> Option<usize> {
        let total = self.total();
        if total == 0 {
            return None;
        }
        self.index_for(entropy.below(total))
    }
}

/// Pick one of the input's reactions, favouring high affinity.
/// Reactions with non-positive affinity are never picked.
pub fn select_reaction(memory: &Memory, input: &Input, entropy: &mut dyn Entropy) -> Option<ReactionId> {
    if input.reactions.is_empty() {
        return None;
    }

    let choice = WeightedChoice::new(input.reactions.iter().map(|id| {
        memory
            .reaction(*id)
            .map(|reaction| reaction.selection_weight())
            .unwrap_or(0)
    }));

    tracing::debug!(
        input_id = %input.id,
        candidates = input.reactions.len(),
        total_weight = choice.total(),
        "Selecting reaction"
    );

    choice.sample(entropy).map(|index| input.reactions[index])
}

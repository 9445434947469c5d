// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # Memory
//!
//! The complete learned state of one engine: every known input and output and
//! the reaction arena linking them. `Memory` is also the snapshot unit handed
//! to persistence sinks and accepted back when seeding a new engine.
//!
//! Inputs and outputs reference reactions by [`ReactionId`]; the arena owns
//! the reactions themselves. Nothing is ever removed.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::input::{Input, InputId};
use super::output::{Output, OutputCmd};
use super::reaction::{Reaction, ReactionId, AFFINITY_MAX, AFFINITY_MIN};

#[derive(Debug, Error)]
pub enum CortexError {
    #[error("invalid memory: {0}")]
    InvalidMemory(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Memory {
    #[serde(default)]
    inputs: BTreeMap<InputId, Input>,
    #[serde(default)]
    outputs: BTreeMap<OutputCmd, Output>,
    #[serde(default)]
    reactions: Vec<Reaction>,
}

/// Summary counters for a memory
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemoryStats {
    pub inputs: usize,
    pub outputs: usize,
    pub reactions: usize,
    pub mean_affinity: f64,
    pub total_uses: u64,
}

impl Memory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inputs(&self) -> &BTreeMap<InputId, Input> {
        &self.inputs
    }

    pub fn outputs(&self) -> &BTreeMap<OutputCmd, Output> {
        &self.outputs
    }

    pub fn reactions(&self) -> &[Reaction] {
        &self.reactions
    }

    pub fn input(&self, id: &InputId) -> Option<&Input> {
        self.inputs.get(id)
    }

    pub fn input_mut(&mut self, id: &InputId) -> Option<&mut Input> {
        self.inputs.get_mut(id)
    }

    pub fn output(&self, cmd: &OutputCmd) -> Option<&Output> {
        self.outputs.get(cmd)
    }

    pub fn reaction(&self, id: ReactionId) -> Option<&Reaction> {
        self.reactions.get(id.0)
    }

    pub fn reaction_mut(&mut self, id: ReactionId) -> Option<&mut Reaction> {
        self.reactions.get_mut(id.0)
    }

    /// Insert a new input, replacing nothing: callers check for an existing
    /// id first.
    pub fn insert_input(&mut self, input: Input) -> &mut Input {
        let id = input.id.clone();
        self.inputs.entry(id).or_insert(input)
    }

    /// Insert an output unless one with the same command already exists.
    /// Returns whether a new record was created.
    pub fn insert_output(&mut self, output: Output) -> bool {
        let cmd = output.cmd.clone();
        let mut created = false;
        self.outputs.entry(cmd).or_insert_with(|| {
            created = true;
            output
        });
        created
    }

    pub fn push_reaction(&mut self, reaction: Reaction) -> ReactionId {
        self.reactions.push(reaction);
        ReactionId(self.reactions.len() - 1)
    }

    /// Most recently appended reaction matching the given sides
    pub fn find_last_reaction(
        &self,
        input: Option<&InputId>,
        output: Option<&OutputCmd>,
    ) -> Option<ReactionId> {
        self.reactions
            .iter()
            .rposition(|reaction| reaction.matches(input, output))
            .map(ReactionId)
    }

    /// Add back-references from the input and output to `reaction`
    pub fn link(&mut self, reaction: ReactionId, input: Option<&InputId>, output: Option<&OutputCmd>) {
        if let Some(input) = input.and_then(|id| self.inputs.get_mut(id)) {
            input.link(reaction);
        }
        if let Some(output) = output.and_then(|cmd| self.outputs.get_mut(cmd)) {
            output.link(reaction);
        }
    }

    /// Check the structural invariants of a memory built elsewhere
    /// (deserialized snapshots, hand-built fixtures).
    pub fn validate(&self) -> Result<(), CortexError> {
        let arena = self.reactions.len();

        for (key, input) in &self.inputs {
            if key != &input.id {
                return Err(CortexError::InvalidMemory(format!(
                    "input stored under '{}' has id '{}'",
                    key, input.id
                )));
            }
            if let Some(orphan) = input.reactions.iter().find(|id| id.0 >= arena) {
                return Err(CortexError::InvalidMemory(format!(
                    "input '{}' references missing reaction {}",
                    key, orphan
                )));
            }
        }

        for (key, output) in &self.outputs {
            if key != &output.cmd {
                return Err(CortexError::InvalidMemory(format!(
                    "output stored under '{}' has cmd '{}'",
                    key, output.cmd
                )));
            }
            if let Some(orphan) = output.reactions.iter().find(|id| id.0 >= arena) {
                return Err(CortexError::InvalidMemory(format!(
                    "output '{}' references missing reaction {}",
                    key, orphan
                )));
            }
        }

        for (index, reaction) in self.reactions.iter().enumerate() {
            if !(AFFINITY_MIN..=AFFINITY_MAX).contains(&reaction.affinity) {
                return Err(CortexError::InvalidMemory(format!(
                    "reaction {} has affinity {} outside [{}, {}]",
                    ReactionId(index),
                    reaction.affinity,
                    AFFINITY_MIN,
                    AFFINITY_MAX
                )));
            }
            if let Some(input) = reaction.input.as_ref().filter(|id| !self.inputs.contains_key(*id)) {
                return Err(CortexError::InvalidMemory(format!(
                    "reaction {} links unknown input '{}'",
                    ReactionId(index),
                    input
                )));
            }
            if let Some(output) = reaction.output.as_ref().filter(|cmd| !self.outputs.contains_key(*cmd)) {
                return Err(CortexError::InvalidMemory(format!(
                    "reaction {} links unknown output '{}'",
                    ReactionId(index),
                    output
                )));
            }
        }

        Ok(())
    }

    pub fn stats(&self) -> MemoryStats {
        let total_affinity: f64 = self.reactions.iter().map(|r| r.affinity).sum();
        let mean_affinity = if self.reactions.is_empty() {
            0.0
        } else {
            total_affinity / self.reactions.len() as f64
        };

        MemoryStats {
            inputs: self.inputs.len(),
            outputs: self.outputs.len(),
            reactions: self.reactions.len(),
            mean_affinity,
            total_uses: self.reactions.iter().map(|r| r.used).sum(),
        }
    }

    /// Up to `limit` reactions ordered by affinity, strongest first
    pub fn strongest_reactions(&self, limit: usize) -> Vec<(ReactionId, &Reaction)> {
        let mut ranked: Vec<_> = self
            .reactions
            .iter()
            .enumerate()
            .map(|(index, reaction)| (ReactionId(index), reaction))
            .collect();

        ranked.sort_by(|a, b| {
            b.1.affinity
                .partial_cmp(&a.1.affinity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ranked.truncate(limit);
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::pattern::Pattern;

    fn input(id: &str) -> Input {
        let pattern = Pattern {
            vector_code: "+".to_string(),
            hash: "h".to_string(),
        };
        Input::new(InputId(id.to_string()), "s", pattern, "1,2".to_string())
    }

    #[test]
    fn test_find_last_reaction_prefers_latest() {
        let mut memory = Memory::new();
        let id = InputId("s|+".to_string());
        memory.push_reaction(Reaction::new(Some(id.clone()), None));
        memory.push_reaction(Reaction::new(None, Some(OutputCmd("d.on".into()))));
        let latest = memory.push_reaction(Reaction::new(Some(id.clone()), None));

        assert_eq!(memory.find_last_reaction(Some(&id), None), Some(latest));
        assert_eq!(memory.find_last_reaction(None, None), None);
    }

    #[test]
    fn test_insert_output_keeps_existing() {
        let mut memory = Memory::new();
        let cmd = OutputCmd("d.on".to_string());
        assert!(memory.insert_output(Output::new(cmd.clone())));

        let reaction = memory.push_reaction(Reaction::new(None, Some(cmd.clone())));
        memory.link(reaction, None, Some(&cmd));

        assert!(!memory.insert_output(Output::new(cmd.clone())));
        assert_eq!(memory.output(&cmd).unwrap().reactions, vec![reaction]);
    }

    #[test]
    fn test_validate_detects_orphan_reference() {
        let mut memory = Memory::new();
        let mut orphan = input("s|+");
        orphan.reactions.push(ReactionId(4));
        memory.insert_input(orphan);

        let err = memory.validate().unwrap_err();
        assert!(err.to_string().contains("missing reaction #4"));
    }

    #[test]
    fn test_validate_detects_affinity_out_of_range() {
        let mut memory = Memory::new();
        memory.insert_output(Output::new(OutputCmd("d.on".into())));
        let mut reaction = Reaction::new(None, Some(OutputCmd("d.on".into())));
        reaction.affinity = 1.5;
        memory.push_reaction(reaction);

        let err = memory.validate().unwrap_err();
        assert!(err.to_string().contains("outside"));
    }

    #[test]
    fn test_validate_detects_unknown_partner() {
        let mut memory = Memory::new();
        memory.push_reaction(Reaction::new(None, Some(OutputCmd("d.on".into()))));

        let err = memory.validate().unwrap_err();
        assert!(err.to_string().contains("unknown output 'd.on'"));
    }

    #[test]
    fn test_snapshot_json_shape() {
        let mut memory = Memory::new();
        let id = InputId("s|+".to_string());
        memory.insert_input(input("s|+"));
        let reaction = memory.push_reaction(Reaction::new(Some(id.clone()), None));
        memory.link(reaction, Some(&id), None);

        let json = serde_json::to_value(&memory).unwrap();
        assert_eq!(json["inputs"]["s|+"]["reactions"], serde_json::json!([0]));
        assert_eq!(json["reactions"][0]["input"], "s|+");
        assert!(json["reactions"][0]["output"].is_null());

        let restored: Memory = serde_json::from_value(json).unwrap();
        assert_eq!(restored, memory);
        restored.validate().unwrap();
    }

    #[test]
    fn test_stats_and_ranking() {
        let mut memory = Memory::new();
        let mut weak = Reaction::new(None, Some(OutputCmd("d.off".into())));
        weak.affinity = 0.25;
        weak.used = 1;
        let mut strong = Reaction::new(None, Some(OutputCmd("d.on".into())));
        strong.affinity = 0.75;
        strong.used = 3;
        memory.push_reaction(weak);
        let strong_id = memory.push_reaction(strong);

        let stats = memory.stats();
        assert_eq!(stats.reactions, 2);
        assert_eq!(stats.mean_affinity, 0.5);
        assert_eq!(stats.total_uses, 4);

        let ranked = memory.strongest_reactions(1);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].0, strong_id);
    }
}

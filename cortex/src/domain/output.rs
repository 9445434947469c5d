// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Output records: executable actions identified by `device.command`

use std::fmt;

use serde::{Deserialize, Serialize};

use super::reaction::ReactionId;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutputCmd(pub String);

impl OutputCmd {
    pub fn compose(device_id: &str, command: &str) -> Self {
        Self(format!("{device_id}.{command}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split into `(device_id, command)` at the first `.`
    pub fn parts(&self) -> Option<(&str, &str)> {
        self.0.split_once('.')
    }
}

impl fmt::Display for OutputCmd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Output {
    pub cmd: OutputCmd,
    #[serde(default)]
    pub reactions: Vec<ReactionId>,
}

impl Output {
    pub fn new(cmd: OutputCmd) -> Self {
        Self {
            cmd,
            reactions: Vec::new(),
        }
    }

    pub fn link(&mut self, reaction: ReactionId) -> bool {
        if self.reactions.contains(&reaction) {
            return false;
        }
        self.reactions.push(reaction);
        true
    }
}

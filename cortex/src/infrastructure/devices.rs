// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Configuration-backed device with a fixed command list

use crate::domain::{Device, DeviceConfig, Entropy};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandDevice {
    id: String,
    commands: Vec<String>,
}

impl CommandDevice {
    pub fn new(id: impl Into<String>, commands: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            id: id.into(),
            commands: commands.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_config(config: &DeviceConfig) -> Self {
        Self::new(config.id.clone(), config.commands.iter().cloned())
    }

    pub fn commands(&self) -> &[String] {
        &self.commands
    }
}

impl Device for CommandDevice {
    fn id(&self) -> &str {
        &self.id
    }

    fn random_command(&self, entropy: &mut dyn Entropy) -> Option<String> {
        if self.commands.is_empty() {
            return None;
        }
        let index = entropy.below(self.commands.len() as u64) as usize;
        self.commands.get(index).cloned()
    }
}

// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Device capabilities available to the engine for exploration

use std::fmt;
use std::sync::Arc;

use super::entropy::Entropy;

/// An actuator able to propose an executable command
pub trait Device: Send + Sync {
    fn id(&self) -> &str;

    /// A random command this device can execute, or `None` if it has none
    fn random_command(&self, entropy: &mut dyn Entropy) -> Option<String>;
}

/// Ordered set of devices with unique ids
#[derive(Clone, Default)]
pub struct DeviceRegistry {
    devices: Vec<Arc<dyn Device>>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a device, replacing any device with the same id
    pub fn register(&mut self, device: Arc<dyn Device>) {
        match self.devices.iter().position(|d| d.id() == device.id()) {
            Some(index) => self.devices[index] = device,
            None => self.devices.push(device),
        }
    }

    pub fn with_device(mut self, device: Arc<dyn Device>) -> Self {
        self.register(device);
        self
    }

    pub fn get(&self, id: &str) -> Option<&Arc<dyn Device>> {
        self.devices.iter().find(|d| d.id() == id)
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Uniformly random device
    pub fn pick(&self, entropy: &mut dyn Entropy) -> Option<&Arc<dyn Device>> {
        if self.devices.is_empty() {
            return None;
        }
        let index = entropy.below(self.devices.len() as u64) as usize;
        self.devices.get(index)
    }
}

impl fmt::Debug for DeviceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.devices.iter().map(|d| d.id()))
            .finish()
    }
}

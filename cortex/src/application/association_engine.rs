// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # AssociationEngine: Input/Output Reaction Learning
//!
//! Holds the complete learned [`Memory`] and exposes the two operations of the
//! learning loop:
//!
//! - [`interpret`](AssociationEngine::interpret) registers or recognises the
//!   input behind an observation history.
//! - [`react`](AssociationEngine::react) chooses an output for an input and
//!   reinforces the reaction linking them.
//!
//! ## Reacting
//!
//! 1. **Exploit** – draw one of the input's reactions weighted by affinity
//!    (see [`select_reaction`]).
//! 2. **Explore** – with nothing to exploit, try a random device command half
//!    of the time.
//! 3. **Resolve** – reuse the drawn reaction, else the most recently created
//!    reaction matching the available sides, else create one.
//! 4. **Reinforce** – bump `used`, add a random increment below
//!    [`REINFORCEMENT_STEP`] to affinity (capped at 1) and link the reaction
//!    to its input and output.
//! 5. **Persist** – queue a snapshot for the engine's background writer
//!    without waiting for it (see [`SnapshotWriter`]).
//!
//! Writes run one at a time in submission order. A snapshot queued while an
//! earlier write is in flight replaces any snapshot still waiting, so a burst
//! of reactions costs at most one extra write.
//!
//! Both operations take `&mut self`; concurrent callers must serialise access
//! themselves (e.g. behind a mutex).

use std::sync::Arc;

use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

use crate::application::selection::select_reaction;
use crate::application::snapshot_writer::{report_failure, SnapshotWriter};
use crate::domain::{
    canonical_history, CortexConfig, CortexError, CortexEvent, Device, DeviceRegistry, Entropy,
    Input, InputId, Memory, Output, OutputCmd, PatternRecognizer, PersistenceError, Reaction,
    ReactionId, SnapshotSink, DEFAULT_DELIMITER, REINFORCEMENT_STEP,
};
use crate::infrastructure::{CommandDevice, DeltaPatternRecognizer, JsonFileSnapshotStore};

/// A uniform draw above this value triggers exploration
pub const EXPLORATION_THRESHOLD: f64 = 0.5;

/// Event bus trait for publishing domain events
pub trait EventBus: Send + Sync {
    fn publish(&self, event: CortexEvent);
}

pub struct AssociationEngine {
    memory: Memory,
    delimiter: String,
    recognizer: Arc<dyn PatternRecognizer>,
    devices: DeviceRegistry,
    entropy: Box<dyn Entropy>,
    sink: Option<Arc<dyn SnapshotSink>>,
    event_bus: Option<Arc<dyn EventBus>>,
    writer: Option<SnapshotWriter>,
}

/// Builder for [`AssociationEngine`]
pub struct AssociationEngineBuilder {
    memory: Memory,
    delimiter: String,
    recognizer: Option<Arc<dyn PatternRecognizer>>,
    devices: DeviceRegistry,
    entropy: Option<Box<dyn Entropy>>,
    sink: Option<Arc<dyn SnapshotSink>>,
    event_bus: Option<Arc<dyn EventBus>>,
}

impl AssociationEngineBuilder {
    fn new() -> Self {
        Self {
            memory: Memory::new(),
            delimiter: DEFAULT_DELIMITER.to_string(),
            recognizer: None,
            devices: DeviceRegistry::new(),
            entropy: None,
            sink: None,
            event_bus: None,
        }
    }

    /// Apply delimiter, devices and snapshot location from a config
    pub fn config(mut self, config: &CortexConfig) -> Self {
        self.delimiter = config.delimiter.clone();
        for device in &config.devices {
            self.devices.register(Arc::new(CommandDevice::from_config(device)));
        }
        if let Some(data_path) = &config.data_path {
            self.sink = Some(Arc::new(JsonFileSnapshotStore::new(data_path)));
        }
        self
    }

    pub fn delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    pub fn recognizer(mut self, recognizer: Arc<dyn PatternRecognizer>) -> Self {
        self.recognizer = Some(recognizer);
        self
    }

    pub fn devices(mut self, devices: DeviceRegistry) -> Self {
        self.devices = devices;
        self
    }

    pub fn device(mut self, device: Arc<dyn Device>) -> Self {
        self.devices.register(device);
        self
    }

    pub fn entropy(mut self, entropy: impl Entropy + 'static) -> Self {
        self.entropy = Some(Box::new(entropy));
        self
    }

    /// Deterministic randomness for reproducible runs
    pub fn seed(self, seed: u64) -> Self {
        self.entropy(StdRng::seed_from_u64(seed))
    }

    pub fn sink(mut self, sink: Arc<dyn SnapshotSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn without_persistence(mut self) -> Self {
        self.sink = None;
        self
    }

    pub fn event_bus(mut self, event_bus: Arc<dyn EventBus>) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    /// Resume from a previously persisted memory
    pub fn memory(mut self, memory: Memory) -> Self {
        self.memory = memory;
        self
    }

    pub fn build(self) -> Result<AssociationEngine, CortexError> {
        self.memory.validate()?;

        Ok(AssociationEngine {
            memory: self.memory,
            delimiter: self.delimiter,
            recognizer: self
                .recognizer
                .unwrap_or_else(|| Arc::new(DeltaPatternRecognizer::new())),
            devices: self.devices,
            entropy: self
                .entropy
                .unwrap_or_else(|| Box::new(StdRng::from_os_rng())),
            sink: self.sink,
            event_bus: self.event_bus,
            writer: None,
        })
    }
}

impl AssociationEngine {
    pub fn builder() -> AssociationEngineBuilder {
        AssociationEngineBuilder::new()
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn into_memory(self) -> Memory {
        self.memory
    }

    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    pub fn devices(&self) -> &DeviceRegistry {
        &self.devices
    }

    /// Register or recognise the input behind `history` observed on `source`.
    ///
    /// Returns `None` when `source` or `history` is empty. A known input
    /// collects `history` in its `related` list when it differs from the
    /// history that created it.
    pub fn interpret(&mut self, history: &[f64], source: &str) -> Option<&Input> {
        if source.is_empty() || history.is_empty() {
            debug!(source, samples = history.len(), "Ignoring observation without source or history");
            return None;
        }

        let pattern = self.recognizer.recognize(history);
        let id = InputId::compose(source, &self.delimiter, &pattern.vector_code);
        let canonical = canonical_history(history);
        debug!(input_id = %id, samples = history.len(), "Interpreting observation");

        if self.memory.input(&id).is_some() {
            let generalized = self
                .memory
                .input_mut(&id)
                .and_then(|input| input.generalize(&canonical).then(|| input.related.len()));

            if let Some(related_count) = generalized {
                debug!(input_id = %id, related_count, "Generalized input with new history");
                self.publish(CortexEvent::InputGeneralized {
                    input_id: id.clone(),
                    history: canonical,
                    related_count,
                    timestamp: Utc::now(),
                });
            }
        } else {
            info!(input_id = %id, "Discovered new input");
            self.publish(CortexEvent::InputDiscovered {
                input_id: id.clone(),
                source: source.to_string(),
                vector_code: pattern.vector_code.clone(),
                timestamp: Utc::now(),
            });
            self.memory.insert_input(Input::new(id.clone(), source, pattern, canonical));
        }

        self.memory.input(&id)
    }

    /// Choose an output for `input` and reinforce the reaction behind it.
    ///
    /// Returns `None` when no output was chosen, which is a valid outcome
    /// ("do nothing"); the input side of the reaction is still reinforced.
    /// An id unknown to this engine is treated as no input.
    pub fn react(&mut self, input: Option<&InputId>) -> Option<Output> {
        let input_id = match input {
            Some(id) if self.memory.input(id).is_some() => Some(id.clone()),
            Some(id) => {
                warn!(input_id = %id, "Unknown input, reacting without it");
                None
            }
            None => None,
        };

        // Exploit known reactions
        let mut selected = None;
        let mut output_cmd = None;
        if let Some(input) = input_id.as_ref().and_then(|id| self.memory.input(id)) {
            selected = select_reaction(&self.memory, input, &mut *self.entropy);
            output_cmd = selected
                .and_then(|id| self.memory.reaction(id))
                .and_then(|reaction| reaction.output.clone());
            debug!(
                input_id = %input.id,
                reaction = ?selected,
                output = ?output_cmd,
                "Exploited known reactions"
            );
        }

        // Nothing to exploit: sometimes try something new
        if output_cmd.is_none()
            && !self.devices.is_empty()
            && self.entropy.unit() > EXPLORATION_THRESHOLD
        {
            output_cmd = self.explore();
        }

        if input_id.is_none() && output_cmd.is_none() {
            debug!("Nothing to react to");
            return None;
        }

        let reaction_id = self.resolve_reaction(selected, input_id.as_ref(), output_cmd.as_ref());
        self.reinforce(reaction_id, input_id.as_ref(), output_cmd.as_ref());
        self.persist();

        output_cmd.and_then(|cmd| self.memory.output(&cmd).cloned())
    }

    /// Wait until the snapshot of the latest reaction has been written.
    /// Afterwards the sink holds the engine's current memory, unless that
    /// write failed.
    pub async fn flush(&mut self) {
        let Some(writer) = self.writer.as_mut() else {
            return;
        };
        if let Err(e) = writer.flush().await {
            report_failure(self.event_bus.as_ref(), e);
        }
    }

    /// Whether a queued snapshot has not been written yet
    pub fn has_pending_writes(&self) -> bool {
        self.writer.as_ref().is_some_and(SnapshotWriter::is_pending)
    }

    fn explore(&mut self) -> Option<OutputCmd> {
        let device = self.devices.pick(&mut *self.entropy)?.clone();
        let Some(command) = device.random_command(&mut *self.entropy) else {
            debug!(device = device.id(), "Device offered no command");
            return None;
        };

        let cmd = OutputCmd::compose(device.id(), &command);
        if self.memory.insert_output(Output::new(cmd.clone())) {
            info!(output = %cmd, "Synthesized new output");
            self.publish(CortexEvent::OutputSynthesized {
                cmd: cmd.clone(),
                timestamp: Utc::now(),
            });
        } else {
            debug!(output = %cmd, "Explored known output");
        }
        Some(cmd)
    }

    fn resolve_reaction(
        &mut self,
        selected: Option<ReactionId>,
        input: Option<&InputId>,
        output: Option<&OutputCmd>,
    ) -> ReactionId {
        if let Some(id) = selected.or_else(|| self.memory.find_last_reaction(input, output)) {
            return id;
        }

        let id = self
            .memory
            .push_reaction(Reaction::new(input.cloned(), output.cloned()));
        info!(reaction = %id, input = ?input, output = ?output, "Created reaction");
        self.publish(CortexEvent::ReactionCreated {
            reaction_id: id,
            input_id: input.cloned(),
            output_cmd: output.cloned(),
            timestamp: Utc::now(),
        });
        id
    }

    fn reinforce(&mut self, id: ReactionId, input: Option<&InputId>, output: Option<&OutputCmd>) {
        let increment = self.entropy.unit() * REINFORCEMENT_STEP;

        let Some(reaction) = self.memory.reaction_mut(id) else {
            return;
        };
        let old_affinity = reaction.reinforce(increment, Utc::now());
        let (new_affinity, used) = (reaction.affinity, reaction.used);

        self.memory.link(id, input, output);

        debug!(reaction = %id, old_affinity, new_affinity, used, "Reinforced reaction");
        self.publish(CortexEvent::ReactionReinforced {
            reaction_id: id,
            old_affinity,
            new_affinity,
            used,
            timestamp: Utc::now(),
        });
    }

    /// Queue a snapshot for the background writer without waiting for it
    fn persist(&mut self) {
        let Some(sink) = self.sink.clone() else {
            return;
        };

        if !self.writer.as_ref().is_some_and(SnapshotWriter::is_running) {
            match Handle::try_current() {
                Ok(handle) => {
                    debug!("Starting snapshot writer");
                    self.writer = Some(SnapshotWriter::spawn(&handle, sink, self.event_bus.clone()));
                }
                Err(_) => {
                    report_failure(self.event_bus.as_ref(), PersistenceError::NoRuntime);
                    return;
                }
            }
        }

        if let Some(writer) = self.writer.as_mut() {
            writer.submit(self.memory.clone());
        }
    }

    fn publish(&self, event: CortexEvent) {
        if let Some(bus) = self.event_bus.as_ref() {
            bus.publish(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DeviceConfig, AFFINITY_MAX};
    use crate::infrastructure::InMemorySnapshotStore;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays scripted draws; runs dry to zero
    #[derive(Default)]
    struct Scripted {
        units: VecDeque<f64>,
        tickets: VecDeque<u64>,
    }

    impl Scripted {
        fn units(units: &[f64]) -> Self {
            Self {
                units: units.iter().copied().collect(),
                tickets: VecDeque::new(),
            }
        }

        fn with_tickets(mut self, tickets: &[u64]) -> Self {
            self.tickets = tickets.iter().copied().collect();
            self
        }
    }

    impl Entropy for Scripted {
        fn unit(&mut self) -> f64 {
            self.units.pop_front().unwrap_or(0.0)
        }

        fn below(&mut self, bound: u64) -> u64 {
            self.tickets.pop_front().unwrap_or(0).min(bound - 1)
        }
    }

    // Mock EventBus for testing
    #[derive(Default)]
    struct MockEventBus {
        events: Mutex<Vec<CortexEvent>>,
    }

    impl MockEventBus {
        fn event_types(&self) -> Vec<&'static str> {
            self.events.lock().unwrap().iter().map(|e| e.event_type()).collect()
        }
    }

    impl EventBus for MockEventBus {
        fn publish(&self, event: CortexEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

    struct FailingSink;

    #[async_trait]
    impl SnapshotSink for FailingSink {
        async fn persist(&self, _snapshot: &Memory) -> Result<(), PersistenceError> {
            Err(PersistenceError::Io(std::io::Error::other("disk full")))
        }
    }

    fn switch() -> Arc<dyn Device> {
        Arc::new(CommandDevice::from_config(&DeviceConfig {
            id: "device1".to_string(),
            commands: vec!["on".to_string(), "off".to_string()],
        }))
    }

    const HISTORY_A: [f64; 4] = [1.0, 2.0, 3.0, 2.0];

    #[test]
    fn test_interpret_requires_source_and_history() {
        let mut engine = AssociationEngine::builder().build().unwrap();

        assert!(engine.interpret(&HISTORY_A, "").is_none());
        assert!(engine.interpret(&[], "sensor1").is_none());
        assert!(engine.memory().inputs().is_empty());
    }

    #[test]
    fn test_interpret_is_idempotent() {
        let mut engine = AssociationEngine::builder().build().unwrap();

        let first = engine.interpret(&HISTORY_A, "sensor1").unwrap().id.clone();
        let second = engine.interpret(&HISTORY_A, "sensor1").unwrap().id.clone();

        assert_eq!(first, second);
        assert_eq!(first.as_str(), "sensor1|+-");
        assert_eq!(engine.memory().inputs().len(), 1);
        assert!(engine.memory().input(&first).unwrap().related.is_empty());
    }

    #[test]
    fn test_interpret_generalizes_once() {
        let bus = Arc::new(MockEventBus::default());
        let mut engine = AssociationEngine::builder().event_bus(bus.clone()).build().unwrap();

        let id = engine.interpret(&HISTORY_A, "sensor1").unwrap().id.clone();
        // same shape, different samples
        let variant = [0.0, 5.0, 9.0, 1.0];
        for _ in 0..3 {
            let input = engine.interpret(&variant, "sensor1").unwrap();
            assert_eq!(input.id, id);
        }

        let input = engine.memory().input(&id).unwrap();
        assert_eq!(input.history, "1,2,3,2");
        assert_eq!(input.related, vec!["0,5,9,1".to_string()]);
        assert_eq!(bus.event_types(), vec!["input_discovered", "input_generalized"]);
    }

    #[test]
    fn test_interpret_separates_sources() {
        let mut engine = AssociationEngine::builder().delimiter("::").build().unwrap();

        let a = engine.interpret(&HISTORY_A, "sensor1").unwrap().id.clone();
        let b = engine.interpret(&HISTORY_A, "sensor2").unwrap().id.clone();

        assert_ne!(a, b);
        assert_eq!(b.as_str(), "sensor2::+-");
    }

    #[test]
    fn test_react_explores_new_output() {
        // explore, reinforce by 0.4 * 0.25; device 0, command 1
        let mut engine = AssociationEngine::builder()
            .device(switch())
            .entropy(Scripted::units(&[0.9, 0.4]).with_tickets(&[0, 1]))
            .build()
            .unwrap();
        let input = engine.interpret(&HISTORY_A, "sensor1").unwrap().id.clone();

        let output = engine.react(Some(&input)).unwrap();

        assert_eq!(output.cmd.as_str(), "device1.off");
        let memory = engine.memory();
        assert_eq!(memory.reactions().len(), 1);
        let reaction = &memory.reactions()[0];
        assert_eq!(reaction.input.as_ref(), Some(&input));
        assert_eq!(reaction.output.as_ref(), Some(&output.cmd));
        assert_eq!(reaction.affinity, 0.1);
        assert_eq!(reaction.used, 1);
        assert!(reaction.last_used.is_some());
        assert_eq!(memory.input(&input).unwrap().reactions, vec![ReactionId(0)]);
        assert_eq!(output.reactions, vec![ReactionId(0)]);
    }

    #[test]
    fn test_react_without_exploration_links_input_only() {
        let mut engine = AssociationEngine::builder()
            .device(switch())
            .entropy(Scripted::units(&[0.2, 0.5]))
            .build()
            .unwrap();
        let input = engine.interpret(&HISTORY_A, "sensor1").unwrap().id.clone();

        assert!(engine.react(Some(&input)).is_none());

        let memory = engine.memory();
        assert!(memory.outputs().is_empty());
        assert_eq!(memory.reactions().len(), 1);
        let reaction = &memory.reactions()[0];
        assert_eq!(reaction.input.as_ref(), Some(&input));
        assert!(reaction.output.is_none());
        assert_eq!(reaction.used, 1);
        assert_eq!(reaction.affinity, 0.125);
    }

    #[tokio::test]
    async fn test_react_with_nothing_is_noop() {
        let bus = Arc::new(MockEventBus::default());
        let store = Arc::new(InMemorySnapshotStore::new());
        let mut engine = AssociationEngine::builder()
            .sink(store.clone())
            .event_bus(bus.clone())
            .build()
            .unwrap();

        assert!(engine.react(None).is_none());
        assert!(engine.react(Some(&InputId("ghost|+".into()))).is_none());
        engine.flush().await;

        assert!(engine.memory().reactions().is_empty());
        assert!(!engine.has_pending_writes());
        assert_eq!(store.snapshot_count(), 0);
        assert!(bus.event_types().is_empty());
    }

    #[test]
    fn test_explored_output_links_reused_input_only_reaction() {
        // react 1: no exploration, +0.125 => weight 8
        // react 2: draw #0 (no output), explore device1.off, +0.1
        let mut engine = AssociationEngine::builder()
            .device(switch())
            .entropy(Scripted::units(&[0.2, 0.5, 0.9, 0.4]).with_tickets(&[0, 0, 1]))
            .build()
            .unwrap();
        let input = engine.interpret(&HISTORY_A, "sensor1").unwrap().id.clone();

        assert!(engine.react(Some(&input)).is_none());
        let output = engine.react(Some(&input)).unwrap();

        assert_eq!(output.cmd.as_str(), "device1.off");
        assert_eq!(output.reactions, vec![ReactionId(0)]);

        let memory = engine.memory();
        assert_eq!(memory.reactions().len(), 1);
        let reaction = &memory.reactions()[0];
        assert_eq!(reaction.input.as_ref(), Some(&input));
        assert!(reaction.output.is_none());
        assert_eq!(reaction.used, 2);
        assert_eq!(reaction.affinity, 0.225);
        assert_eq!(memory.input(&input).unwrap().reactions, vec![ReactionId(0)]);
        memory.validate().unwrap();
    }

    #[test]
    fn test_react_reuses_reinforced_pair() {
        // explore + reinforce, then exploit the same reaction twice
        let mut engine = AssociationEngine::builder()
            .device(switch())
            .entropy(Scripted::units(&[0.9, 0.8, 0.8, 0.8]))
            .build()
            .unwrap();
        let input = engine.interpret(&HISTORY_A, "sensor1").unwrap().id.clone();

        let first = engine.react(Some(&input)).unwrap();
        let second = engine.react(Some(&input)).unwrap();
        let third = engine.react(Some(&input)).unwrap();

        assert_eq!(first.cmd.as_str(), "device1.on");
        assert_eq!(second.cmd, first.cmd);
        assert_eq!(third.cmd, first.cmd);
        let memory = engine.memory();
        assert_eq!(memory.reactions().len(), 1);
        assert_eq!(memory.reactions()[0].used, 3);
        assert_eq!(memory.input(&input).unwrap().reactions, vec![ReactionId(0)]);
        assert_eq!(third.reactions, vec![ReactionId(0)]);
    }

    #[test]
    fn test_react_prefers_latest_matching_reaction() {
        let mut engine = AssociationEngine::builder().build().unwrap();
        let input = engine.interpret(&HISTORY_A, "sensor1").unwrap().id.clone();

        let mut memory = engine.into_memory();
        memory.push_reaction(Reaction::new(Some(input.clone()), None));
        memory.push_reaction(Reaction::new(Some(input.clone()), None));

        let mut engine = AssociationEngine::builder()
            .memory(memory)
            .entropy(Scripted::units(&[0.4]))
            .build()
            .unwrap();
        engine.react(Some(&input));

        let reactions = engine.memory().reactions();
        assert_eq!(reactions[0].used, 0);
        assert_eq!(reactions[1].used, 1);
        assert_eq!(engine.memory().input(&input).unwrap().reactions, vec![ReactionId(1)]);
    }

    #[test]
    fn test_affinity_never_exceeds_max() {
        let mut engine = AssociationEngine::builder()
            .device(switch())
            .entropy(Scripted::units(&[0.99; 64]))
            .build()
            .unwrap();
        let input = engine.interpret(&HISTORY_A, "sensor1").unwrap().id.clone();

        for _ in 0..20 {
            engine.react(Some(&input));
            for reaction in engine.memory().reactions() {
                assert!(reaction.affinity <= AFFINITY_MAX);
            }
        }
        assert_eq!(engine.memory().reactions()[0].affinity, AFFINITY_MAX);
    }

    #[test]
    fn test_exploited_output_returned_from_memory() {
        let mut engine = AssociationEngine::builder()
            .device(switch())
            .entropy(Scripted::units(&[0.9, 0.99]))
            .build()
            .unwrap();
        let input = engine.interpret(&HISTORY_A, "sensor1").unwrap().id.clone();
        engine.react(Some(&input)).unwrap();

        // no devices left: only memory can answer
        let memory = engine.into_memory();
        let mut engine = AssociationEngine::builder()
            .memory(memory)
            .entropy(Scripted::units(&[0.0]))
            .build()
            .unwrap();

        let output = engine.react(Some(&input)).unwrap();
        assert_eq!(output.cmd.as_str(), "device1.on");
        assert_eq!(engine.memory().reactions()[0].used, 2);
    }

    #[test]
    fn test_build_rejects_inconsistent_memory() {
        let mut memory = Memory::new();
        memory.push_reaction(Reaction::new(Some(InputId("ghost|+".into())), None));

        assert!(AssociationEngine::builder().memory(memory).build().is_err());
    }

    #[tokio::test]
    async fn test_react_persists_snapshot() {
        let store = Arc::new(InMemorySnapshotStore::new());
        let bus = Arc::new(MockEventBus::default());
        let mut engine = AssociationEngine::builder()
            .device(switch())
            .sink(store.clone())
            .event_bus(bus.clone())
            .seed(7)
            .build()
            .unwrap();
        let input = engine.interpret(&HISTORY_A, "sensor1").unwrap().id.clone();

        engine.react(Some(&input));
        engine.react(Some(&input));
        engine.flush().await;

        assert!((1..=2).contains(&store.snapshot_count()));
        assert_eq!(store.latest().as_ref(), Some(engine.memory()));
        assert!(!engine.has_pending_writes());
        assert!(bus.event_types().contains(&"memory_persisted"));
    }

    #[tokio::test]
    async fn test_persistence_failure_reaches_event_bus() {
        let bus = Arc::new(MockEventBus::default());
        let mut engine = AssociationEngine::builder()
            .sink(Arc::new(FailingSink))
            .event_bus(bus.clone())
            .build()
            .unwrap();
        let input = engine.interpret(&HISTORY_A, "sensor1").unwrap().id.clone();

        assert!(engine.react(Some(&input)).is_none());
        engine.flush().await;

        let events = bus.events.lock().unwrap();
        let failure = events
            .iter()
            .find(|e| e.event_type() == "persistence_failed")
            .expect("failure event");
        match failure {
            CortexEvent::PersistenceFailed { error, .. } => assert!(error.contains("disk full")),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_persistence_without_runtime_is_reported() {
        let bus = Arc::new(MockEventBus::default());
        let mut engine = AssociationEngine::builder()
            .sink(Arc::new(InMemorySnapshotStore::new()))
            .event_bus(bus.clone())
            .build()
            .unwrap();
        let input = engine.interpret(&HISTORY_A, "sensor1").unwrap().id.clone();

        engine.react(Some(&input));

        assert_eq!(bus.event_types().last(), Some(&"persistence_failed"));
    }

    #[test]
    fn test_engines_are_independent() {
        let mut a = AssociationEngine::builder().build().unwrap();
        let b = AssociationEngine::builder().build().unwrap();

        a.interpret(&HISTORY_A, "sensor1");

        assert_eq!(a.memory().inputs().len(), 1);
        assert!(b.memory().inputs().is_empty());
    }
}

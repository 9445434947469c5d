// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Event Bus Implementation - Pub/Sub for Cortex Events
//
// In-memory event streaming over a tokio broadcast channel. Events published
// while nobody is subscribed are dropped; slow subscribers lose the oldest
// events once the channel capacity is exceeded.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::application::EventBus;
use crate::domain::CortexEvent;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EventBusError {
    #[error("event bus closed")]
    Closed,
    #[error("receiver lagged by {0} events")]
    Lagged(u64),
    #[error("no event available")]
    Empty,
}

#[derive(Clone)]
pub struct BroadcastEventBus {
    sender: Arc<broadcast::Sender<CortexEvent>>,
}

impl BroadcastEventBus {
    /// Create a new event bus with specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Create event bus with default capacity (1000)
    pub fn with_default_capacity() -> Self {
        Self::new(1000)
    }

    pub fn subscribe(&self) -> EventReceiver {
        EventReceiver {
            receiver: self.sender.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl EventBus for BroadcastEventBus {
    fn publish(&self, event: CortexEvent) {
        debug!(event_type = event.event_type(), "Publishing event");
        if self.sender.send(event).is_err() {
            debug!("No subscribers listening to event");
        }
    }
}

pub struct EventReceiver {
    receiver: broadcast::Receiver<CortexEvent>,
}

impl EventReceiver {
    /// Receive the next event (waits until one is available)
    pub async fn recv(&mut self) -> Result<CortexEvent, EventBusError> {
        self.receiver.recv().await.map_err(|e| match e {
            broadcast::error::RecvError::Closed => EventBusError::Closed,
            broadcast::error::RecvError::Lagged(n) => {
                warn!("Event receiver lagged by {} events", n);
                EventBusError::Lagged(n)
            }
        })
    }

    /// Try to receive an event without blocking
    pub fn try_recv(&mut self) -> Result<CortexEvent, EventBusError> {
        self.receiver.try_recv().map_err(|e| match e {
            broadcast::error::TryRecvError::Empty => EventBusError::Empty,
            broadcast::error::TryRecvError::Closed => EventBusError::Closed,
            broadcast::error::TryRecvError::Lagged(n) => {
                warn!("Event receiver lagged by {} events", n);
                EventBusError::Lagged(n)
            }
        })
    }
}

// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Event Bus Implementation - Pub/Sub for Learning Events
//
// In-memory event streaming over a tokio broadcast channel. Used by the CLI
// `--verbose` mode and by tests observing the learning loop.
// Events are not persisted; the feedback log is the durable record.

use crate::domain::events::LearningEvent;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Event bus for publishing and subscribing to learning events
#[derive(Clone)]
pub struct EventBus {
    sender: Arc<broadcast::Sender<LearningEvent>>,
}

impl EventBus {
    /// Create a new event bus with specified channel capacity.
    /// Slow receivers lose the oldest events once the buffer is full.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Create event bus with default capacity (256)
    pub fn with_default_capacity() -> Self {
        Self::new(256)
    }

    pub fn publish(&self, event: LearningEvent) {
        debug!(event_type = event.event_type(), profile = event.profile(), "Publishing event");

        // send() only fails when nobody is listening
        if self.sender.send(event).is_err() {
            debug!("No subscribers listening to event");
        }
    }

    pub fn subscribe(&self) -> EventReceiver {
        EventReceiver {
            receiver: self.sender.subscribe(),
            profile: None,
        }
    }

    /// Subscribe to events of a single profile (matched on its slug)
    pub fn subscribe_profile(&self, profile_slug: impl Into<String>) -> EventReceiver {
        EventReceiver {
            receiver: self.sender.subscribe(),
            profile: Some(profile_slug.into()),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

pub struct EventReceiver {
    receiver: broadcast::Receiver<LearningEvent>,
    profile: Option<String>,
}

impl EventReceiver {
    /// Receive the next event, waiting until one is available
    pub async fn recv(&mut self) -> Result<LearningEvent, EventBusError> {
        loop {
            let event = self.receiver.recv().await.map_err(|e| match e {
                broadcast::error::RecvError::Closed => EventBusError::Closed,
                broadcast::error::RecvError::Lagged(n) => {
                    warn!("Event receiver lagged by {} events", n);
                    EventBusError::Lagged(n)
                }
            })?;
            if self.accepts(&event) {
                return Ok(event);
            }
        }
    }

    pub fn try_recv(&mut self) -> Result<LearningEvent, EventBusError> {
        loop {
            let event = self.receiver.try_recv().map_err(|e| match e {
                broadcast::error::TryRecvError::Empty => EventBusError::Empty,
                broadcast::error::TryRecvError::Closed => EventBusError::Closed,
                broadcast::error::TryRecvError::Lagged(n) => {
                    warn!("Event receiver lagged by {} events", n);
                    EventBusError::Lagged(n)
                }
            })?;
            if self.accepts(&event) {
                return Ok(event);
            }
        }
    }

    fn accepts(&self, event: &LearningEvent) -> bool {
        self.profile
            .as_deref()
            .map_or(true, |profile| event.profile() == profile)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EventBusError {
    #[error("Event bus is closed")]
    Closed,

    #[error("No events available")]
    Empty,

    #[error("Receiver lagged by {0} events (events were dropped)")]
    Lagged(u64),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn refined(profile: &str) -> LearningEvent {
        LearningEvent::PostRefined {
            profile: profile.to_string(),
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_event_bus_publish_subscribe() {
        let event_bus = EventBus::new(10);
        let mut receiver = event_bus.subscribe();

        event_bus.publish(refined("default"));

        let event = receiver.recv().await.unwrap();
        assert_eq!(event.event_type(), "post_refined");
        assert_eq!(event.profile(), "default");
    }

    #[tokio::test]
    async fn test_profile_filter() {
        let event_bus = EventBus::new(10);
        let mut receiver = event_bus.subscribe_profile("jane_doe");

        event_bus.publish(refined("default"));
        event_bus.publish(refined("jane_doe"));

        assert_eq!(receiver.recv().await.unwrap().profile(), "jane_doe");
        assert!(matches!(receiver.try_recv(), Err(EventBusError::Empty)));
    }

    #[test]
    fn test_publish_without_subscribers() {
        let event_bus = EventBus::default();
        event_bus.publish(refined("default"));
        assert_eq!(event_bus.subscriber_count(), 0);
    }
}

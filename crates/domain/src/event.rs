//! Events — what the adapters feed into the bridge loop.
//!
//! Both the message bus and the hub deliver their notifications from their
//! own background tasks. They are funnelled into a single stream of
//! [`BridgeEvent`]s so the core handles them one at a time.

use serde::{Deserialize, Serialize};

use crate::id::ActivityId;

/// A message received on one of the subscribed command topics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    pub topic: String,
    pub payload: String,
}

impl InboundMessage {
    #[must_use]
    pub fn new(topic: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
        }
    }
}

/// A message the bridge publishes. Always sent at-least-once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub topic: String,
    pub payload: String,
    pub retain: bool,
}

impl OutboundMessage {
    /// A retained message, replayed by the broker to late subscribers.
    #[must_use]
    pub fn retained(topic: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
            retain: true,
        }
    }
}

/// How far an activity switch has progressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityProgress {
    /// The hub began switching; devices are still being driven.
    Started,
    /// The hub finished switching.
    Completed,
}

/// Hub notification that the running activity is changing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityChange {
    pub activity_id: ActivityId,
    pub progress: ActivityProgress,
}

/// Notifications originating from the hub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HubEvent {
    ActivityChanged(ActivityChange),
    /// The hub's device/activity configuration was edited.
    ConfigChanged,
    /// The hub connection dropped; the bridge must stop.
    ConnectionLost,
}

/// Everything the bridge loop reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeEvent {
    Bus(InboundMessage),
    Hub(HubEvent),
}

impl From<InboundMessage> for BridgeEvent {
    fn from(message: InboundMessage) -> Self {
        Self::Bus(message)
    }
}

impl From<HubEvent> for BridgeEvent {
    fn from(event: HubEvent) -> Self {
        Self::Hub(event)
    }
}

//! Message-bus port — publish state and subscribe to command topics.
//!
//! Inbound messages are not returned by this trait: the adapter pushes them
//! into the bridge's event channel as
//! [`BridgeEvent::Bus`](hubbridge_domain::event::BridgeEvent::Bus).

use std::future::Future;
use std::sync::Arc;

use hubbridge_domain::error::BridgeError;
use hubbridge_domain::event::OutboundMessage;

/// Publish/subscribe access to the message bus.
pub trait MessageBus {
    /// Publish `message` with at-least-once delivery.
    fn publish(
        &self,
        message: OutboundMessage,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send;

    /// Start receiving messages matching `filter`.
    fn subscribe(&self, filter: &str) -> impl Future<Output = Result<(), BridgeError>> + Send;
}

impl<T: MessageBus + Send + Sync> MessageBus for Arc<T> {
    fn publish(
        &self,
        message: OutboundMessage,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send {
        (**self).publish(message)
    }

    fn subscribe(&self, filter: &str) -> impl Future<Output = Result<(), BridgeError>> + Send {
        (**self).subscribe(filter)
    }
}

//! In-process event channel backed by a bounded tokio [`mpsc`] channel.
//!
//! Adapters hold cloned [`EventSender`]s and push bus messages and hub
//! notifications from their own tasks; the bridge loop is the single
//! consumer, so events are handled strictly one after another.

use tokio::sync::mpsc;

use hubbridge_domain::event::BridgeEvent;

/// Create a channel holding at most `capacity` pending events.
///
/// # Panics
///
/// Panics if `capacity` is zero.
#[must_use]
pub fn channel(capacity: usize) -> (EventSender, EventReceiver) {
    let (sender, receiver) = mpsc::channel(capacity);
    (EventSender { sender }, EventReceiver { receiver })
}

/// Producer half, cheaply cloneable.
#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<BridgeEvent>,
}

impl EventSender {
    /// Queue an event, waiting while the channel is full.
    ///
    /// Returns `false` once the bridge loop has stopped.
    pub async fn send(&self, event: impl Into<BridgeEvent>) -> bool {
        let event = event.into();
        if self.sender.send(event).await.is_err() {
            tracing::debug!("event channel closed, dropping event");
            return false;
        }
        true
    }

    /// Whether the consumer has gone away.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// Consumer half, owned by the bridge loop.
#[derive(Debug)]
pub struct EventReceiver {
    receiver: mpsc::Receiver<BridgeEvent>,
}

impl EventReceiver {
    /// Wait for the next event; `None` once every sender is dropped.
    pub async fn recv(&mut self) -> Option<BridgeEvent> {
        self.receiver.recv().await
    }
}

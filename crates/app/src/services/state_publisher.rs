//! State publisher — mirrors the hub's current activity onto the bus.

use hubbridge_domain::event::{ActivityChange, ActivityProgress, OutboundMessage};
use hubbridge_domain::topic::TopicLayout;

use crate::ports::MessageBus;
use crate::routing_state::RoutingState;

/// What became of one activity change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    /// The label was published retained on the activity topic.
    Published(String),
    /// Intermediate progress, nothing to publish yet.
    Ignored,
    /// The id is not in the last-synced catalog.
    UnknownActivity,
    /// The bus refused the publish.
    BusFailed,
}

pub struct StatePublisher<B> {
    bus: B,
    layout: TopicLayout,
    state: RoutingState,
}

impl<B: MessageBus> StatePublisher<B> {
    pub fn new(bus: B, layout: TopicLayout, state: RoutingState) -> Self {
        Self { bus, layout, state }
    }

    /// Publish the label of a completed activity change.
    #[tracing::instrument(skip(self), fields(activity_id = %change.activity_id))]
    pub async fn handle(&self, change: &ActivityChange) -> PublishOutcome {
        if change.progress != ActivityProgress::Completed {
            tracing::trace!(progress = ?change.progress, "ignoring intermediate activity change");
            return PublishOutcome::Ignored;
        }

        let snapshot = self.state.current();
        let Some(activity) = snapshot.catalog.get(&change.activity_id) else {
            tracing::warn!("activity changed to an unknown id, not publishing");
            return PublishOutcome::UnknownActivity;
        };
        let label = activity.label.clone();

        match self
            .bus
            .publish(OutboundMessage::retained(
                self.layout.activity_state(),
                label.clone(),
            ))
            .await
        {
            Ok(()) => {
                tracing::info!(label = %label, "current activity published");
                PublishOutcome::Published(label)
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to publish current activity");
                PublishOutcome::BusFailed
            }
        }
    }
}

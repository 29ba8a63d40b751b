//! Command router — turns inbound bus messages into hub commands.

use hubbridge_domain::error::BridgeError;
use hubbridge_domain::event::InboundMessage;
use hubbridge_domain::id::ActivityId;
use hubbridge_domain::routing::RouteAction;
use hubbridge_domain::topic::{TopicLayout, is_power_off_payload};

use crate::ports::HubClient;
use crate::routing_state::RoutingState;

/// What became of one inbound message.
#[derive(Debug, PartialEq, Eq)]
pub enum RouteOutcome {
    /// The hub acknowledged the action.
    Dispatched(RouteAction),
    /// Power-off requested while nothing was running.
    AlreadyOff,
    /// `activity/set` named no known activity.
    UnknownActivity(String),
    /// No route for the topic.
    Unroutable,
    /// The hub rejected or never answered the command.
    HubFailed(RouteAction),
}

/// Dispatches bus messages against the live routing snapshot.
///
/// Routing never fails: every problem is logged and reported as a
/// [`RouteOutcome`].
pub struct CommandRouter<H> {
    hub: H,
    layout: TopicLayout,
    state: RoutingState,
}

impl<H: HubClient> CommandRouter<H> {
    pub fn new(hub: H, layout: TopicLayout, state: RoutingState) -> Self {
        Self { hub, layout, state }
    }

    /// Route one message.
    ///
    /// `activity/set` is resolved from its payload; every other topic is
    /// looked up in the routing table and its payload ignored.
    #[tracing::instrument(skip(self, message), fields(topic = %message.topic))]
    pub async fn route(&self, message: &InboundMessage) -> RouteOutcome {
        let snapshot = self.state.current();

        let action = if message.topic == self.layout.activity_set() {
            if is_power_off_payload(&message.payload) {
                RouteAction::PowerOff
            } else if let Some(activity) = snapshot.catalog.find_by_label(&message.payload) {
                activity_action(&activity.id)
            } else {
                tracing::warn!(payload = %message.payload, "unknown activity, dropping message");
                return RouteOutcome::UnknownActivity(message.payload.clone());
            }
        } else if let Some(route) = snapshot.table.get(&message.topic) {
            route.action.clone()
        } else {
            tracing::warn!("unroutable topic, dropping message");
            return RouteOutcome::Unroutable;
        };

        self.dispatch(action).await
    }

    async fn dispatch(&self, action: RouteAction) -> RouteOutcome {
        let result = match &action {
            RouteAction::PressButton { command, .. } => self.hub.press_button(command).await,
            RouteAction::StartActivity { activity_id } => {
                self.hub.start_activity(activity_id).await
            }
            RouteAction::PowerOff => self.hub.power_off().await,
            // resolved from the payload in `route`, never dispatched as-is
            RouteAction::SelectActivity => return RouteOutcome::Unroutable,
        };

        match result {
            Ok(()) => {
                tracing::debug!(%action, "command dispatched");
                RouteOutcome::Dispatched(action)
            }
            Err(BridgeError::NoRunningActivity) if action == RouteAction::PowerOff => {
                tracing::debug!("hub already off");
                RouteOutcome::AlreadyOff
            }
            Err(err) => {
                tracing::error!(%action, error = %err, "hub command failed");
                RouteOutcome::HubFailed(action)
            }
        }
    }
}

fn activity_action(id: &ActivityId) -> RouteAction {
    if id.is_power_off() {
        RouteAction::PowerOff
    } else {
        RouteAction::StartActivity {
            activity_id: id.clone(),
        }
    }
}

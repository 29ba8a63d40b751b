//! Hub port — configuration discovery and command dispatch on the remote hub.
//!
//! The hub client owns the session with the hub, request/response
//! correlation and any transport timeout. Hub-originated notifications are
//! not part of this trait: adapters push them into the bridge's event
//! channel as [`HubEvent`](hubbridge_domain::event::HubEvent)s.

use std::future::Future;
use std::sync::Arc;

use hubbridge_domain::error::BridgeError;
use hubbridge_domain::hub::{ButtonCommand, HubConfig};
use hubbridge_domain::id::ActivityId;

/// Client for one activity-based remote-control hub.
pub trait HubClient {
    /// Fetch the full device/activity configuration in one round trip.
    ///
    /// Fails with [`BridgeError::HubUnavailable`] when the hub cannot be
    /// reached and [`BridgeError::HubProtocol`] when the payload cannot be
    /// decoded.
    fn fetch_config(&self) -> impl Future<Output = Result<HubConfig, BridgeError>> + Send;

    /// Id of the running activity ([`ActivityId::power_off`] when idle).
    fn current_activity(&self) -> impl Future<Output = Result<ActivityId, BridgeError>> + Send;

    /// Switch to `activity_id` and wait for the hub to acknowledge.
    fn start_activity(
        &self,
        activity_id: &ActivityId,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send;

    /// End the running activity.
    ///
    /// Fails with [`BridgeError::NoRunningActivity`] when the hub is already off.
    fn power_off(&self) -> impl Future<Output = Result<(), BridgeError>> + Send;

    /// Press and release one device button.
    fn press_button(
        &self,
        command: &ButtonCommand,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send;
}

impl<T: HubClient + Send + Sync> HubClient for Arc<T> {
    fn fetch_config(&self) -> impl Future<Output = Result<HubConfig, BridgeError>> + Send {
        (**self).fetch_config()
    }

    fn current_activity(&self) -> impl Future<Output = Result<ActivityId, BridgeError>> + Send {
        (**self).current_activity()
    }

    fn start_activity(
        &self,
        activity_id: &ActivityId,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send {
        (**self).start_activity(activity_id)
    }

    fn power_off(&self) -> impl Future<Output = Result<(), BridgeError>> + Send {
        (**self).power_off()
    }

    fn press_button(
        &self,
        command: &ButtonCommand,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send {
        (**self).press_button(command)
    }
}

//! # hubbridge-adapter-virtual
//!
//! Virtual/demo hub that simulates an activity-based remote for testing and
//! demonstration purposes.
//!
//! ## Provided configuration
//!
//! | Device | Groups |
//! |--------|--------|
//! | Virtual TV | Power, Volume, Input |
//! | Virtual Receiver | Volume |
//! | Virtual Player | TransportBasic |
//!
//! Activities: `PowerOff`, `Watch TV`, `Listen to Music`.
//!
//! Starting an activity emits `Started` then `Completed` activity changes on
//! the event channel, the way a real hub notifies its clients.
//!
//! ## Dependency rule
//!
//! Depends on `hubbridge-app` (port traits) and `hubbridge-domain` only.

mod catalog;

use std::sync::{Mutex, MutexGuard, PoisonError};

use hubbridge_app::event_bus::EventSender;
use hubbridge_app::ports::HubClient;
use hubbridge_domain::error::BridgeError;
use hubbridge_domain::event::{ActivityChange, ActivityProgress, HubEvent};
use hubbridge_domain::hub::{ButtonCommand, HubConfig};
use hubbridge_domain::id::ActivityId;

pub use catalog::{
    LISTEN_TO_MUSIC_ID, PLAYER_ID, RECEIVER_ID, TELEVISION_ID, WATCH_TV_ID, demo_config,
};

/// Commands the virtual hub refuses.
#[derive(Debug, thiserror::Error)]
pub enum VirtualHubError {
    #[error("unknown activity `{0}`")]
    UnknownActivity(ActivityId),

    #[error("unknown button command")]
    UnknownCommand,
}

impl From<VirtualHubError> for BridgeError {
    fn from(err: VirtualHubError) -> Self {
        BridgeError::HubProtocol(Box::new(err))
    }
}

struct State {
    config: HubConfig,
    current: ActivityId,
    pressed: Vec<ButtonCommand>,
}

/// Simulated hub serving [`demo_config`] (or any other configuration).
pub struct VirtualHub {
    state: Mutex<State>,
    events: Option<EventSender>,
}

impl Default for VirtualHub {
    fn default() -> Self {
        Self::new(demo_config())
    }
}

impl VirtualHub {
    /// A powered-off hub serving `config`.
    #[must_use]
    pub fn new(config: HubConfig) -> Self {
        Self {
            state: Mutex::new(State {
                config,
                current: ActivityId::power_off(),
                pressed: Vec::new(),
            }),
            events: None,
        }
    }

    /// Emit hub notifications on `events`.
    #[must_use]
    pub fn with_events(mut self, events: EventSender) -> Self {
        self.events = Some(events);
        self
    }

    /// Buttons pressed so far, oldest first.
    #[must_use]
    pub fn pressed(&self) -> Vec<ButtonCommand> {
        self.lock().pressed.clone()
    }

    #[must_use]
    pub fn current(&self) -> ActivityId {
        self.lock().current.clone()
    }

    /// Swap the served configuration and notify a config change.
    pub fn replace_config(&self, config: HubConfig) {
        self.lock().config = config;
        tracing::info!("virtual hub configuration replaced");
        self.notify(vec![HubEvent::ConfigChanged]);
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Deliver notifications from a separate task, as a real hub would.
    fn notify(&self, notifications: Vec<HubEvent>) {
        let Some(events) = self.events.clone() else {
            return;
        };
        tokio::spawn(async move {
            for event in notifications {
                if !events.send(event).await {
                    break;
                }
            }
        });
    }

    fn switch_to(&self, activity_id: &ActivityId) {
        self.lock().current = activity_id.clone();
        tracing::info!(%activity_id, "virtual hub switched activity");
        self.notify(
            [ActivityProgress::Started, ActivityProgress::Completed]
                .into_iter()
                .map(|progress| {
                    HubEvent::ActivityChanged(ActivityChange {
                        activity_id: activity_id.clone(),
                        progress,
                    })
                })
                .collect(),
        );
    }
}

impl HubClient for VirtualHub {
    async fn fetch_config(&self) -> Result<HubConfig, BridgeError> {
        Ok(self.lock().config.clone())
    }

    async fn current_activity(&self) -> Result<ActivityId, BridgeError> {
        Ok(self.current())
    }

    async fn start_activity(&self, activity_id: &ActivityId) -> Result<(), BridgeError> {
        let known = self
            .lock()
            .config
            .activities
            .iter()
            .any(|a| &a.id == activity_id);
        if !known {
            return Err(VirtualHubError::UnknownActivity(activity_id.clone()).into());
        }
        self.switch_to(activity_id);
        Ok(())
    }

    async fn power_off(&self) -> Result<(), BridgeError> {
        if self.current().is_power_off() {
            return Err(BridgeError::NoRunningActivity);
        }
        self.switch_to(&ActivityId::power_off());
        Ok(())
    }

    async fn press_button(&self, command: &ButtonCommand) -> Result<(), BridgeError> {
        let mut state = self.lock();
        let known = state
            .config
            .devices
            .iter()
            .flat_map(|d| &d.control_groups)
            .flat_map(|g| &g.functions)
            .any(|f| &f.action == command);
        if !known {
            return Err(VirtualHubError::UnknownCommand.into());
        }
        state.pressed.push(command.clone());
        tracing::debug!(command = %command.as_str(), "virtual button pressed");
        Ok(())
    }
}

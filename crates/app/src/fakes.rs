//! In-memory port implementations shared by the unit tests of this crate.

use std::future::Future;
use std::io;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::subscriber::DefaultGuard;
use tracing_subscriber::fmt::MakeWriter;

use hubbridge_domain::error::BridgeError;
use hubbridge_domain::event::OutboundMessage;
use hubbridge_domain::hub::{
    Activity, ButtonCommand, ControlGroup, Device, Function, HubConfig,
};
use hubbridge_domain::id::{ActivityId, DeviceId};

use crate::ports::{HubClient, MessageBus};

/// Calls received by [`FakeHub`], in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HubCall {
    FetchConfig,
    CurrentActivity,
    StartActivity(ActivityId),
    PowerOff,
    PressButton(ButtonCommand),
}

/// Scripted failure for the next `fetch_config`.
#[derive(Debug, Clone, Copy)]
pub enum FetchFailure {
    Unreachable,
    ConnectionLost,
}

pub struct FakeHub {
    config: Mutex<HubConfig>,
    current: Mutex<ActivityId>,
    calls: Mutex<Vec<HubCall>>,
    fetch_failure: Mutex<Option<FetchFailure>>,
    fail_commands: Mutex<bool>,
}

impl FakeHub {
    pub fn new(config: HubConfig) -> Self {
        Self {
            config: Mutex::new(config),
            current: Mutex::new(ActivityId::power_off()),
            calls: Mutex::new(Vec::new()),
            fetch_failure: Mutex::new(None),
            fail_commands: Mutex::new(false),
        }
    }

    pub fn calls(&self) -> Vec<HubCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls other than the config/current-activity reads done by a sync.
    pub fn commands(&self) -> Vec<HubCall> {
        self.calls()
            .into_iter()
            .filter(|c| !matches!(c, HubCall::FetchConfig | HubCall::CurrentActivity))
            .collect()
    }

    pub fn set_current(&self, id: ActivityId) {
        *self.current.lock().unwrap() = id;
    }

    pub fn set_config(&self, config: HubConfig) {
        *self.config.lock().unwrap() = config;
    }

    pub fn fail_next_fetch(&self, failure: FetchFailure) {
        *self.fetch_failure.lock().unwrap() = Some(failure);
    }

    pub fn fail_commands(&self) {
        *self.fail_commands.lock().unwrap() = true;
    }

    fn record(&self, call: HubCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn command_result(&self) -> Result<(), BridgeError> {
        if *self.fail_commands.lock().unwrap() {
            return Err(BridgeError::HubUnavailable("hub timed out".into()));
        }
        Ok(())
    }
}

impl HubClient for FakeHub {
    fn fetch_config(&self) -> impl Future<Output = Result<HubConfig, BridgeError>> + Send {
        self.record(HubCall::FetchConfig);
        let result = match self.fetch_failure.lock().unwrap().take() {
            Some(FetchFailure::Unreachable) => {
                Err(BridgeError::HubUnavailable("connection refused".into()))
            }
            Some(FetchFailure::ConnectionLost) => Err(BridgeError::ConnectionLost),
            None => Ok(self.config.lock().unwrap().clone()),
        };
        async { result }
    }

    fn current_activity(&self) -> impl Future<Output = Result<ActivityId, BridgeError>> + Send {
        self.record(HubCall::CurrentActivity);
        let current = self.current.lock().unwrap().clone();
        async { Ok(current) }
    }

    fn start_activity(
        &self,
        activity_id: &ActivityId,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send {
        self.record(HubCall::StartActivity(activity_id.clone()));
        let result = self.command_result();
        if result.is_ok() {
            self.set_current(activity_id.clone());
        }
        async { result }
    }

    fn power_off(&self) -> impl Future<Output = Result<(), BridgeError>> + Send {
        self.record(HubCall::PowerOff);
        let result = if self.current.lock().unwrap().is_power_off() {
            Err(BridgeError::NoRunningActivity)
        } else {
            self.command_result()
        };
        if result.is_ok() {
            self.set_current(ActivityId::power_off());
        }
        async { result }
    }

    fn press_button(
        &self,
        command: &ButtonCommand,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send {
        self.record(HubCall::PressButton(command.clone()));
        let result = self.command_result();
        async { result }
    }
}

#[derive(Default)]
pub struct FakeBus {
    published: Mutex<Vec<OutboundMessage>>,
    subscriptions: Mutex<Vec<String>>,
}

impl FakeBus {
    pub fn published(&self) -> Vec<OutboundMessage> {
        self.published.lock().unwrap().clone()
    }

    pub fn published_on(&self, topic: &str) -> Vec<OutboundMessage> {
        self.published()
            .into_iter()
            .filter(|m| m.topic == topic)
            .collect()
    }

    pub fn subscriptions(&self) -> Vec<String> {
        self.subscriptions.lock().unwrap().clone()
    }
}

impl MessageBus for FakeBus {
    fn publish(
        &self,
        message: OutboundMessage,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send {
        self.published.lock().unwrap().push(message);
        async { Ok(()) }
    }

    fn subscribe(&self, filter: &str) -> impl Future<Output = Result<(), BridgeError>> + Send {
        self.subscriptions.lock().unwrap().push(filter.to_string());
        async { Ok(()) }
    }
}

fn function(name: &str, label: &str) -> Function {
    Function::new(name, label, ButtonCommand::new(format!("{{\"command\":\"{name}\"}}")))
}

/// Two devices with four functions and three activities (PowerOff included).
pub fn living_room() -> HubConfig {
    HubConfig {
        devices: vec![
            Device::new(
                DeviceId::new("1001"),
                "Samsung TV",
                vec![
                    ControlGroup::new("Power", vec![function("PowerToggle", "Power Toggle")]),
                    ControlGroup::new(
                        "Volume",
                        vec![
                            function("VolumeUp", "Volume Up"),
                            function("VolumeDown", "Volume Down"),
                        ],
                    ),
                ],
            ),
            Device::new(
                DeviceId::new("1002"),
                "Denon AVR",
                vec![ControlGroup::new("Volume", vec![function("Mute", "Mute")])],
            ),
        ],
        activities: vec![
            Activity::new(ActivityId::power_off(), "PowerOff"),
            Activity::new(ActivityId::new("2001"), "Watch TV"),
            Activity::new(ActivityId::new("2002"), "Listen to Music"),
        ],
    }
}

/// Formatted log lines recorded by [`capture_logs`].
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    /// Number of recorded events at WARN level.
    pub fn warnings(&self) -> usize {
        let bytes = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&bytes)
            .lines()
            .filter(|line| line.trim_start().starts_with("WARN"))
            .count()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Record every event emitted on this thread until the guard is dropped.
pub fn capture_logs() -> (CapturedLogs, DefaultGuard) {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_max_level(tracing::Level::TRACE)
        .with_ansi(false)
        .without_time()
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);
    (logs, guard)
}

//! Harmony WebSocket protocol — frame building and payload decoding.
//!
//! Every request is wrapped in an `hbus` envelope addressed to the hub id.
//! The hub answers with a frame echoing the request `id` plus a `code`
//! (`200` done, `100` still in progress) and a `data` object. Unsolicited
//! frames carry a `type` instead and are notifications.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use hubbridge_domain::error::DecodeError;
use hubbridge_domain::event::{ActivityChange, ActivityProgress, HubEvent};
use hubbridge_domain::hub::{Activity, ButtonCommand, ControlGroup, Device, Function, HubConfig};
use hubbridge_domain::id::{ActivityId, DeviceId};

use crate::error::HarmonyError;

pub const GET_CONFIG: &str = "vnd.logitech.harmony/vnd.logitech.harmony.engine?config";
pub const GET_CURRENT_ACTIVITY: &str =
    "vnd.logitech.harmony/vnd.logitech.harmony.engine?getCurrentActivity";
pub const RUN_ACTIVITY: &str = "harmony.activityengine?runactivity";
pub const HOLD_ACTION: &str = "vnd.logitech.harmony/vnd.logitech.harmony.engine?holdAction";
pub const PROVISION_INFO: &str = "setup.account?getProvisionInfo";

const START_ACTIVITY_FINISHED: &str = "harmony.engine?startActivityFinished";
const STATE_DIGEST: &str = "connect.stateDigest?notify";

const CODE_OK: u16 = 200;
const CODE_IN_PROGRESS: u16 = 100;

/// Origin header the hub requires on provisioning requests.
pub const PROVISION_ORIGIN: &str = "http://sl.dhg.myharmony.com";

#[derive(Debug, Serialize)]
struct Envelope<'a> {
    #[serde(rename = "hubId")]
    hub_id: &'a str,
    timeout: u64,
    hbus: Hbus<'a>,
}

#[derive(Debug, Serialize)]
struct Hbus<'a> {
    cmd: &'a str,
    id: String,
    params: Value,
}

/// Serialize one request frame.
///
/// # Errors
///
/// Returns [`HarmonyError::Json`] if serialization fails.
pub fn request_frame(
    hub_id: &str,
    id: u64,
    cmd: &str,
    params: Value,
    timeout_secs: u64,
) -> Result<String, HarmonyError> {
    serde_json::to_string(&Envelope {
        hub_id,
        timeout: timeout_secs,
        hbus: Hbus {
            cmd,
            id: id.to_string(),
            params,
        },
    })
    .map_err(HarmonyError::Json)
}

/// Body of the HTTP provisioning request.
#[must_use]
pub fn provision_body() -> Value {
    json!({ "id": 1, "cmd": PROVISION_INFO, "params": {} })
}

#[must_use]
pub fn run_activity_params(activity_id: &ActivityId) -> Value {
    json!({
        "async": "true",
        "timestamp": 0,
        "args": { "rule": "start" },
        "activityId": activity_id.as_str(),
    })
}

/// Whether a button frame presses or releases the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyState {
    Press,
    Release,
}

impl KeyState {
    fn as_str(self) -> &'static str {
        match self {
            Self::Press => "press",
            Self::Release => "release",
        }
    }
}

#[must_use]
pub fn hold_action_params(command: &ButtonCommand, state: KeyState) -> Value {
    json!({
        "status": state.as_str(),
        "timestamp": "0",
        "verb": "render",
        "action": command.as_str(),
    })
}

/// Answer to a request.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub id: String,
    pub code: u16,
    pub message: Option<String>,
    pub data: Value,
}

impl Response {
    /// The hub is still working on the request; more frames will follow.
    #[must_use]
    pub fn is_progress(&self) -> bool {
        self.code == CODE_IN_PROGRESS
    }

    /// Keep the payload of a successful answer to `cmd`.
    ///
    /// # Errors
    ///
    /// Returns [`HarmonyError::Rejected`] for any code other than `200`.
    pub fn into_data(self, cmd: &'static str) -> Result<Value, HarmonyError> {
        if self.code == CODE_OK {
            Ok(self.data)
        } else {
            Err(HarmonyError::Rejected {
                cmd,
                code: self.code,
                message: self.message.unwrap_or_default(),
            })
        }
    }
}

/// One frame read from the socket.
#[derive(Debug, Clone, PartialEq)]
pub enum Incoming {
    Response(Response),
    Notification { kind: String, data: Value },
    Other,
}

/// Classify a text frame.
///
/// # Errors
///
/// Returns [`HarmonyError::Json`] if the frame is not JSON.
pub fn parse_frame(text: &str) -> Result<Incoming, HarmonyError> {
    let mut frame: Value = serde_json::from_str(text).map_err(HarmonyError::Json)?;
    let data = frame.get_mut("data").map(Value::take).unwrap_or(Value::Null);

    if let (Some(id), Some(code)) = (frame.get("id"), frame.get("code")) {
        let Some(code) = lenient_u16(code) else {
            return Ok(Incoming::Other);
        };
        return Ok(Incoming::Response(Response {
            id: lenient_string(id).unwrap_or_default(),
            code,
            message: frame.get("msg").and_then(Value::as_str).map(String::from),
            data,
        }));
    }

    match frame.get("type").and_then(Value::as_str) {
        Some(kind) => Ok(Incoming::Notification {
            kind: kind.to_string(),
            data,
        }),
        None => Ok(Incoming::Other),
    }
}

/// Hub id out of a provisioning answer.
///
/// # Errors
///
/// Returns [`DecodeError::MissingField`] when `data.activeRemoteId` is absent.
pub fn decode_hub_id(body: &Value) -> Result<String, DecodeError> {
    body.get("data")
        .and_then(|data| data.get("activeRemoteId"))
        .and_then(lenient_string)
        .ok_or(DecodeError::MissingField("data.activeRemoteId"))
}

/// Id of the running activity out of a `getCurrentActivity` answer.
///
/// # Errors
///
/// Returns [`DecodeError::MissingField`] when `result` is absent.
pub fn decode_current_activity(data: &Value) -> Result<ActivityId, DecodeError> {
    data.get("result")
        .and_then(lenient_string)
        .map(ActivityId::new)
        .ok_or(DecodeError::MissingField("result"))
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default)]
    activity: Vec<RawActivity>,
    #[serde(default)]
    device: Vec<RawDevice>,
}

#[derive(Debug, Deserialize)]
struct RawActivity {
    #[serde(deserialize_with = "string_or_number")]
    id: String,
    label: String,
}

#[derive(Debug, Deserialize)]
struct RawDevice {
    #[serde(deserialize_with = "string_or_number")]
    id: String,
    label: String,
    #[serde(default)]
    manufacturer: Option<String>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default, rename = "controlGroup")]
    control_group: Vec<RawControlGroup>,
}

#[derive(Debug, Deserialize)]
struct RawControlGroup {
    name: String,
    #[serde(default)]
    function: Vec<RawFunction>,
}

#[derive(Debug, Deserialize)]
struct RawFunction {
    name: String,
    #[serde(default)]
    label: Option<String>,
    action: String,
}

/// Map a `config` answer onto the domain configuration, keeping hub order.
///
/// # Errors
///
/// Returns [`DecodeError::InvalidField`] when the payload does not have the
/// expected shape.
pub fn decode_config(data: Value) -> Result<HubConfig, DecodeError> {
    let raw: RawConfig = serde_json::from_value(data).map_err(|err| DecodeError::InvalidField {
        field: "data",
        reason: err.to_string(),
    })?;

    let devices = raw
        .device
        .into_iter()
        .map(|device| {
            let groups = device
                .control_group
                .into_iter()
                .map(|group| {
                    let functions = group
                        .function
                        .into_iter()
                        .map(|f| {
                            let label = f.label.unwrap_or_else(|| f.name.clone());
                            Function::new(f.name, label, ButtonCommand::new(f.action))
                        })
                        .collect();
                    ControlGroup::new(group.name, functions)
                })
                .collect();
            let mut out = Device::new(DeviceId::new(device.id), device.label, groups);
            out.manufacturer = device.manufacturer;
            out.model = device.model;
            out
        })
        .collect();

    let activities = raw
        .activity
        .into_iter()
        .map(|a| Activity::new(ActivityId::new(a.id), a.label))
        .collect();

    Ok(HubConfig {
        devices,
        activities,
    })
}

/// Turns the hub's notification stream into [`HubEvent`]s.
///
/// State digests repeat the whole hub state, so the tracker remembers the
/// last config version, whether an activity switch is under way and which
/// activity was last reported completed. A switch completes once, whether
/// the digest or `startActivityFinished` arrives first.
#[derive(Debug, Default)]
pub struct NotificationTracker {
    config_version: Option<u64>,
    switching: bool,
    completed: Option<String>,
}

impl NotificationTracker {
    pub fn interpret(&mut self, kind: &str, data: &Value) -> Vec<HubEvent> {
        match kind {
            START_ACTIVITY_FINISHED => {
                self.switching = false;
                data.get("activityId")
                    .and_then(lenient_string)
                    .and_then(|id| self.complete(id))
                    .into_iter()
                    .collect()
            }
            STATE_DIGEST => self.digest(data),
            _ => Vec::new(),
        }
    }

    fn digest(&mut self, data: &Value) -> Vec<HubEvent> {
        let mut events = Vec::new();

        if let Some(version) = data.get("configVersion").and_then(lenient_u64) {
            if self.config_version.is_some_and(|known| known != version) {
                events.push(HubEvent::ConfigChanged);
            }
            self.config_version = Some(version);
        }

        let status = data.get("activityStatus").and_then(lenient_u64);
        let activity_id = data.get("activityId").and_then(lenient_string);
        if let (Some(status), Some(id)) = (status, activity_id) {
            match status {
                // 1: starting, 3: powering off
                1 | 3 => {
                    self.switching = true;
                    self.completed = None;
                    events.push(activity_changed(id, ActivityProgress::Started));
                }
                // 0: off, 2: running
                0 | 2 if self.switching => {
                    self.switching = false;
                    events.extend(self.complete(id));
                }
                _ => {}
            }
        }

        events
    }

    /// `Completed` for `id` unless it was already reported for this switch.
    fn complete(&mut self, id: String) -> Option<HubEvent> {
        if self.completed.as_deref() == Some(id.as_str()) {
            return None;
        }
        self.completed = Some(id.clone());
        Some(activity_changed(id, ActivityProgress::Completed))
    }
}

fn activity_changed(id: String, progress: ActivityProgress) -> HubEvent {
    HubEvent::ActivityChanged(ActivityChange {
        activity_id: ActivityId::new(id),
        progress,
    })
}

fn lenient_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn lenient_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn lenient_u16(value: &Value) -> Option<u16> {
    lenient_u64(value).and_then(|n| u16::try_from(n).ok())
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    lenient_string(&value).ok_or_else(|| serde::de::Error::custom("expected a string or a number"))
}

//! Hub graph — the device/activity configuration reported by the hub.

use serde::{Deserialize, Serialize};

use crate::id::{ActivityId, DeviceId};

/// Opaque command payload for a single control.
///
/// Only the hub client understands its content (for Harmony hubs it is a
/// JSON document naming the IR command and target device).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ButtonCommand(String);

impl ButtonCommand {
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A single invocable control within a [`ControlGroup`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Function {
    /// Identity within the group (e.g. `"VolumeUp"`).
    pub name: String,
    /// Display label (e.g. `"Volume Up"`).
    pub label: String,
    pub action: ButtonCommand,
}

impl Function {
    #[must_use]
    pub fn new(name: impl Into<String>, label: impl Into<String>, action: ButtonCommand) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            action,
        }
    }
}

/// Named group of functions within a [`Device`] (e.g. `"Volume"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlGroup {
    pub name: String,
    pub functions: Vec<Function>,
}

impl ControlGroup {
    #[must_use]
    pub fn new(name: impl Into<String>, functions: Vec<Function>) -> Self {
        Self {
            name: name.into(),
            functions,
        }
    }
}

/// A physical device controlled by the hub.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    pub label: String,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub control_groups: Vec<ControlGroup>,
}

impl Device {
    #[must_use]
    pub fn new(id: DeviceId, label: impl Into<String>, control_groups: Vec<ControlGroup>) -> Self {
        Self {
            id,
            label: label.into(),
            manufacturer: None,
            model: None,
            control_groups,
        }
    }

    /// Number of functions across all groups.
    #[must_use]
    pub fn function_count(&self) -> usize {
        self.control_groups.iter().map(|g| g.functions.len()).sum()
    }
}

/// A hub-level mode that drives several devices at once (e.g. `"Watch TV"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub id: ActivityId,
    pub label: String,
}

impl Activity {
    #[must_use]
    pub fn new(id: ActivityId, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
        }
    }
}

/// Full configuration snapshot returned by the hub.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HubConfig {
    pub devices: Vec<Device>,
    pub activities: Vec<Activity>,
}

impl HubConfig {
    /// Number of (device, group, function) triples.
    #[must_use]
    pub fn function_count(&self) -> usize {
        self.devices.iter().map(Device::function_count).sum()
    }
}

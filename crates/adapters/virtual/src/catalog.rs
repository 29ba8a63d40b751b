//! Demo hub configuration — a television, an AV receiver and a media player.
//!
//! Ids are fixed so topics and activity ids stay stable across restarts.

use hubbridge_domain::hub::{Activity, ButtonCommand, ControlGroup, Device, Function, HubConfig};
use hubbridge_domain::id::{ActivityId, DeviceId};

pub const TELEVISION_ID: &str = "50001";
pub const RECEIVER_ID: &str = "50002";
pub const PLAYER_ID: &str = "50003";

pub const WATCH_TV_ID: &str = "60001";
pub const LISTEN_TO_MUSIC_ID: &str = "60002";

fn function(device_id: &str, name: &str, label: &str) -> Function {
    Function::new(
        name,
        label,
        ButtonCommand::new(format!(
            "{{\"command\":\"{name}\",\"type\":\"IRCommand\",\"deviceId\":\"{device_id}\"}}"
        )),
    )
}

fn group(device_id: &str, name: &str, functions: &[(&str, &str)]) -> ControlGroup {
    ControlGroup::new(
        name,
        functions
            .iter()
            .map(|(fname, flabel)| function(device_id, fname, flabel))
            .collect(),
    )
}

fn device(id: &str, label: &str, model: &str, groups: Vec<ControlGroup>) -> Device {
    let mut device = Device::new(DeviceId::new(id), label, groups);
    device.manufacturer = Some("hubbridge".to_string());
    device.model = Some(model.to_string());
    device
}

/// The configuration served by a fresh virtual hub.
#[must_use]
pub fn demo_config() -> HubConfig {
    HubConfig {
        devices: vec![
            device(
                TELEVISION_ID,
                "Virtual TV",
                "VTV-1",
                vec![
                    group(
                        TELEVISION_ID,
                        "Power",
                        &[("PowerOn", "Power On"), ("PowerOff", "Power Off")],
                    ),
                    group(
                        TELEVISION_ID,
                        "Volume",
                        &[("VolumeUp", "Volume Up"), ("VolumeDown", "Volume Down")],
                    ),
                    group(
                        TELEVISION_ID,
                        "Input",
                        &[("InputHdmi1", "HDMI 1"), ("InputHdmi2", "HDMI 2")],
                    ),
                ],
            ),
            device(
                RECEIVER_ID,
                "Virtual Receiver",
                "VAVR-1",
                vec![group(
                    RECEIVER_ID,
                    "Volume",
                    &[
                        ("VolumeUp", "Volume Up"),
                        ("VolumeDown", "Volume Down"),
                        ("Mute", "Mute"),
                    ],
                )],
            ),
            device(
                PLAYER_ID,
                "Virtual Player",
                "VMP-1",
                vec![group(
                    PLAYER_ID,
                    "TransportBasic",
                    &[("Play", "Play"), ("Pause", "Pause"), ("Stop", "Stop")],
                )],
            ),
        ],
        activities: vec![
            Activity::new(ActivityId::power_off(), "PowerOff"),
            Activity::new(ActivityId::new(WATCH_TV_ID), "Watch TV"),
            Activity::new(ActivityId::new(LISTEN_TO_MUSIC_ID), "Listen to Music"),
        ],
    }
}

//! Routing table — bus topic → hub action.
//!
//! The table is built in one pass from a [`HubConfig`] and never patched
//! afterwards: a configuration change produces a brand-new table.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use serde::Serialize;

use crate::hub::{ButtonCommand, HubConfig};
use crate::id::{ActivityId, DeviceId};
use crate::topic::TopicLayout;

/// Hub action bound to a topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RouteAction {
    /// Press (and release) one device button.
    PressButton {
        device_id: DeviceId,
        command: ButtonCommand,
    },
    /// Switch to a specific activity.
    StartActivity { activity_id: ActivityId },
    /// Start the activity named by the message payload, or power off.
    SelectActivity,
    /// End the running activity.
    PowerOff,
}

impl std::fmt::Display for RouteAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PressButton { device_id, .. } => write!(f, "press_button({device_id})"),
            Self::StartActivity { activity_id } => write!(f, "start_activity({activity_id})"),
            Self::SelectActivity => f.write_str("select_activity"),
            Self::PowerOff => f.write_str("power_off"),
        }
    }
}

/// What a route was derived from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RouteSource {
    Control {
        device: String,
        group: String,
        control: String,
    },
    Activity {
        id: ActivityId,
        label: String,
    },
    Selector,
}

impl std::fmt::Display for RouteSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Control {
                device,
                group,
                control,
            } => write!(f, "{device} / {group} / {control}"),
            Self::Activity { label, .. } => write!(f, "activity {label}"),
            Self::Selector => f.write_str("activity selector"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Route {
    pub action: RouteAction,
    pub source: RouteSource,
}

/// A route dropped because an earlier one already claimed its topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Collision {
    pub topic: String,
    pub kept: RouteSource,
    pub dropped: RouteSource,
}

/// Immutable topic → action map with the collisions met while building it.
#[derive(Debug, Clone, Default)]
pub struct RoutingTable {
    routes: BTreeMap<String, Route>,
    collisions: Vec<Collision>,
}

impl RoutingTable {
    /// Build the table for `config` under `layout`.
    ///
    /// Enumeration order is devices → groups → functions, then activities,
    /// then the activity selector. On a topic collision the first route wins
    /// and the later one is recorded in [`collisions`](Self::collisions).
    #[must_use]
    pub fn build(layout: &TopicLayout, config: &HubConfig) -> Self {
        let mut table = Self::default();

        for device in &config.devices {
            for group in &device.control_groups {
                for function in &group.functions {
                    table.insert(
                        layout.device_command(&device.label, &group.name, &function.name),
                        Route {
                            action: RouteAction::PressButton {
                                device_id: device.id.clone(),
                                command: function.action.clone(),
                            },
                            source: RouteSource::Control {
                                device: device.label.clone(),
                                group: group.name.clone(),
                                control: function.name.clone(),
                            },
                        },
                    );
                }
            }
        }

        for activity in &config.activities {
            let action = if activity.id.is_power_off() {
                RouteAction::PowerOff
            } else {
                RouteAction::StartActivity {
                    activity_id: activity.id.clone(),
                }
            };
            table.insert(
                layout.activity_command(&activity.label),
                Route {
                    action,
                    source: RouteSource::Activity {
                        id: activity.id.clone(),
                        label: activity.label.clone(),
                    },
                },
            );
        }

        table.insert(
            layout.activity_set(),
            Route {
                action: RouteAction::SelectActivity,
                source: RouteSource::Selector,
            },
        );

        table
    }

    fn insert(&mut self, topic: String, route: Route) {
        match self.routes.entry(topic) {
            Entry::Vacant(slot) => {
                slot.insert(route);
            }
            Entry::Occupied(slot) => {
                self.collisions.push(Collision {
                    topic: slot.key().clone(),
                    kept: slot.get().source.clone(),
                    dropped: route.source,
                });
            }
        }
    }

    #[must_use]
    pub fn get(&self, topic: &str) -> Option<&Route> {
        self.routes.get(topic)
    }

    /// Routes ordered by topic.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Route)> {
        self.routes.iter().map(|(topic, route)| (topic.as_str(), route))
    }

    #[must_use]
    pub fn collisions(&self) -> &[Collision] {
        &self.collisions
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hub::{Activity, ControlGroup, Device, Function};

    fn layout() -> TopicLayout {
        TopicLayout::new("harmony", "Hub")
    }

    fn function(name: &str) -> Function {
        Function::new(name, name, ButtonCommand::new(format!("cmd:{name}")))
    }

    fn config() -> HubConfig {
        HubConfig {
            devices: vec![
                Device::new(
                    DeviceId::new("1"),
                    "TV",
                    vec![
                        ControlGroup::new("Power", vec![function("PowerOn"), function("PowerOff")]),
                        ControlGroup::new("Volume", vec![function("VolumeUp")]),
                    ],
                ),
                Device::new(
                    DeviceId::new("2"),
                    "Receiver",
                    vec![ControlGroup::new("Volume", vec![function("Mute")])],
                ),
            ],
            activities: vec![
                Activity::new(ActivityId::power_off(), "PowerOff"),
                Activity::new(ActivityId::new("100"), "Watch TV"),
            ],
        }
    }

    #[test]
    fn should_hold_one_route_per_function_and_activity_plus_selector() {
        let config = config();
        let table = RoutingTable::build(&layout(), &config);
        assert_eq!(
            table.len(),
            config.function_count() + config.activities.len() + 1
        );
        assert!(table.collisions().is_empty());
    }

    #[test]
    fn should_map_device_topic_to_button_press() {
        let table = RoutingTable::build(&layout(), &config());
        let route = table
            .get("harmony/hub/devices/tv/volume/volumeup/set")
            .unwrap();
        assert_eq!(
            route.action,
            RouteAction::PressButton {
                device_id: DeviceId::new("1"),
                command: ButtonCommand::new("cmd:VolumeUp"),
            }
        );
    }

    #[test]
    fn should_map_activity_topic_to_activity_switch() {
        let table = RoutingTable::build(&layout(), &config());
        let route = table.get("harmony/hub/activity/watch-tv/set").unwrap();
        assert_eq!(
            route.action,
            RouteAction::StartActivity {
                activity_id: ActivityId::new("100")
            }
        );
    }

    #[test]
    fn should_map_power_off_activity_to_power_off() {
        let table = RoutingTable::build(&layout(), &config());
        let route = table.get("harmony/hub/activity/poweroff/set").unwrap();
        assert_eq!(route.action, RouteAction::PowerOff);
    }

    #[test]
    fn should_register_activity_selector() {
        let table = RoutingTable::build(&layout(), &config());
        let route = table.get("harmony/hub/activity/set").unwrap();
        assert_eq!(route.action, RouteAction::SelectActivity);
        assert_eq!(route.source, RouteSource::Selector);
    }

    #[test]
    fn should_keep_first_route_on_slug_collision() {
        let config = HubConfig {
            devices: vec![Device::new(
                DeviceId::new("1"),
                "TV",
                vec![ControlGroup::new(
                    "Input",
                    vec![function("HDMI 1"), function("hdmi-1")],
                )],
            )],
            activities: vec![],
        };
        let table = RoutingTable::build(&layout(), &config);

        assert_eq!(table.len(), 2);
        let route = table.get("harmony/hub/devices/tv/input/hdmi-1/set").unwrap();
        assert_eq!(
            route.action,
            RouteAction::PressButton {
                device_id: DeviceId::new("1"),
                command: ButtonCommand::new("cmd:HDMI 1"),
            }
        );

        let collisions = table.collisions();
        assert_eq!(collisions.len(), 1);
        assert_eq!(collisions[0].topic, "harmony/hub/devices/tv/input/hdmi-1/set");
        assert!(matches!(
            &collisions[0].dropped,
            RouteSource::Control { control, .. } if control == "hdmi-1"
        ));
    }

    #[test]
    fn should_keep_first_activity_on_duplicate_label() {
        let config = HubConfig {
            devices: vec![],
            activities: vec![
                Activity::new(ActivityId::new("1"), "Watch TV"),
                Activity::new(ActivityId::new("2"), "Watch TV"),
            ],
        };
        let table = RoutingTable::build(&layout(), &config);
        let route = table.get("harmony/hub/activity/watch-tv/set").unwrap();
        assert_eq!(
            route.action,
            RouteAction::StartActivity {
                activity_id: ActivityId::new("1")
            }
        );
        assert_eq!(table.len() + table.collisions().len(), 3);
    }

    #[test]
    fn should_build_identical_tables_from_identical_config() {
        let a = RoutingTable::build(&layout(), &config());
        let b = RoutingTable::build(&layout(), &config());
        let topics_a: Vec<_> = a.iter().map(|(t, _)| t.to_string()).collect();
        let topics_b: Vec<_> = b.iter().map(|(t, _)| t.to_string()).collect();
        assert_eq!(topics_a, topics_b);
    }

    #[test]
    fn should_hold_only_selector_for_empty_config() {
        let table = RoutingTable::build(&layout(), &HubConfig::default());
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn should_display_actions() {
        assert_eq!(RouteAction::PowerOff.to_string(), "power_off");
        assert_eq!(
            RouteAction::StartActivity {
                activity_id: ActivityId::new("7")
            }
            .to_string(),
            "start_activity(7)"
        );
    }
}

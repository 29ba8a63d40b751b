//! Topology document — the retained discovery payload describing every
//! control the bridge exposes and its command/state topics.

use serde::Serialize;

use crate::activity::ActivityCatalog;
use crate::hub::HubConfig;
use crate::id::DeviceId;
use crate::routing::{RouteSource, RoutingTable};
use crate::time::Timestamp;
use crate::topic::{TopicLayout, slug};

/// Name of the selector control on the synthetic hub device.
pub const ACTIVITY_SELECTOR: &str = "Activity";

/// One control as seen by bus subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TopologyControl {
    /// Stateless push button.
    Button {
        #[serde(skip_serializing_if = "Option::is_none")]
        group: Option<String>,
        name: String,
        label: String,
        command_topic: String,
    },
    /// Stateful selector over a fixed list of options.
    Selector {
        name: String,
        state_topic: String,
        command_topic: String,
        options: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopologyDevice {
    /// Hub-assigned id; `None` for the synthetic hub device.
    pub id: Option<DeviceId>,
    pub name: String,
    pub slug: String,
    pub synthetic: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub controls: Vec<TopologyControl>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Topology {
    pub hub: String,
    pub root: String,
    pub generation: u64,
    pub synced_at: Timestamp,
    pub devices: Vec<TopologyDevice>,
}

/// Inputs for [`Topology::build`].
pub struct TopologySource<'a> {
    pub hub_name: &'a str,
    pub layout: &'a TopicLayout,
    pub config: &'a HubConfig,
    pub catalog: &'a ActivityCatalog,
    pub table: &'a RoutingTable,
}

impl Topology {
    /// Describe every routed topic of `source.table`.
    ///
    /// Controls that lost their topic to an earlier collision are left out,
    /// since their topic triggers somebody else's action.
    #[must_use]
    pub fn build(source: &TopologySource<'_>, generation: u64, synced_at: Timestamp) -> Self {
        let TopologySource {
            hub_name,
            layout,
            config,
            catalog,
            table,
        } = source;

        let mut devices: Vec<TopologyDevice> = config
            .devices
            .iter()
            .map(|device| {
                let controls = device
                    .control_groups
                    .iter()
                    .flat_map(|group| {
                        group.functions.iter().filter_map(move |function| {
                            let topic =
                                layout.device_command(&device.label, &group.name, &function.name);
                            let owned = table.get(&topic).is_some_and(|route| {
                                matches!(
                                    &route.source,
                                    RouteSource::Control { device: d, group: g, control: c }
                                        if *d == device.label && *g == group.name && *c == function.name
                                )
                            });
                            owned.then(|| TopologyControl::Button {
                                group: Some(group.name.clone()),
                                name: function.name.clone(),
                                label: function.label.clone(),
                                command_topic: topic,
                            })
                        })
                    })
                    .collect();

                TopologyDevice {
                    id: Some(device.id.clone()),
                    name: device.label.clone(),
                    slug: slug(&device.label),
                    synthetic: false,
                    manufacturer: device.manufacturer.clone(),
                    model: device.model.clone(),
                    controls,
                }
            })
            .collect();

        devices.push(hub_device(hub_name, layout, catalog, table));

        Self {
            hub: (*hub_name).to_string(),
            root: layout.root().to_string(),
            generation,
            synced_at,
            devices,
        }
    }

    /// Serialize as the JSON payload published on the topology topic.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// The synthetic device standing for the hub itself: one button per
/// activity plus the activity selector.
fn hub_device(
    hub_name: &str,
    layout: &TopicLayout,
    catalog: &ActivityCatalog,
    table: &RoutingTable,
) -> TopologyDevice {
    let mut controls: Vec<TopologyControl> = catalog
        .activities()
        .iter()
        .filter_map(|activity| {
            let topic = layout.activity_command(&activity.label);
            let owned = table.get(&topic).is_some_and(
                |route| matches!(&route.source, RouteSource::Activity { id, .. } if *id == activity.id),
            );
            owned.then(|| TopologyControl::Button {
                group: None,
                name: activity.label.clone(),
                label: activity.label.clone(),
                command_topic: topic,
            })
        })
        .collect();

    controls.push(TopologyControl::Selector {
        name: ACTIVITY_SELECTOR.to_string(),
        state_topic: layout.activity_state(),
        command_topic: layout.activity_set(),
        options: catalog.labels().into_iter().map(str::to_string).collect(),
    });

    TopologyDevice {
        id: None,
        name: hub_name.to_string(),
        slug: slug(hub_name),
        synthetic: true,
        manufacturer: None,
        model: None,
        controls,
    }
}

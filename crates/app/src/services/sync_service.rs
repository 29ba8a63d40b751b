//! Sync service — fetches the hub configuration and rebuilds routing.

use hubbridge_domain::activity::ActivityCatalog;
use hubbridge_domain::error::BridgeError;
use hubbridge_domain::event::OutboundMessage;
use hubbridge_domain::routing::RoutingTable;
use hubbridge_domain::time::now;
use hubbridge_domain::topic::TopicLayout;
use hubbridge_domain::topology::{Topology, TopologySource};

use crate::ports::{HubClient, MessageBus};
use crate::routing_state::{RoutingSnapshot, RoutingState};

/// Summary of a completed sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub generation: u64,
    pub routes: usize,
    pub collisions: usize,
    pub activities: usize,
    /// Label of the running activity, if the hub reported a known one.
    pub current_activity: Option<String>,
}

/// Rebuilds the routing snapshot from the hub's configuration.
///
/// This is the only writer of the [`RoutingState`].
pub struct SyncService<H, B> {
    hub: H,
    bus: B,
    hub_name: String,
    layout: TopicLayout,
    state: RoutingState,
}

impl<H: HubClient, B: MessageBus> SyncService<H, B> {
    /// Create a new service writing into `state`.
    pub fn new(
        hub: H,
        bus: B,
        hub_name: impl Into<String>,
        layout: TopicLayout,
        state: RoutingState,
    ) -> Self {
        Self {
            hub,
            bus,
            hub_name: hub_name.into(),
            layout,
            state,
        }
    }

    /// Fetch the hub configuration, rebuild the routing snapshot from
    /// scratch, swap it in and publish the topology and current activity.
    ///
    /// The live snapshot is only replaced once both hub round trips have
    /// succeeded; on failure the previous snapshot stays in effect.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::HubUnavailable`] or [`BridgeError::HubProtocol`]
    /// from the hub, or [`BridgeError::Bus`] when the retained state cannot
    /// be published (the new snapshot is live at that point).
    #[tracing::instrument(skip(self), fields(root = %self.layout.root()))]
    pub async fn sync(&self) -> Result<SyncReport, BridgeError> {
        let config = self.hub.fetch_config().await?;

        let table = RoutingTable::build(&self.layout, &config);
        for collision in table.collisions() {
            tracing::warn!(
                topic = %collision.topic,
                kept = %collision.kept,
                dropped = %collision.dropped,
                "topic collision, keeping first mapping"
            );
        }

        let catalog = ActivityCatalog::new(config.activities.clone());
        for duplicate in catalog.duplicate_labels() {
            tracing::warn!(
                activity_id = %duplicate.id,
                label = %duplicate.label,
                "duplicate activity label, only the first activity is selectable by label"
            );
        }

        let current_id = self.hub.current_activity().await?;
        let current_activity = catalog.get(&current_id).map(|a| a.label.clone());
        if current_activity.is_none() {
            tracing::warn!(activity_id = %current_id, "hub reports an unknown current activity");
        }

        let generation = self.state.current().generation + 1;
        let synced_at = now();
        let topology = Topology::build(
            &TopologySource {
                hub_name: &self.hub_name,
                layout: &self.layout,
                config: &config,
                catalog: &catalog,
                table: &table,
            },
            generation,
            synced_at,
        );
        let topology_json = topology
            .to_json()
            .map_err(|err| BridgeError::Bus(Box::new(err)))?;

        let report = SyncReport {
            generation,
            routes: table.len(),
            collisions: table.collisions().len(),
            activities: catalog.len(),
            current_activity: current_activity.clone(),
        };

        self.state.replace(RoutingSnapshot {
            generation,
            synced_at: Some(synced_at),
            table,
            catalog,
        });

        self.bus
            .publish(OutboundMessage::retained(self.layout.topology(), topology_json))
            .await?;
        if let Some(label) = current_activity {
            self.bus
                .publish(OutboundMessage::retained(self.layout.activity_state(), label))
                .await?;
        }

        tracing::info!(
            generation,
            routes = report.routes,
            collisions = report.collisions,
            activities = report.activities,
            "hub configuration synchronized"
        );
        Ok(report)
    }
}

//! Bridge — the event loop tying the hub and the message bus together.
//!
//! The bridge owns the services and consumes the single [`EventReceiver`]
//! fed by the adapters. Events are handled one at a time, so a hub round
//! trip always completes before the next message is looked at.

use std::sync::Arc;

use hubbridge_domain::error::BridgeError;
use hubbridge_domain::event::{BridgeEvent, HubEvent, OutboundMessage};
use hubbridge_domain::topic::{STATUS_OFFLINE, STATUS_ONLINE, TopicLayout};

use crate::event_bus::EventReceiver;
use crate::ports::{HubClient, MessageBus};
use crate::routing_state::RoutingState;
use crate::services::{CommandRouter, StatePublisher, SyncReport, SyncService};

pub struct Bridge<H, B> {
    bus: Arc<B>,
    layout: TopicLayout,
    state: RoutingState,
    sync: SyncService<Arc<H>, Arc<B>>,
    router: CommandRouter<Arc<H>>,
    publisher: StatePublisher<Arc<B>>,
}

impl<H, B> Bridge<H, B>
where
    H: HubClient + Send + Sync,
    B: MessageBus + Send + Sync,
{
    /// Wire up the services for the hub called `hub_name`, publishing under
    /// the topic `prefix`.
    pub fn new(hub: Arc<H>, bus: Arc<B>, hub_name: &str, prefix: &str) -> Self {
        let layout = TopicLayout::new(prefix, hub_name);
        let state = RoutingState::new();
        Self {
            sync: SyncService::new(
                Arc::clone(&hub),
                Arc::clone(&bus),
                hub_name,
                layout.clone(),
                state.clone(),
            ),
            router: CommandRouter::new(hub, layout.clone(), state.clone()),
            publisher: StatePublisher::new(Arc::clone(&bus), layout.clone(), state.clone()),
            bus,
            layout,
            state,
        }
    }

    #[must_use]
    pub fn layout(&self) -> &TopicLayout {
        &self.layout
    }

    /// Handle to the live routing snapshot.
    #[must_use]
    pub fn state(&self) -> &RoutingState {
        &self.state
    }

    /// Sync, go online and process events until the channel closes.
    ///
    /// # Errors
    ///
    /// Returns the error of a failed first sync, a failed subscription or
    /// [`BridgeError::ConnectionLost`] once the hub socket is gone.
    pub async fn run(&self, mut events: EventReceiver) -> Result<(), BridgeError> {
        self.start().await?;

        while let Some(event) = events.recv().await {
            self.handle(event).await?;
        }

        tracing::info!("event channel closed, stopping bridge");
        Ok(())
    }

    /// Perform the first sync, announce availability and subscribe to the
    /// command topics.
    ///
    /// Nothing is subscribed before the routing table exists.
    ///
    /// # Errors
    ///
    /// Returns any hub or bus error met on the way.
    #[tracing::instrument(skip(self), fields(root = %self.layout.root()))]
    pub async fn start(&self) -> Result<SyncReport, BridgeError> {
        let report = self.sync.sync().await?;

        self.bus
            .publish(OutboundMessage::retained(self.layout.status(), STATUS_ONLINE))
            .await?;
        for filter in self.layout.command_filters() {
            self.bus.subscribe(&filter).await?;
        }

        tracing::info!(generation = report.generation, "bridge online");
        Ok(report)
    }

    /// Handle a single event.
    ///
    /// # Errors
    ///
    /// Only fatal errors are returned; everything else is logged.
    pub async fn handle(&self, event: BridgeEvent) -> Result<(), BridgeError> {
        match event {
            BridgeEvent::Bus(message) if message.topic == self.layout.sync_command() => {
                tracing::info!("re-sync requested over the bus");
                self.resync().await
            }
            BridgeEvent::Bus(message) => {
                self.router.route(&message).await;
                Ok(())
            }
            BridgeEvent::Hub(HubEvent::ActivityChanged(change)) => {
                self.publisher.handle(&change).await;
                Ok(())
            }
            BridgeEvent::Hub(HubEvent::ConfigChanged) => {
                tracing::info!("hub configuration changed");
                self.resync().await
            }
            BridgeEvent::Hub(HubEvent::ConnectionLost) => {
                tracing::error!("hub connection lost");
                Err(BridgeError::ConnectionLost)
            }
        }
    }

    /// Re-sync, keeping the previous snapshot when it fails.
    async fn resync(&self) -> Result<(), BridgeError> {
        match self.sync.sync().await {
            Ok(_) => Ok(()),
            Err(err) if err.is_fatal() => Err(err),
            Err(err) => {
                tracing::error!(
                    %err,
                    generation = self.state.current().generation,
                    "re-sync failed, keeping previous routing table"
                );
                Ok(())
            }
        }
    }

    /// Publish the retained `offline` status ahead of a clean shutdown.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Bus`] when the bus refuses the publish.
    pub async fn announce_offline(&self) -> Result<(), BridgeError> {
        self.bus
            .publish(OutboundMessage::retained(self.layout.status(), STATUS_OFFLINE))
            .await
    }
}

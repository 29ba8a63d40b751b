//! # hubbridged — hub bridge daemon
//!
//! Composition root that wires the hub and MQTT adapters together and runs
//! the bridge.
//!
//! ## Responsibilities
//! - Load configuration (config file, env vars)
//! - Initialise structured logging
//! - Connect to the MQTT broker and to the configured hub backend
//! - Run the bridge loop until the hub connection drops or a shutdown
//!   signal (SIGTERM/SIGINT) arrives
//! - Announce `offline` and disconnect cleanly on the way out
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use hubbridge_adapter_harmony::HarmonyClient;
use hubbridge_adapter_mqtt::MqttBus;
use hubbridge_adapter_virtual::VirtualHub;
use hubbridge_app::bridge::Bridge;
use hubbridge_app::event_bus::{self, EventReceiver};
use hubbridge_app::ports::HubClient;
use hubbridge_domain::topic::TopicLayout;

use crate::config::{Config, HubBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    let (events, receiver) = event_bus::channel(config.bridge.event_capacity);

    let layout = TopicLayout::new(&config.mqtt.base_topic, &config.hub.name);
    let bus = Arc::new(MqttBus::connect(
        &config.mqtt,
        &layout.status(),
        events.clone(),
    ));
    tracing::info!(root = %layout.root(), backend = ?config.hub.backend, "starting bridge");

    match config.hub.backend {
        HubBackend::Harmony => {
            let harmony = config.hub.harmony();
            let hub = HarmonyClient::connect(&harmony, events)
                .await
                .with_context(|| format!("failed to connect to hub at {}", harmony.host))?;
            tracing::info!(hub_id = hub.hub_id(), "connected to harmony hub");
            run_bridge(Arc::new(hub), bus, &config, receiver).await
        }
        HubBackend::Virtual => {
            tracing::info!("using the virtual hub");
            let hub = VirtualHub::default().with_events(events);
            run_bridge(Arc::new(hub), bus, &config, receiver).await
        }
    }
}

async fn run_bridge<H>(
    hub: Arc<H>,
    bus: Arc<MqttBus>,
    config: &Config,
    receiver: EventReceiver,
) -> anyhow::Result<()>
where
    H: HubClient + Send + Sync,
{
    let bridge = Bridge::new(hub, Arc::clone(&bus), &config.hub.name, &config.mqtt.base_topic);

    let result = tokio::select! {
        result = bridge.run(receiver) => result,
        () = shutdown_signal() => {
            tracing::info!("shutdown signal received");
            Ok(())
        }
    };

    if let Err(err) = bridge.announce_offline().await {
        tracing::warn!(%err, "failed to announce offline status");
    }
    if let Err(err) = bus.disconnect().await {
        tracing::warn!(%err, "failed to disconnect from broker");
    }

    result.context("bridge stopped")
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(%err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(%err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}

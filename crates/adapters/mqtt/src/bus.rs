//! rumqttc-backed [`MessageBus`].

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use rumqttc::{AsyncClient, Event, EventLoop, LastWill, MqttOptions, Packet, Publish, QoS};
use tokio::task::JoinHandle;

use hubbridge_app::event_bus::EventSender;
use hubbridge_app::ports::MessageBus;
use hubbridge_domain::error::BridgeError;
use hubbridge_domain::event::{InboundMessage, OutboundMessage};
use hubbridge_domain::topic::{STATUS_OFFLINE, STATUS_ONLINE};

use crate::config::MqttConfig;
use crate::error::MqttError;

/// Requests buffered between the client handle and the event loop.
const REQUEST_CAPACITY: usize = 64;

/// Pause before polling again after a connection error.
const RECONNECT_DELAY: Duration = Duration::from_secs(2);

/// Message bus backed by an MQTT broker.
///
/// A background task drives the rumqttc event loop and forwards every
/// incoming publish to the bridge as an [`InboundMessage`].
pub struct MqttBus {
    client: AsyncClient,
    filters: Arc<Mutex<Vec<String>>>,
    task: JoinHandle<()>,
}

impl MqttBus {
    /// Start the broker connection.
    ///
    /// `status_topic` receives a retained `offline` last will; it is also
    /// where `online` is re-announced after a reconnect.
    #[must_use]
    pub fn connect(config: &MqttConfig, status_topic: &str, events: EventSender) -> Self {
        let options = build_options(config, status_topic);
        let (client, eventloop) = AsyncClient::new(options, REQUEST_CAPACITY);
        let filters = Arc::new(Mutex::new(Vec::new()));

        let session = Session {
            client: client.clone(),
            filters: Arc::clone(&filters),
            status_topic: status_topic.to_string(),
        };
        let task = tokio::spawn(poll_loop(eventloop, session, events));

        tracing::info!(
            host = %config.broker_host,
            port = config.broker_port,
            client_id = %config.client_id,
            "connecting to MQTT broker"
        );

        Self {
            client,
            filters,
            task,
        }
    }

    /// Disconnect cleanly. The broker does not fire the last will, so the
    /// caller should publish `offline` first.
    ///
    /// # Errors
    ///
    /// Returns [`MqttError::Client`] when the event loop is already gone.
    pub async fn disconnect(&self) -> Result<(), MqttError> {
        self.client.disconnect().await.map_err(MqttError::Client)?;
        tracing::info!("disconnected from MQTT broker");
        Ok(())
    }

    fn ensure_running(&self) -> Result<(), MqttError> {
        if self.task.is_finished() {
            return Err(MqttError::NotConnected);
        }
        Ok(())
    }
}

impl Drop for MqttBus {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl MessageBus for MqttBus {
    async fn publish(&self, message: OutboundMessage) -> Result<(), BridgeError> {
        self.ensure_running()?;
        tracing::debug!(topic = %message.topic, retain = message.retain, "publishing");
        self.client
            .publish(
                message.topic,
                QoS::AtLeastOnce,
                message.retain,
                message.payload.into_bytes(),
            )
            .await
            .map_err(MqttError::Client)?;
        Ok(())
    }

    async fn subscribe(&self, filter: &str) -> Result<(), BridgeError> {
        self.ensure_running()?;
        {
            let mut filters = self.filters.lock().unwrap_or_else(PoisonError::into_inner);
            if !filters.iter().any(|f| f == filter) {
                filters.push(filter.to_string());
            }
        }
        tracing::debug!(%filter, "subscribing");
        self.client
            .subscribe(filter, QoS::AtLeastOnce)
            .await
            .map_err(MqttError::Client)?;
        Ok(())
    }
}

fn build_options(config: &MqttConfig, status_topic: &str) -> MqttOptions {
    let mut options = MqttOptions::new(&config.client_id, &config.broker_host, config.broker_port);
    options.set_keep_alive(Duration::from_secs(u64::from(config.keep_alive_secs)));
    if let Some(username) = &config.username {
        options.set_credentials(username, config.password.clone().unwrap_or_default());
    }
    options.set_last_will(LastWill::new(
        status_topic,
        STATUS_OFFLINE,
        QoS::AtLeastOnce,
        true,
    ));
    options
}

fn inbound(publish: &Publish) -> InboundMessage {
    InboundMessage::new(
        publish.topic.clone(),
        String::from_utf8_lossy(&publish.payload),
    )
}

/// What must be restored after the broker drops the session.
struct Session {
    client: AsyncClient,
    filters: Arc<Mutex<Vec<String>>>,
    status_topic: String,
}

impl Session {
    /// Re-subscribe and re-announce `online` once the bridge has started.
    ///
    /// Runs inside the event loop task, so requests are only queued, never
    /// awaited.
    fn restore(&self) {
        let filters = self
            .filters
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if filters.is_empty() {
            return;
        }

        for filter in &filters {
            if let Err(err) = self.client.try_subscribe(filter, QoS::AtLeastOnce) {
                tracing::warn!(%err, %filter, "failed to restore subscription");
            }
        }
        if let Err(err) =
            self.client
                .try_publish(&self.status_topic, QoS::AtLeastOnce, true, STATUS_ONLINE)
        {
            tracing::warn!(%err, "failed to restore online status");
        }
        tracing::info!(filters = filters.len(), "MQTT session restored");
    }
}

async fn poll_loop(mut eventloop: EventLoop, session: Session, events: EventSender) {
    loop {
        match eventloop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(_))) => {
                tracing::info!("connected to MQTT broker");
                session.restore();
            }
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                tracing::debug!(topic = %publish.topic, "message received");
                if !events.send(inbound(&publish)).await {
                    break;
                }
            }
            Ok(_) => {}
            Err(err) => {
                tracing::warn!(%err, "MQTT connection error, retrying");
                tokio::time::sleep(RECONNECT_DELAY).await;
            }
        }
    }
    tracing::debug!("MQTT event loop stopped");
}

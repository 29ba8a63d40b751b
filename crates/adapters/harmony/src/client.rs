//! Harmony hub client — one WebSocket session shared by every request.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use futures_util::{SinkExt as _, StreamExt as _};
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use hubbridge_app::event_bus::EventSender;
use hubbridge_app::ports::HubClient;
use hubbridge_domain::error::BridgeError;
use hubbridge_domain::event::HubEvent;
use hubbridge_domain::hub::{ButtonCommand, HubConfig};
use hubbridge_domain::id::ActivityId;

use crate::config::HarmonyConfig;
use crate::error::HarmonyError;
use crate::protocol::{self, Incoming, KeyState, NotificationTracker, Response};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;
type Pending = Arc<Mutex<HashMap<String, oneshot::Sender<Response>>>>;

/// Frames queued for the socket task.
const OUTGOING_CAPACITY: usize = 32;

/// How long a button stays pressed before the release frame is sent.
const KEY_HOLD: Duration = Duration::from_millis(100);

/// Client for one Harmony hub.
///
/// A background task owns the socket: it writes queued frames, pings the
/// hub, hands responses to the waiting request and turns notifications into
/// [`HubEvent`]s. When the socket drops, outstanding requests fail with
/// [`HarmonyError::Closed`] and [`HubEvent::ConnectionLost`] is emitted.
///
/// Events reach the bridge through a second task, so a full bridge channel
/// never stops the socket from reading the answer the bridge is waiting for.
pub struct HarmonyClient {
    hub_id: String,
    timeout: Duration,
    next_id: AtomicU64,
    pending: Pending,
    outgoing: mpsc::Sender<Message>,
    task: JoinHandle<()>,
    forwarder: JoinHandle<()>,
}

impl HarmonyClient {
    /// Provision the hub id over HTTP and open the WebSocket session.
    ///
    /// # Errors
    ///
    /// Returns [`HarmonyError::Provision`] or [`HarmonyError::Connect`] when
    /// the hub cannot be reached.
    #[tracing::instrument(skip(config, events), fields(host = %config.host, port = config.port))]
    pub async fn connect(config: &HarmonyConfig, events: EventSender) -> Result<Self, HarmonyError> {
        let hub_id = provision(config).await?;
        tracing::debug!(%hub_id, "hub provisioned");

        let (socket, _response) = tokio_tungstenite::connect_async(config.socket_url(&hub_id))
            .await
            .map_err(HarmonyError::Connect)?;
        tracing::info!(%hub_id, "hub socket connected");

        Ok(Self::start(
            socket,
            hub_id,
            config.request_timeout(),
            config.ping_interval(),
            events,
        ))
    }

    fn start(
        socket: Socket,
        hub_id: String,
        timeout: Duration,
        ping_interval: Duration,
        events: EventSender,
    ) -> Self {
        let pending: Pending = Arc::default();
        let (outgoing, queue) = mpsc::channel(OUTGOING_CAPACITY);
        let (notify, notifications) = mpsc::unbounded_channel();
        let forwarder = tokio::spawn(forward_events(notifications, events));
        let task = tokio::spawn(run_socket(
            socket,
            queue,
            Arc::clone(&pending),
            notify,
            ping_interval,
        ));

        Self {
            hub_id,
            timeout,
            next_id: AtomicU64::new(1),
            pending,
            outgoing,
            task,
            forwarder,
        }
    }

    #[must_use]
    pub fn hub_id(&self) -> &str {
        &self.hub_id
    }

    fn frame(&self, cmd: &str, params: Value) -> Result<(String, Message), HarmonyError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let text = protocol::request_frame(&self.hub_id, id, cmd, params, self.timeout.as_secs())?;
        Ok((id.to_string(), Message::Text(text.into())))
    }

    /// Send `cmd` and wait for its final answer.
    async fn request(&self, cmd: &'static str, params: Value) -> Result<Value, HarmonyError> {
        let (id, message) = self.frame(cmd, params)?;
        let (tx, rx) = oneshot::channel();
        self.lock_pending().insert(id.clone(), tx);

        tracing::trace!(%id, cmd, "sending request");
        if self.outgoing.send(message).await.is_err() {
            self.lock_pending().remove(&id);
            return Err(HarmonyError::Closed);
        }

        match tokio::time::timeout(self.timeout, rx).await {
            Ok(Ok(response)) => response.into_data(cmd),
            Ok(Err(_)) => Err(HarmonyError::Closed),
            Err(_) => {
                self.lock_pending().remove(&id);
                Err(HarmonyError::Timeout { cmd })
            }
        }
    }

    /// Send `cmd` without waiting for an answer.
    async fn post(&self, cmd: &'static str, params: Value) -> Result<(), HarmonyError> {
        let (_, message) = self.frame(cmd, params)?;
        self.outgoing
            .send(message)
            .await
            .map_err(|_| HarmonyError::Closed)
    }

    fn lock_pending(&self) -> std::sync::MutexGuard<'_, HashMap<String, oneshot::Sender<Response>>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn run_activity(&self, activity_id: &ActivityId) -> Result<(), HarmonyError> {
        self.request(
            protocol::RUN_ACTIVITY,
            protocol::run_activity_params(activity_id),
        )
        .await?;
        Ok(())
    }

    async fn read_current_activity(&self) -> Result<ActivityId, HarmonyError> {
        let data = self
            .request(protocol::GET_CURRENT_ACTIVITY, json!({}))
            .await?;
        Ok(protocol::decode_current_activity(&data)?)
    }
}

impl Drop for HarmonyClient {
    fn drop(&mut self) {
        self.task.abort();
        self.forwarder.abort();
    }
}

impl HubClient for HarmonyClient {
    #[tracing::instrument(skip(self))]
    async fn fetch_config(&self) -> Result<HubConfig, BridgeError> {
        let data = self.request(protocol::GET_CONFIG, json!({})).await?;
        let config = protocol::decode_config(data).map_err(HarmonyError::from)?;
        tracing::debug!(
            devices = config.devices.len(),
            activities = config.activities.len(),
            functions = config.function_count(),
            "hub configuration fetched"
        );
        Ok(config)
    }

    async fn current_activity(&self) -> Result<ActivityId, BridgeError> {
        Ok(self.read_current_activity().await?)
    }

    #[tracing::instrument(skip(self))]
    async fn start_activity(&self, activity_id: &ActivityId) -> Result<(), BridgeError> {
        Ok(self.run_activity(activity_id).await?)
    }

    #[tracing::instrument(skip(self))]
    async fn power_off(&self) -> Result<(), BridgeError> {
        if self.read_current_activity().await?.is_power_off() {
            return Err(BridgeError::NoRunningActivity);
        }
        Ok(self.run_activity(&ActivityId::power_off()).await?)
    }

    #[tracing::instrument(skip(self, command))]
    async fn press_button(&self, command: &ButtonCommand) -> Result<(), BridgeError> {
        self.post(
            protocol::HOLD_ACTION,
            protocol::hold_action_params(command, KeyState::Press),
        )
        .await?;
        tokio::time::sleep(KEY_HOLD).await;
        self.post(
            protocol::HOLD_ACTION,
            protocol::hold_action_params(command, KeyState::Release),
        )
        .await?;
        Ok(())
    }
}

/// Ask the hub for its id over the HTTP API.
async fn provision(config: &HarmonyConfig) -> Result<String, HarmonyError> {
    let body: Value = reqwest::Client::new()
        .post(config.http_url())
        .header(reqwest::header::ORIGIN, protocol::PROVISION_ORIGIN)
        .header(reqwest::header::ACCEPT, "utf-8")
        .json(&protocol::provision_body())
        .timeout(config.request_timeout())
        .send()
        .await
        .and_then(reqwest::Response::error_for_status)
        .map_err(HarmonyError::Provision)?
        .json()
        .await
        .map_err(HarmonyError::Provision)?;
    Ok(protocol::decode_hub_id(&body)?)
}

/// Relay hub events to the bridge, waiting on its channel as long as needed.
async fn forward_events(
    mut notifications: mpsc::UnboundedReceiver<HubEvent>,
    events: EventSender,
) {
    while let Some(event) = notifications.recv().await {
        if !events.send(event).await {
            tracing::debug!("bridge channel closed, dropping hub events");
            break;
        }
    }
}

async fn run_socket(
    socket: Socket,
    mut queue: mpsc::Receiver<Message>,
    pending: Pending,
    notify: mpsc::UnboundedSender<HubEvent>,
    ping_interval: Duration,
) {
    let (mut write, mut read) = socket.split();
    let mut ping = tokio::time::interval_at(tokio::time::Instant::now() + ping_interval, ping_interval);
    let mut tracker = NotificationTracker::default();

    loop {
        tokio::select! {
            frame = queue.recv() => {
                let Some(frame) = frame else {
                    // client dropped, shut down quietly
                    let _ = write.close().await;
                    return;
                };
                if let Err(err) = write.send(frame).await {
                    tracing::warn!(%err, "failed to write to hub socket");
                    break;
                }
            }
            _ = ping.tick() => {
                if let Err(err) = write.send(Message::Ping(Vec::new().into())).await {
                    tracing::warn!(%err, "failed to ping hub");
                    break;
                }
            }
            incoming = read.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    dispatch(text.as_str(), &pending, &mut tracker, &notify);
                }
                Some(Ok(Message::Close(_))) | None => {
                    tracing::warn!("hub closed the socket");
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(err)) => {
                    tracing::warn!(%err, "hub socket error");
                    break;
                }
            },
        }
    }

    // refuse new frames first, then fail every outstanding request
    queue.close();
    pending.lock().unwrap_or_else(PoisonError::into_inner).clear();
    let _ = notify.send(HubEvent::ConnectionLost);
}

fn dispatch(
    text: &str,
    pending: &Pending,
    tracker: &mut NotificationTracker,
    notify: &mpsc::UnboundedSender<HubEvent>,
) {
    match protocol::parse_frame(text) {
        Ok(Incoming::Response(response)) => {
            if response.is_progress() {
                tracing::trace!(id = %response.id, "request in progress");
                return;
            }
            let waiter = pending
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&response.id);
            match waiter {
                Some(waiter) => {
                    let _ = waiter.send(response);
                }
                None => tracing::debug!(id = %response.id, "response to unknown request"),
            }
        }
        Ok(Incoming::Notification { kind, data }) => {
            for event in tracker.interpret(&kind, &data) {
                tracing::debug!(?event, "hub notification");
                let _ = notify.send(event);
            }
        }
        Ok(Incoming::Other) => {}
        Err(err) => tracing::warn!(%err, "ignoring malformed hub frame"),
    }
}

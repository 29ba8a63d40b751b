//! # hubbridge-adapter-mqtt
//!
//! MQTT adapter — the message-bus side of the bridge.
//!
//! ## Responsibilities
//! - Connect to an MQTT broker with a retained `offline` last will
//! - Implement the [`MessageBus`](hubbridge_app::ports::MessageBus) port
//!   (publish at-least-once, subscribe to command filters)
//! - Forward every incoming publish into the bridge's event channel
//! - Restore subscriptions and the `online` status after a reconnect
//!
//! ## Dependency rule
//! Same as other adapters: depends on `hubbridge-app` and `hubbridge-domain`.

mod bus;
pub mod config;
pub mod error;

pub use bus::MqttBus;
pub use config::MqttConfig;
pub use error::MqttError;

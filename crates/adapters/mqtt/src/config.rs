//! MQTT broker configuration.

use serde::Deserialize;

/// Configuration for the broker connection.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MqttConfig {
    /// MQTT broker hostname or IP address.
    pub broker_host: String,
    /// MQTT broker port.
    pub broker_port: u16,
    /// MQTT client identifier.
    pub client_id: String,
    /// Service prefix every bridged hub's topics live under.
    pub base_topic: String,
    /// Keep-alive interval in seconds.
    pub keep_alive_secs: u16,
    /// Broker username, if the broker requires authentication.
    pub username: Option<String>,
    /// Broker password, only used together with `username`.
    pub password: Option<String>,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            broker_host: "localhost".to_string(),
            broker_port: 1883,
            client_id: "hubbridge".to_string(),
            base_topic: "harmony".to_string(),
            keep_alive_secs: 30,
            username: None,
            password: None,
        }
    }
}

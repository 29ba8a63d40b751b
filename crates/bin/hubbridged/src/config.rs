//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `hubbridge.toml` in the working directory, or the file named by
//! `HUBBRIDGE_CONFIG`. Every field has a default so the file is optional.
//! Environment variables take precedence over file values.

use serde::Deserialize;

use hubbridge_adapter_harmony::HarmonyConfig;
use hubbridge_adapter_mqtt::MqttConfig;

const DEFAULT_PATH: &str = "hubbridge.toml";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Broker connection and topic prefix.
    pub mqtt: MqttConfig,
    /// Which hub to bridge and how to reach it.
    pub hub: HubSection,
    /// Bridge loop settings.
    pub bridge: BridgeSection,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Hub implementation to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HubBackend {
    /// A Logitech Harmony hub on the local network.
    Harmony,
    /// The built-in simulated hub.
    Virtual,
}

impl std::str::FromStr for HubBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "harmony" => Ok(Self::Harmony),
            "virtual" => Ok(Self::Virtual),
            other => Err(ConfigError::Validation(format!(
                "unknown hub backend `{other}`"
            ))),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HubSection {
    pub backend: HubBackend,
    /// Display name; its slug becomes the second topic segment.
    pub name: String,
    /// Hub address, required by the `harmony` backend.
    pub host: String,
    pub port: u16,
    pub request_timeout_secs: u64,
    pub ping_interval_secs: u64,
}

/// Bridge loop configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BridgeSection {
    /// Pending events buffered between the adapters and the bridge loop.
    pub event_capacity: usize,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from the config file (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("HUBBRIDGE_CONFIG").unwrap_or_else(|_| DEFAULT_PATH.to_string());
        let mut config = Self::from_file(&path)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(val) = lookup("HUBBRIDGE_MQTT_HOST") {
            self.mqtt.broker_host = val;
        }
        if let Some(val) = lookup("HUBBRIDGE_MQTT_PORT") {
            self.mqtt.broker_port = val.parse().map_err(|_| {
                ConfigError::Validation(format!("invalid HUBBRIDGE_MQTT_PORT `{val}`"))
            })?;
        }
        if let Some(val) = lookup("HUBBRIDGE_MQTT_USERNAME") {
            self.mqtt.username = Some(val);
        }
        if let Some(val) = lookup("HUBBRIDGE_MQTT_PASSWORD") {
            self.mqtt.password = Some(val);
        }
        if let Some(val) = lookup("HUBBRIDGE_HUB_BACKEND") {
            self.hub.backend = val.parse()?;
        }
        if let Some(val) = lookup("HUBBRIDGE_HUB_NAME") {
            self.hub.name = val;
        }
        if let Some(val) = lookup("HUBBRIDGE_HUB_HOST") {
            self.hub.host = val;
        }
        if let Some(val) = lookup("HUBBRIDGE_HUB_PORT") {
            self.hub.port = val.parse().map_err(|_| {
                ConfigError::Validation(format!("invalid HUBBRIDGE_HUB_PORT `{val}`"))
            })?;
        }
        if let Some(val) = lookup("HUBBRIDGE_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = lookup("RUST_LOG") {
            self.logging.filter = val;
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.mqtt.broker_port == 0 {
            return Err(ConfigError::Validation(
                "mqtt.broker_port must be non-zero".to_string(),
            ));
        }
        if self.hub.port == 0 {
            return Err(ConfigError::Validation(
                "hub.port must be non-zero".to_string(),
            ));
        }
        if self.hub.request_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "hub.request_timeout_secs must be non-zero".to_string(),
            ));
        }
        if self.hub.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "hub.name must not be empty".to_string(),
            ));
        }
        if self.hub.backend == HubBackend::Harmony && self.hub.host.trim().is_empty() {
            return Err(ConfigError::Validation(
                "hub.host is required by the harmony backend".to_string(),
            ));
        }
        if self.bridge.event_capacity == 0 {
            return Err(ConfigError::Validation(
                "bridge.event_capacity must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl HubSection {
    /// Connection settings for the Harmony adapter.
    #[must_use]
    pub fn harmony(&self) -> HarmonyConfig {
        HarmonyConfig {
            host: self.host.clone(),
            port: self.port,
            request_timeout_secs: self.request_timeout_secs,
            ping_interval_secs: self.ping_interval_secs,
        }
    }
}

impl Default for HubSection {
    fn default() -> Self {
        let harmony = HarmonyConfig::default();
        Self {
            backend: HubBackend::Harmony,
            name: "Harmony Hub".to_string(),
            host: harmony.host,
            port: harmony.port,
            request_timeout_secs: harmony.request_timeout_secs,
            ping_interval_secs: harmony.ping_interval_secs,
        }
    }
}

impl Default for BridgeSection {
    fn default() -> Self {
        Self { event_capacity: 64 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "hubbridged=info,hubbridge=info".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn overrides(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn valid() -> Config {
        let mut config = Config::default();
        config.hub.host = "192.168.1.20".to_string();
        config
    }

    #[test]
    fn should_produce_sensible_defaults() {
        let config = Config::default();
        assert_eq!(config.mqtt.broker_host, "localhost");
        assert_eq!(config.mqtt.base_topic, "harmony");
        assert_eq!(config.hub.backend, HubBackend::Harmony);
        assert_eq!(config.hub.port, 8088);
        assert_eq!(config.hub.request_timeout_secs, 10);
        assert_eq!(config.bridge.event_capacity, 64);
        assert_eq!(config.logging.filter, "hubbridged=info,hubbridge=info");
    }

    #[test]
    fn should_parse_minimal_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.mqtt.broker_port, 1883);
        assert_eq!(config.hub.name, "Harmony Hub");
    }

    #[test]
    fn should_parse_full_toml() {
        let toml = "
            [mqtt]
            broker_host = 'mqtt.lan'
            broker_port = 1884
            client_id = 'den-bridge'
            base_topic = 'home/harmony'
            keep_alive_secs = 45
            username = 'bridge'
            password = 'secret'

            [hub]
            backend = 'virtual'
            name = 'Den'
            host = 'hub.lan'
            port = 8089
            request_timeout_secs = 3

            [bridge]
            event_capacity = 16

            [logging]
            filter = 'debug'
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.mqtt.broker_host, "mqtt.lan");
        assert_eq!(config.mqtt.broker_port, 1884);
        assert_eq!(config.mqtt.base_topic, "home/harmony");
        assert_eq!(config.mqtt.username.as_deref(), Some("bridge"));
        assert_eq!(config.hub.backend, HubBackend::Virtual);
        assert_eq!(config.hub.name, "Den");
        assert_eq!(config.hub.port, 8089);
        assert_eq!(config.hub.request_timeout_secs, 3);
        assert_eq!(config.hub.ping_interval_secs, 50);
        assert_eq!(config.bridge.event_capacity, 16);
        assert_eq!(config.logging.filter, "debug");
    }

    #[test]
    fn should_reject_unknown_backend_in_toml() {
        let result: Result<Config, _> = toml::from_str("[hub]\nbackend = 'ir-blaster'");
        assert!(result.is_err());
    }

    #[test]
    fn should_return_default_when_file_not_found() {
        let config = Config::from_file("nonexistent.toml").unwrap();
        assert_eq!(config.mqtt.broker_port, 1883);
    }

    #[test]
    fn should_report_parse_error_for_invalid_toml() {
        let result: Result<Config, _> = toml::from_str("invalid {{{");
        assert!(result.is_err());
    }

    #[test]
    fn should_apply_env_overrides() {
        let mut config = Config::default();
        config
            .apply_overrides(overrides(&[
                ("HUBBRIDGE_MQTT_HOST", "broker"),
                ("HUBBRIDGE_MQTT_PORT", "2883"),
                ("HUBBRIDGE_MQTT_USERNAME", "user"),
                ("HUBBRIDGE_MQTT_PASSWORD", "pass"),
                ("HUBBRIDGE_HUB_BACKEND", "Virtual"),
                ("HUBBRIDGE_HUB_NAME", "Bedroom"),
                ("HUBBRIDGE_HUB_HOST", "10.0.0.5"),
                ("HUBBRIDGE_HUB_PORT", "8089"),
            ]))
            .unwrap();
        assert_eq!(config.mqtt.broker_host, "broker");
        assert_eq!(config.mqtt.broker_port, 2883);
        assert_eq!(config.mqtt.username.as_deref(), Some("user"));
        assert_eq!(config.mqtt.password.as_deref(), Some("pass"));
        assert_eq!(config.hub.backend, HubBackend::Virtual);
        assert_eq!(config.hub.name, "Bedroom");
        assert_eq!(config.hub.host, "10.0.0.5");
        assert_eq!(config.hub.port, 8089);
    }

    #[test]
    fn should_prefer_rust_log_over_hubbridge_log() {
        let mut config = Config::default();
        config
            .apply_overrides(overrides(&[
                ("HUBBRIDGE_LOG", "warn"),
                ("RUST_LOG", "trace"),
            ]))
            .unwrap();
        assert_eq!(config.logging.filter, "trace");
    }

    #[test]
    fn should_reject_invalid_port_override() {
        let mut config = Config::default();
        let result = config.apply_overrides(overrides(&[("HUBBRIDGE_MQTT_PORT", "abc")]));
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn should_reject_unknown_backend_override() {
        let mut config = Config::default();
        let result = config.apply_overrides(overrides(&[("HUBBRIDGE_HUB_BACKEND", "zigbee")]));
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn should_accept_valid_config() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn should_require_host_for_harmony_backend() {
        assert!(Config::default().validate().is_err());
    }

    #[test]
    fn should_not_require_host_for_virtual_backend() {
        let mut config = Config::default();
        config.hub.backend = HubBackend::Virtual;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn should_reject_zero_ports() {
        let mut config = valid();
        config.mqtt.broker_port = 0;
        assert!(config.validate().is_err());

        let mut config = valid();
        config.hub.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_zero_request_timeout() {
        let mut config = valid();
        config.hub.request_timeout_secs = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn should_reject_invalid_hub_port_override() {
        let mut config = Config::default();
        let result = config.apply_overrides(overrides(&[("HUBBRIDGE_HUB_PORT", "70000")]));
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn should_reject_blank_hub_name() {
        let mut config = valid();
        config.hub.name = "   ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_zero_event_capacity() {
        let mut config = valid();
        config.bridge.event_capacity = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_map_hub_section_to_harmony_config() {
        let harmony = valid().hub.harmony();
        assert_eq!(harmony.host, "192.168.1.20");
        assert_eq!(harmony.port, 8088);
        assert_eq!(harmony.request_timeout_secs, 10);
    }
}

//! Harmony hub connection settings.

use std::time::Duration;

use serde::Deserialize;

/// Where the hub lives and how long to wait for it.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HarmonyConfig {
    /// Hub hostname or IP address.
    pub host: String,
    /// Port of the hub's local HTTP/WebSocket API.
    pub port: u16,
    /// Upper bound for a single request/response round trip, in seconds.
    pub request_timeout_secs: u64,
    /// Interval between WebSocket pings, in seconds.
    pub ping_interval_secs: u64,
}

impl Default for HarmonyConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 8088,
            request_timeout_secs: 10,
            ping_interval_secs: 50,
        }
    }
}

impl HarmonyConfig {
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    #[must_use]
    pub fn ping_interval(&self) -> Duration {
        Duration::from_secs(self.ping_interval_secs.max(1))
    }

    /// Base URL of the HTTP provisioning endpoint.
    #[must_use]
    pub fn http_url(&self) -> String {
        format!("http://{}:{}/", self.host, self.port)
    }

    /// WebSocket URL for the hub identified by `hub_id`.
    #[must_use]
    pub fn socket_url(&self, hub_id: &str) -> String {
        format!(
            "ws://{}:{}/?domain=svcs.myharmony.com&hubId={hub_id}",
            self.host, self.port
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_have_sensible_defaults() {
        let config = HarmonyConfig::default();
        assert_eq!(config.port, 8088);
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.ping_interval(), Duration::from_secs(50));
    }

    #[test]
    fn should_deserialize_from_toml() {
        let toml = r#"
            host = "192.168.1.20"
            request_timeout_secs = 5
        "#;
        let config: HarmonyConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.host, "192.168.1.20");
        assert_eq!(config.port, 8088);
        assert_eq!(config.request_timeout_secs, 5);
    }

    #[test]
    fn should_build_urls() {
        let config = HarmonyConfig {
            host: "hub.lan".to_string(),
            ..HarmonyConfig::default()
        };
        assert_eq!(config.http_url(), "http://hub.lan:8088/");
        assert_eq!(
            config.socket_url("12345"),
            "ws://hub.lan:8088/?domain=svcs.myharmony.com&hubId=12345"
        );
    }

    #[test]
    fn should_never_ping_more_than_once_a_second() {
        let config = HarmonyConfig {
            ping_interval_secs: 0,
            ..HarmonyConfig::default()
        };
        assert_eq!(config.ping_interval(), Duration::from_secs(1));
    }
}

//! # hubbridge-adapter-harmony
//!
//! Harmony hub adapter — talks to a Logitech Harmony hub over its local
//! WebSocket API.
//!
//! ## Responsibilities
//! - Discover the hub id over HTTP (provisioning request)
//! - Keep one WebSocket session open, correlate requests and responses
//! - Implement the [`HubClient`](hubbridge_app::ports::HubClient) port
//! - Translate hub notifications into
//!   [`HubEvent`](hubbridge_domain::event::HubEvent)s on the bridge's
//!   event channel, and report a dropped socket as `ConnectionLost`
//!
//! ## Dependency rule
//! Same as other adapters: depends on `hubbridge-app` and `hubbridge-domain`.

mod client;
pub mod config;
pub mod error;
pub mod protocol;

pub use client::HarmonyClient;
pub use config::HarmonyConfig;
pub use error::HarmonyError;

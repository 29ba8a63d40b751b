//! # hubbridge-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement:
//!   - `HubClient` — talk to the remote hub (config, activities, buttons)
//!   - `MessageBus` — publish to and subscribe on the message bus
//! - Provide the use-cases:
//!   - `SyncService` — fetch the hub config and rebuild the routing snapshot
//!   - `CommandRouter` — turn inbound bus messages into hub commands
//!   - `StatePublisher` — mirror activity changes onto the bus
//!   - `Bridge` — the event loop tying them together
//! - Provide **in-process infrastructure** (event channel, routing state)
//!
//! ## Dependency rule
//! Depends on `hubbridge-domain` only (plus `tokio::sync` for channels).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod bridge;
pub mod event_bus;
pub mod ports;
pub mod routing_state;
pub mod services;

#[cfg(test)]
mod fakes;

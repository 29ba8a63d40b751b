//! Application services — use-case implementations.
//!
//! Each service struct accepts port trait implementations via generic parameters
//! (constructor injection), keeping this layer decoupled from concrete adapters.

pub mod command_router;
pub mod state_publisher;
pub mod sync_service;

pub use command_router::{CommandRouter, RouteOutcome};
pub use state_publisher::{PublishOutcome, StatePublisher};
pub use sync_service::{SyncReport, SyncService};

//! Common error types used across the workspace.
//!
//! Adapters define their own typed errors and convert into [`BridgeError`]
//! at the port boundary. Routing misses (unknown topic, unknown activity) are
//! not errors: they are reported as outcomes by the services.

/// Boxed source error carried across port boundaries.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors surfaced by hub and bus ports.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// The hub could not be reached (transport failure, timeout, handshake).
    #[error("hub unavailable")]
    HubUnavailable(#[source] BoxError),

    /// The hub answered with something that cannot be decoded, or rejected
    /// the request.
    #[error("hub protocol error")]
    HubProtocol(#[source] BoxError),

    /// A power-off was requested while no activity was running.
    #[error("no activity is running")]
    NoRunningActivity,

    /// The hub connection dropped. Fatal for the bridge.
    #[error("hub connection lost")]
    ConnectionLost,

    /// The message-bus client failed.
    #[error("message bus error")]
    Bus(#[source] BoxError),
}

impl BridgeError {
    /// Whether this error must terminate the bridge.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::ConnectionLost)
    }
}

/// Details about a hub payload that could not be decoded into domain types.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// A required field is absent.
    #[error("missing field `{0}`")]
    MissingField(&'static str),

    /// A field is present but has the wrong shape.
    #[error("invalid field `{field}`: {reason}")]
    InvalidField {
        /// Field name.
        field: &'static str,
        /// Human-readable reason.
        reason: String,
    },
}

impl From<DecodeError> for BridgeError {
    fn from(err: DecodeError) -> Self {
        Self::HubProtocol(Box::new(err))
    }
}

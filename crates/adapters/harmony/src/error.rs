//! Harmony adapter error types.

use hubbridge_domain::error::{BridgeError, DecodeError};

/// Errors specific to the Harmony adapter.
#[derive(Debug, thiserror::Error)]
pub enum HarmonyError {
    /// The HTTP provisioning request failed.
    #[error("hub provisioning request failed")]
    Provision(#[source] reqwest::Error),

    /// The WebSocket handshake failed.
    #[error("failed to open hub socket")]
    Connect(#[source] tokio_tungstenite::tungstenite::Error),

    /// The hub did not answer `cmd` in time.
    #[error("hub did not answer `{cmd}` in time")]
    Timeout { cmd: &'static str },

    /// The socket task has stopped.
    #[error("hub socket closed")]
    Closed,

    /// The hub answered `cmd` with a non-success code.
    #[error("hub rejected `{cmd}` with code {code}: {message}")]
    Rejected {
        cmd: &'static str,
        code: u16,
        message: String,
    },

    /// The hub sent something that is not valid JSON.
    #[error("malformed hub frame")]
    Json(#[source] serde_json::Error),

    /// A hub payload could not be mapped onto domain types.
    #[error("undecodable hub payload")]
    Decode(#[source] DecodeError),
}

impl HarmonyError {
    /// Convert into the matching [`BridgeError`] for propagation across
    /// port boundaries.
    #[must_use]
    pub fn into_domain(self) -> BridgeError {
        match self {
            Self::Closed => BridgeError::ConnectionLost,
            Self::Provision(_) | Self::Connect(_) | Self::Timeout { .. } => {
                BridgeError::HubUnavailable(Box::new(self))
            }
            Self::Rejected { .. } | Self::Json(_) | Self::Decode(_) => {
                BridgeError::HubProtocol(Box::new(self))
            }
        }
    }
}

impl From<HarmonyError> for BridgeError {
    fn from(err: HarmonyError) -> Self {
        err.into_domain()
    }
}

impl From<DecodeError> for HarmonyError {
    fn from(err: DecodeError) -> Self {
        Self::Decode(err)
    }
}

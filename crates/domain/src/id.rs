//! Hub-assigned identifier newtypes.
//!
//! The hub hands out opaque string identifiers (usually numeric). They are
//! only ever compared and echoed back, never interpreted.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[doc = $doc:expr])* $name:ident) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap a raw hub identifier.
            #[must_use]
            pub fn new(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }

            /// Access the raw identifier.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = std::convert::Infallible;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self::new(s))
            }
        }

        impl From<&str> for $name {
            fn from(raw: &str) -> Self {
                Self::new(raw)
            }
        }
    };
}

define_id!(
    /// Identifier of an [`Activity`](crate::hub::Activity).
    ActivityId
);

define_id!(
    /// Identifier of a [`Device`](crate::hub::Device).
    DeviceId
);

impl ActivityId {
    /// Raw id the hub reserves for its "PowerOff" pseudo-activity.
    pub const POWER_OFF: &'static str = "-1";

    /// The "PowerOff" pseudo-activity id.
    #[must_use]
    pub fn power_off() -> Self {
        Self::new(Self::POWER_OFF)
    }

    /// Whether this id denotes the "PowerOff" pseudo-activity.
    #[must_use]
    pub fn is_power_off(&self) -> bool {
        self.0 == Self::POWER_OFF
    }
}

//! # hubbridge-domain
//!
//! Pure domain model for the hub ↔ message-bus bridge.
//!
//! ## Responsibilities
//! - Foundational types: hub-assigned identifiers, error conventions, timestamps
//! - Describe the **hub graph** (devices → control groups → functions, activities)
//! - Derive **topic names** from hub labels ([`topic`])
//! - Build the **routing table** mapping topics to hub actions ([`routing`])
//! - Index activities by id and label ([`activity`])
//! - Describe the retained **topology document** published for discovery
//! - Define the **events** flowing from adapters into the bridge loop
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod activity;
pub mod event;
pub mod hub;
pub mod routing;
pub mod topic;
pub mod topology;

//! Routing state — the live routing snapshot shared by the services.
//!
//! A snapshot is immutable once built. Re-syncing builds a new one off to
//! the side and swaps the shared reference in a single step, so readers
//! always see either the previous table or the next one, never a mix.

use std::sync::Arc;

use tokio::sync::watch;

use hubbridge_domain::activity::ActivityCatalog;
use hubbridge_domain::routing::RoutingTable;
use hubbridge_domain::time::Timestamp;

/// Everything one sync produced.
#[derive(Debug, Default)]
pub struct RoutingSnapshot {
    /// Increments on every completed sync; `0` before the first one.
    pub generation: u64,
    pub synced_at: Option<Timestamp>,
    pub table: RoutingTable,
    pub catalog: ActivityCatalog,
}

/// Shared handle to the current [`RoutingSnapshot`].
#[derive(Debug, Clone)]
pub struct RoutingState {
    sender: Arc<watch::Sender<Arc<RoutingSnapshot>>>,
}

impl Default for RoutingState {
    fn default() -> Self {
        let (sender, _) = watch::channel(Arc::new(RoutingSnapshot::default()));
        Self {
            sender: Arc::new(sender),
        }
    }
}

impl RoutingState {
    /// Start with the empty generation-0 snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The snapshot in effect right now.
    #[must_use]
    pub fn current(&self) -> Arc<RoutingSnapshot> {
        Arc::clone(&self.sender.borrow())
    }

    /// Watch for snapshot replacements.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Arc<RoutingSnapshot>> {
        self.sender.subscribe()
    }

    /// Replace the live snapshot, returning the previous one.
    pub(crate) fn replace(&self, snapshot: RoutingSnapshot) -> Arc<RoutingSnapshot> {
        self.sender.send_replace(Arc::new(snapshot))
    }
}

// Latest poll result, published by the poller and read by request handlers.
// Readers never lock against the writer: publication is a single pointer swap.

use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::models::Snapshot;

pub struct MetricsCache {
    current: ArcSwap<Snapshot>,
}

impl Default for MetricsCache {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsCache {
    /// Starts with an empty snapshot so readers see emptiness, never absence.
    pub fn new() -> Self {
        Self {
            current: ArcSwap::from_pointee(Snapshot::default()),
        }
    }

    /// Replaces the published snapshot. Readers holding the previous one keep it alive.
    pub fn store(&self, snapshot: Snapshot) {
        self.current.store(Arc::new(snapshot));
    }

    /// Most recently published snapshot.
    pub fn load(&self) -> Arc<Snapshot> {
        self.current.load_full()
    }
}

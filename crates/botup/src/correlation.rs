//! Outstanding-probe tracking.
//!
//! The correlation table is the synchronization point of the prober: probe
//! loops insert entries after a successful send, and the response listener
//! and timeout watchers race to remove them. `resolve` is a single atomic
//! remove-if-present, so exactly one of the two racers wins a given probe
//! and the loser observes absence.

use std::collections::HashMap;

use tokio::sync::RwLock;

/// Maps an in-flight probe's message id to the index of the target that
/// issued it. An entry exists iff the probe was sent and nobody has
/// resolved it yet.
#[derive(Debug, Default)]
pub struct CorrelationTable {
    entries: RwLock<HashMap<u64, usize>>,
}

impl CorrelationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a freshly sent probe.
    pub async fn register(&self, probe_id: u64, target_index: usize) {
        self.entries.write().await.insert(probe_id, target_index);
    }

    /// Cheap shared-read existence check. Callers use this to skip the
    /// write lock for traffic that cannot possibly match; the answer may
    /// be stale by the time they act on it, which is why `resolve` is the
    /// step that decides.
    pub async fn contains(&self, probe_id: u64) -> bool {
        self.entries.read().await.contains_key(&probe_id)
    }

    /// Atomically remove and return the entry for `probe_id`.
    ///
    /// Concurrent callers for the same id see exactly one `Some`; every
    /// other caller gets `None` and must perform no side effects.
    pub async fn resolve(&self, probe_id: u64) -> Option<usize> {
        self.entries.write().await.remove(&probe_id)
    }

    /// Number of probes currently awaiting resolution
    pub async fn outstanding(&self) -> usize {
        self.entries.read().await.len()
    }
}

//! Cache metrics.
//!
//! Lock-free atomic counters updated on the hot path, snapshotted by value
//! for reporting. No counter here is ever locked together with cache state
//! — a metrics read never blocks a cache operation and vice versa.

use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic counters tracked for one [`Group`](crate::group::Group).
#[derive(Debug, Default)]
pub struct GroupMetrics {
    hits: AtomicU64,
    misses: AtomicU64,
    local_loads: AtomicU64,
    peer_hits: AtomicU64,
    peer_failures: AtomicU64,
    coalesced_loads: AtomicU64,
    evictions: AtomicU64,
}

impl GroupMetrics {
    /// Creates a fresh, zeroed counter set.
    pub fn new() -> Self {
        GroupMetrics::default()
    }

    pub(crate) fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_local_load(&self) {
        self.local_loads.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_peer_hit(&self) {
        self.peer_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_peer_failure(&self) {
        self.peer_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Called once per caller that joined an in-flight load instead of
    /// starting its own (i.e. every arrival after the first for a given
    /// single-flight epoch).
    pub(crate) fn record_coalesced_load(&self) {
        self.coalesced_loads.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    /// Takes a point-in-time snapshot of all counters.
    pub fn snapshot(&self) -> GroupMetricsSnapshot {
        GroupMetricsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            local_loads: self.local_loads.load(Ordering::Relaxed),
            peer_hits: self.peer_hits.load(Ordering::Relaxed),
            peer_failures: self.peer_failures.load(Ordering::Relaxed),
            coalesced_loads: self.coalesced_loads.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }
}

/// A consistent-enough (not transactionally atomic across fields) point-in-time
/// read of a [`GroupMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GroupMetricsSnapshot {
    /// Local-cache hits.
    pub hits: u64,
    /// Local-cache misses (whether satisfied by a peer or a local load).
    pub misses: u64,
    /// Number of times the local [`Loader`](crate::loader::Loader) ran.
    pub local_loads: u64,
    /// Number of values returned by a remote peer.
    pub peer_hits: u64,
    /// Number of peer fetches that failed and fell through to local load.
    pub peer_failures: u64,
    /// Number of callers that joined an in-flight load rather than starting one.
    pub coalesced_loads: u64,
    /// Number of entries evicted from the local cache.
    pub evictions: u64,
}

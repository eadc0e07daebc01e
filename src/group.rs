//! A named cache domain: the piece callers actually talk to.
//!
//! A [`Group`] composes a [`SafeCache`] (the local bounded store), an
//! optional [`PeerPicker`] (for routing a miss to the peer that owns it), a
//! [`SingleFlight`] coalescer (so a miss storm on one key produces one load),
//! and a caller-supplied [`Loader`] (the last-resort authoritative source).
//! `Group::get` is the entire public surface; everything else here is
//! plumbing for that one call.

use crate::byte_view::ByteView;
use crate::error::DistCacheError;
use crate::loader::Loader;
use crate::metrics::{GroupMetrics, GroupMetricsSnapshot};
use crate::peer::{response_into_view, PeerPicker, PeerRequest};
use crate::safe_cache::SafeCache;
use crate::single_flight::SingleFlight;
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

/// How far in the future a successfully-loaded value's expiry is set.
///
/// The TTL-jitter window on [`SafeCache`]'s underlying [`Lru`](crate::lru::Lru)
/// is what actually bounds staleness; a per-group TTL would be redundant, so
/// loaded values are populated with an expiry far enough out that it is
/// never the reason an entry leaves the cache.
const FAR_FUTURE_HORIZON: Duration = Duration::from_secs(365 * 24 * 3600);

/// A named, independently-configured cache domain.
///
/// Construct one via [`crate::registry::new_group`] rather than directly;
/// the registry is what gives a `Group` process-wide discoverability by
/// name.
pub struct Group {
    name: String,
    loader: Box<dyn Loader>,
    cache: SafeCache<ByteView>,
    peers: OnceLock<Box<dyn PeerPicker>>,
    flight: SingleFlight<ByteView>,
    metrics: Arc<GroupMetrics>,
}

impl std::fmt::Debug for Group {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Group")
            .field("name", &self.name)
            .field("has_peers", &self.peers.get().is_some())
            .field("metrics", &self.metrics.snapshot())
            .finish_non_exhaustive()
    }
}

impl Group {
    /// Creates a group named `name`, bounding its local cache at `max_bytes`
    /// and falling back to `loader` on a full miss. No peer picker is
    /// configured until [`Group::register_peers`] is called.
    pub fn new(name: impl Into<String>, max_bytes: u64, loader: Box<dyn Loader>) -> Self {
        let name = name.into();
        let metrics = Arc::new(GroupMetrics::new());
        let evicted_metrics = Arc::clone(&metrics);
        let cache = SafeCache::with_eviction_callback(
            max_bytes,
            Some(Box::new(move |_key: &str, _value: &ByteView| {
                evicted_metrics.record_eviction();
            })),
        );
        Group {
            name,
            loader,
            cache,
            peers: OnceLock::new(),
            flight: SingleFlight::new(),
            metrics,
        }
    }

    /// This group's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// A point-in-time snapshot of this group's counters.
    pub fn metrics(&self) -> GroupMetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Registers the router used to find the remote owner of a key on a
    /// local miss.
    ///
    /// # Panics
    ///
    /// Panics if a picker is already registered. Silently replacing one
    /// picker with another would hide a configuration mistake in the
    /// embedding application rather than surface it.
    pub fn register_peers(&self, picker: Box<dyn PeerPicker>) {
        if self.peers.set(picker).is_err() {
            panic!(
                "group {:?}: register_peers called more than once",
                self.name
            );
        }
    }

    /// Fetches `key`, consulting the local cache, then a remote peer (if
    /// one owns the key), then falling back to the loader this group was
    /// built with.
    ///
    /// Concurrent callers for the same key during a miss share a single
    /// evaluation of the load pipeline (see [`SingleFlight`]); all observe
    /// the same result.
    pub fn get(&self, key: &str) -> Result<ByteView, DistCacheError> {
        if key.is_empty() {
            return Err(DistCacheError::InvalidArgument(
                "key must not be empty".to_string(),
            ));
        }

        if let Some(value) = self.cache.get(key) {
            self.metrics.record_hit();
            return Ok(value);
        }
        self.metrics.record_miss();

        let (role, result) = self.flight.do_call(key, || self.load(key));
        if role == crate::single_flight::Role::Follower {
            self.metrics.record_coalesced_load();
        }
        result
    }

    /// The single-flight-guarded body: peer fetch, then local load, on a
    /// confirmed cache miss.
    fn load(&self, key: &str) -> Result<ByteView, DistCacheError> {
        if let Some(picker) = self.peers.get() {
            if let Some((peer, owned)) = picker.pick(key) {
                if owned {
                    let request = PeerRequest {
                        group: self.name.clone(),
                        key: key.to_string(),
                    };
                    match peer.get(&request) {
                        Ok(response) => {
                            self.metrics.record_peer_hit();
                            return Ok(response_into_view(response));
                        }
                        Err(err) => {
                            tracing::warn!(
                                group = %self.name,
                                key = %key,
                                error = %err,
                                "peer fetch failed, falling back to local load"
                            );
                            self.metrics.record_peer_failure();
                        }
                    }
                }
            }
        }

        self.load_locally(key)
    }

    fn load_locally(&self, key: &str) -> Result<ByteView, DistCacheError> {
        let bytes = self.loader.load(key)?;
        self.metrics.record_local_load();
        let value = ByteView::from_vec(bytes);
        let expire_at = Instant::now() + FAR_FUTURE_HORIZON;
        self.cache.add(key, value.clone(), expire_at);
        Ok(value)
    }
}

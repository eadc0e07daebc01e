//! A single-mutex concurrency wrapper over [`Lru`].
//!
//! Every `SafeCache` operation mutates the LRU's recency ordering, so there
//! is no read path that would benefit from a reader/writer split — a plain
//! `parking_lot::Mutex` is the whole synchronization story here, matching
//! the donor crate's choice of `parking_lot` for its own concurrent caches.

use crate::config::LruConfig;
use crate::lru::{CacheValue, Lru, OnEvicted, SystemClock};
use parking_lot::Mutex;
use std::time::Instant;

struct Inner<V: CacheValue> {
    max_bytes: u64,
    on_evicted: Mutex<Option<OnEvicted<V>>>,
    lru: Mutex<Option<Lru<V, SystemClock>>>,
}

/// Thread-safe wrapper owning one [`Lru`], constructed lazily on first
/// [`SafeCache::add`] so a [`Group`](crate::group::Group) with no write
/// traffic yet never allocates the backing map.
///
/// The eviction callback, if any, is fixed at construction time and wired in
/// when the inner cache is built — it cannot be changed per-call.
pub struct SafeCache<V: CacheValue> {
    inner: Inner<V>,
}

impl<V: CacheValue> std::fmt::Debug for SafeCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SafeCache")
            .field("max_bytes", &self.inner.max_bytes)
            .field("initialized", &self.inner.lru.lock().is_some())
            .finish_non_exhaustive()
    }
}

impl<V: CacheValue + Clone> SafeCache<V> {
    /// Creates a wrapper bounded by `max_bytes`, with no eviction callback.
    pub fn new(max_bytes: u64) -> Self {
        Self::with_eviction_callback(max_bytes, None)
    }

    /// Creates a wrapper bounded by `max_bytes` that invokes `on_evicted`
    /// whenever the inner cache drops an entry. The inner [`Lru`] is not
    /// allocated until the first `add`.
    pub fn with_eviction_callback(max_bytes: u64, on_evicted: Option<OnEvicted<V>>) -> Self {
        SafeCache {
            inner: Inner {
                max_bytes,
                on_evicted: Mutex::new(on_evicted),
                lru: Mutex::new(None),
            },
        }
    }

    /// Inserts `value` under `key`, constructing the inner cache on first use.
    pub fn add(&self, key: &str, value: V, expire_at: Instant) {
        let mut guard = self.inner.lru.lock();
        if guard.is_none() {
            let on_evicted = self.inner.on_evicted.lock().take();
            let config = LruConfig {
                max_bytes: self.inner.max_bytes,
                ..LruConfig::default()
            };
            *guard = Some(Lru::new(config, on_evicted));
        }
        guard.as_mut().unwrap().add(key, value, expire_at);
    }

    /// Looks up `key`. Returns `None` both when the inner cache is
    /// uninitialized and on an ordinary miss.
    pub fn get(&self, key: &str) -> Option<V> {
        let mut guard = self.inner.lru.lock();
        guard.as_mut()?.get(key).cloned()
    }

    /// Number of live entries, or `0` if the inner cache has never been built.
    pub fn len(&self) -> usize {
        self.inner.lru.lock().as_ref().map_or(0, Lru::len)
    }

    /// True when the cache holds no entries (including when uninitialized).
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

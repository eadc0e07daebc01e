//! Bounded LRU with byte accounting and probabilistic TTL jitter.
//!
//! # Data structure
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                            Lru<V>                                │
//! │                                                                   │
//! │  HashMap<String, usize>        Arena (Vec<Option<Slot<V>>>)       │
//! │  ┌──────────────┐             ┌───────────────────────────────┐  │
//! │  │ "apple"  ───────────────▶  │ MRU ◀──▶ ... ◀──▶ LRU          │  │
//! │  │ "banana" ───────────────▶  │  ▲                    │        │  │
//! │  │ "cherry" ───────────────▶  │  │                    ▼        │  │
//! │  └──────────────┘             │ head               tail        │  │
//! │                                └───────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Entries live in a flat arena (`Vec<Option<Slot<V>>>`) linked by `prev`/
//! `next` indices; a free list recycles slots freed by eviction instead of
//! shrinking the vector. The `HashMap` maps keys to arena indices for O(1)
//! lookup. An index-based arena stands in here for the raw-pointer
//! intrusive list an LRU is often built from: it keeps every operation in
//! safe Rust.
//!
//! # TTL jitter
//!
//! Every insertion adds a uniform random offset in `[0, expire_jitter)` to
//! the caller-supplied expiry. Without this, a batch of entries inserted at
//! the same moment (e.g. after a cold-start warm-up) would all expire in the
//! same instant, producing a load spike on the authoritative store — a
//! "cache avalanche". Spreading expiries across a window turns that spike
//! into a trickle.
//!
//! `Get` additionally implements sliding TTL: the remaining lifetime at
//! access time is preserved and re-anchored to the current instant, so a
//! repeatedly-read entry does not expire out from under a hot key.

use crate::config::LruConfig;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// A value admissible into an [`Lru`]: anything that can report its own
/// byte footprint. [`ByteView`](crate::byte_view::ByteView) is the concrete
/// value [`Group`](crate::group::Group) stores; the cache itself is generic
/// so other sized payloads are admissible.
pub trait CacheValue {
    /// Size of this value in bytes, used for the cache's byte accounting.
    fn size_in_bytes(&self) -> usize;
}

/// Source of the current instant, injectable so tests can control expiry
/// without sleeping in wall-clock time.
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> Instant;
}

/// The default clock: `std::time::Instant::now()`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

struct Slot<V> {
    key: String,
    value: V,
    /// `length(key) + value.size_in_bytes()`, cached so eviction accounting
    /// doesn't need to re-query the value.
    weight: u64,
    expire_at: Instant,
    inserted_at: Instant,
    prev: Option<usize>,
    next: Option<usize>,
}

/// Callback invoked synchronously whenever an entry leaves the cache,
/// whether by explicit removal, capacity eviction, or lazy TTL expiry.
///
/// The callback must not reenter the cache it was registered on — it is
/// invoked while the cache's internal bookkeeping for the removal is mid-
/// flight. It is legal for the callback to panic; the cache does not catch
/// unwinds on your behalf, so a panicking callback propagates to the
/// `Lru::get`/`add`/`remove_oldest` caller.
pub type OnEvicted<V> = Box<dyn FnMut(&str, &V) + Send>;

/// A bounded, byte-accounted LRU cache with TTL jitter.
///
/// Not thread-safe by itself — see [`SafeCache`](crate::safe_cache::SafeCache)
/// for a single-mutex wrapper suitable for concurrent callers.
pub struct Lru<V, C: Clock = SystemClock> {
    config: LruConfig,
    clock: C,
    slots: Vec<Option<Slot<V>>>,
    free: Vec<usize>,
    index: HashMap<String, usize>,
    head: Option<usize>,
    tail: Option<usize>,
    tracked_bytes: u64,
    on_evicted: Option<OnEvicted<V>>,
}

impl<V, C: Clock> std::fmt::Debug for Lru<V, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lru")
            .field("len", &self.index.len())
            .field("tracked_bytes", &self.tracked_bytes)
            .field("max_bytes", &self.config.max_bytes)
            .finish_non_exhaustive()
    }
}

impl<V: CacheValue> Lru<V, SystemClock> {
    /// Creates a cache bounded by `config.max_bytes`, using the real wall
    /// clock. `max_bytes = 0` disables size-based eviction.
    pub fn new(config: LruConfig, on_evicted: Option<OnEvicted<V>>) -> Self {
        Lru::with_clock(config, on_evicted, SystemClock)
    }
}

impl<V: CacheValue, C: Clock> Lru<V, C> {
    /// Creates a cache using a caller-supplied [`Clock`], for deterministic
    /// TTL tests.
    pub fn with_clock(config: LruConfig, on_evicted: Option<OnEvicted<V>>, clock: C) -> Self {
        Lru {
            config,
            clock,
            slots: Vec::new(),
            free: Vec::new(),
            index: HashMap::new(),
            head: None,
            tail: None,
            tracked_bytes: 0,
            on_evicted,
        }
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// True when the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Current tracked byte total across all live entries.
    pub fn tracked_bytes(&self) -> u64 {
        self.tracked_bytes
    }

    fn jitter(&self) -> Duration {
        let window = self.config.expire_jitter;
        if window.is_zero() {
            return Duration::ZERO;
        }
        let nanos = window.as_nanos().min(u128::from(u64::MAX)) as u64;
        Duration::from_nanos(uniform_draw(nanos))
    }

    fn weight_of(key: &str, value: &V) -> u64 {
        (key.len() as u64) + (value.size_in_bytes() as u64)
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = {
            let slot = self.slots[idx].as_ref().expect("unlink: slot must be live");
            (slot.prev, slot.next)
        };
        match prev {
            Some(p) => self.slots[p].as_mut().unwrap().next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.slots[n].as_mut().unwrap().prev = prev,
            None => self.tail = prev,
        }
    }

    fn push_front(&mut self, idx: usize) {
        let old_head = self.head;
        {
            let slot = self.slots[idx].as_mut().unwrap();
            slot.prev = None;
            slot.next = old_head;
        }
        if let Some(h) = old_head {
            self.slots[h].as_mut().unwrap().prev = Some(idx);
        }
        self.head = Some(idx);
        if self.tail.is_none() {
            self.tail = Some(idx);
        }
    }

    fn move_to_front(&mut self, idx: usize) {
        if self.head == Some(idx) {
            return;
        }
        self.unlink(idx);
        self.push_front(idx);
    }

    fn alloc_slot(&mut self, slot: Slot<V>) -> usize {
        if let Some(idx) = self.free.pop() {
            self.slots[idx] = Some(slot);
            idx
        } else {
            self.slots.push(Some(slot));
            self.slots.len() - 1
        }
    }

    /// Removes the entry at `idx`, running the eviction callback and
    /// updating byte accounting. The caller must unlink `idx` from the list
    /// and drop it from `index` separately — this only frees the arena slot.
    fn finish_remove(&mut self, idx: usize) {
        let slot = self.slots[idx].take().expect("finish_remove: slot must be live");
        self.free.push(idx);
        self.tracked_bytes -= slot.weight;
        if let Some(cb) = self.on_evicted.as_mut() {
            cb(&slot.key, &slot.value);
        }
    }

    fn remove_entry(&mut self, idx: usize) {
        self.unlink(idx);
        let key = self.slots[idx].as_ref().unwrap().key.clone();
        self.index.remove(&key);
        self.finish_remove(idx);
    }

    /// Evicts the tail (least-recently-used entry), if any, invoking the
    /// eviction callback.
    pub fn remove_oldest(&mut self) {
        if let Some(idx) = self.tail {
            self.remove_entry(idx);
        }
    }

    /// Inserts or replaces `key` with `value`, expiring no earlier than
    /// `expire_at` plus a random jitter offset in `[0, expire_jitter)`.
    ///
    /// If `key` is already present its value is replaced in place, the
    /// tracked byte total is adjusted by the size delta, and the entry's
    /// expiry is reset — but its insertion timestamp (used by `get`'s
    /// sliding-TTL refresh) is left untouched, matching the upstream
    /// behavior this was distilled from.
    pub fn add(&mut self, key: &str, value: V, expire_at: Instant) {
        let expire_at = expire_at + self.jitter();
        if let Some(&idx) = self.index.get(key) {
            self.move_to_front(idx);
            let slot = self.slots[idx].as_mut().unwrap();
            let new_weight = Self::weight_of(key, &value);
            self.tracked_bytes = self.tracked_bytes + new_weight - slot.weight;
            slot.value = value;
            slot.weight = new_weight;
            slot.expire_at = expire_at;
        } else {
            let now = self.clock.now();
            let weight = Self::weight_of(key, &value);
            let slot = Slot {
                key: key.to_string(),
                value,
                weight,
                expire_at,
                inserted_at: now,
                prev: None,
                next: None,
            };
            let idx = self.alloc_slot(slot);
            self.push_front(idx);
            self.index.insert(key.to_string(), idx);
            self.tracked_bytes += weight;
        }

        // `self.len() > 1` keeps the just-inserted/updated entry alive even
        // when its own weight alone exceeds `max_bytes`: the eviction loop
        // empties everything *else* first and then stops, rather than
        // evicting the entry it was supposed to be making room for.
        while self.config.max_bytes != 0 && self.tracked_bytes > self.config.max_bytes && self.len() > 1 {
            self.remove_oldest();
        }
    }

    /// Looks up `key`. Returns `None` on a miss, including when the entry is
    /// present but expired — in which case it is evicted first (invoking the
    /// eviction callback) so the miss is also a removal.
    pub fn get(&mut self, key: &str) -> Option<&V>
    where
        V: Clone,
    {
        let idx = *self.index.get(key)?;
        let now = self.clock.now();
        let expired = self.slots[idx].as_ref().unwrap().expire_at < now;
        if expired {
            self.remove_entry(idx);
            return None;
        }

        {
            let slot = self.slots[idx].as_mut().unwrap();
            let ttl_remaining = slot.expire_at.saturating_duration_since(slot.inserted_at);
            slot.inserted_at = now;
            slot.expire_at = now + ttl_remaining;
        }
        self.move_to_front(idx);
        Some(&self.slots[idx].as_ref().unwrap().value)
    }
}

/// A uniform draw in `[0, bound)`. Falls back to `0` when `bound == 0`
/// (callers already special-case a zero-width jitter window, but this stays
/// total rather than panicking on an empty range).
fn uniform_draw(bound: u64) -> u64 {
    if bound == 0 {
        return 0;
    }
    rand::Rng::gen_range(&mut rand::thread_rng(), 0..bound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    impl CacheValue for &'static str {
        fn size_in_bytes(&self) -> usize {
            self.len()
        }
    }

    fn no_jitter_config(max_bytes: u64) -> LruConfig {
        LruConfig {
            max_bytes,
            expire_jitter: Duration::ZERO,
        }
    }

    fn far_future() -> Instant {
        Instant::now() + Duration::from_secs(3600)
    }

    #[test]
    fn eviction_scenario_from_spec() {
        // key1..key3 each weigh 10 (4-byte key + 6-byte value); key4 weighs
        // 32. max_bytes=60 admits all three small entries (30) plus key4
        // (62 total) only after the least-recently-touched entry — key1,
        // the first one added and never touched again — is evicted.
        let evicted = Arc::new(Mutex::new(Vec::new()));
        let evicted_cb = Arc::clone(&evicted);
        let cb: OnEvicted<&'static str> = Box::new(move |k, _v| {
            evicted_cb.lock().unwrap().push(k.to_string());
        });
        let mut cache: Lru<&'static str> = Lru::new(no_jitter_config(60), Some(cb));

        cache.add("key1", "value1", far_future());
        cache.add("key2", "value2", far_future());
        cache.add("key3", "value3", far_future());
        cache.add("key4", "value4 that takes more space", far_future());

        assert_eq!(cache.get("key1"), None);
        assert_eq!(evicted.lock().unwrap().as_slice(), ["key1"]);
        assert_eq!(cache.get("key2"), Some(&"value2"));
        assert_eq!(cache.get("key3"), Some(&"value3"));
        assert_eq!(cache.get("key4"), Some(&"value4 that takes more space"));
    }

    #[test]
    fn lazy_ttl_expiry() {
        let evicted = Arc::new(Mutex::new(0usize));
        let evicted_cb = Arc::clone(&evicted);
        let cb: OnEvicted<&'static str> = Box::new(move |_k, _v| {
            *evicted_cb.lock().unwrap() += 1;
        });
        let mut cache: Lru<&'static str> = Lru::new(no_jitter_config(0), Some(cb));

        cache.add("k", "v", Instant::now() + Duration::from_secs(1));
        std::thread::sleep(Duration::from_secs(2));

        assert_eq!(cache.get("k"), None);
        assert_eq!(*evicted.lock().unwrap(), 1);
    }

    #[test]
    fn zero_max_bytes_disables_eviction() {
        let mut cache: Lru<&'static str> = Lru::new(no_jitter_config(0), None);
        for i in 0..1000 {
            let key = Box::leak(format!("k{i}").into_boxed_str());
            cache.add(key, "x", far_future());
        }
        assert_eq!(cache.len(), 1000);
    }

    #[test]
    fn value_exactly_at_capacity_survives() {
        // "a" (1) + "v" (1) = weight 2, exactly max_bytes.
        let mut cache: Lru<&'static str> = Lru::new(no_jitter_config(2), None);
        cache.add("a", "v", far_future());
        assert_eq!(cache.get("a"), Some(&"v"));
    }

    #[test]
    fn value_exceeding_capacity_empties_cache_but_terminates() {
        let mut cache: Lru<&'static str> = Lru::new(no_jitter_config(4), None);
        cache.add("a", "v", far_future());
        cache.add("huge-key-name", "a value far bigger than the whole budget", far_future());
        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn get_refreshes_sliding_ttl() {
        let mut cache: Lru<&'static str> = Lru::new(no_jitter_config(0), None);
        cache.add("k", "v", Instant::now() + Duration::from_millis(500));
        std::thread::sleep(Duration::from_millis(300));
        assert_eq!(cache.get("k"), Some(&"v"));
        std::thread::sleep(Duration::from_millis(300));
        // Original window (500ms) was re-anchored at the first get, ~300ms in,
        // so the entry should still be alive at the 600ms mark.
        assert_eq!(cache.get("k"), Some(&"v"));
    }

    #[test]
    fn move_to_front_reorders_recency() {
        let mut cache: Lru<&'static str> = Lru::new(no_jitter_config(100), None);
        cache.add("a", "1", far_future());
        cache.add("b", "2", far_future());
        cache.add("c", "3", far_future());
        cache.get("a"); // "a" becomes MRU
        cache.add("d", "4 padded to force an eviction here", far_future());
        assert_eq!(cache.get("b"), None);
        assert!(cache.get("a").is_some());
        assert!(cache.get("c").is_some());
    }
}

//! Stress tests for the cache's concurrency guarantees.
//!
//! These push many threads through the public API at once and check the
//! invariants the specification's §5 (concurrency & resource model) and §8
//! (testable properties) name, rather than just checking nothing panics:
//! single-flight coalescing under a thundering herd, the byte-budget bound
//! holding under concurrent inserts, peer-set reconfiguration never being
//! observed half-applied, and the registry staying consistent under
//! concurrent registration and lookup.

use distcache::{new_group, DistCacheError, FnLoader, PeerGetter, PeerRequest, PeerResponse, PeerRouter};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

const NUM_THREADS: usize = 16;
const OPS_PER_THREAD: usize = 2_000;

// ============================================================================
// SingleFlight / Group — coalescing under a thundering herd
// ============================================================================

#[test]
fn stress_singleflight_coalesces_a_thundering_herd() {
    let load_count = Arc::new(AtomicUsize::new(0));
    let load_count_cb = Arc::clone(&load_count);
    let group = new_group(
        "stress-singleflight-herd",
        1024,
        Box::new(FnLoader::new(move |key: &str| {
            load_count_cb.fetch_add(1, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(20));
            Ok(key.as_bytes().to_vec())
        })),
    );

    const CALLERS: usize = 200;
    let start = Arc::new(Barrier::new(CALLERS));
    let mut handles = Vec::with_capacity(CALLERS);

    for _ in 0..CALLERS {
        let group = Arc::clone(&group);
        let start = Arc::clone(&start);
        handles.push(thread::spawn(move || {
            start.wait();
            group.get("stampede-key").unwrap()
        }));
    }

    for h in handles {
        let v = h.join().expect("caller thread panicked");
        assert_eq!(v.as_bytes(), b"stampede-key");
    }

    // Every caller either led the one load or joined it; the loader itself
    // only ever ran once for the whole stampede.
    assert_eq!(load_count.load(Ordering::SeqCst), 1);
}

#[test]
fn stress_singleflight_reevaluates_across_non_overlapping_epochs() {
    // Distinct from the thundering-herd case: repeated *sequential* batches
    // of concurrent callers should each trigger exactly one load, since a
    // completed call is removed from the index (no memoization).
    let load_count = Arc::new(AtomicUsize::new(0));
    let load_count_cb = Arc::clone(&load_count);
    let group = new_group(
        "stress-singleflight-epochs",
        1024,
        Box::new(FnLoader::new(move |key: &str| {
            load_count_cb.fetch_add(1, Ordering::SeqCst);
            Ok(key.as_bytes().to_vec())
        })),
    );

    // Force a miss on every round by using a fresh key per epoch — the
    // per-epoch coalescing is what's under test, not cache retention.
    for epoch in 0..10 {
        let key = format!("epoch-key-{epoch}");
        let barrier = Arc::new(Barrier::new(NUM_THREADS));
        let handles: Vec<_> = (0..NUM_THREADS)
            .map(|_| {
                let group = Arc::clone(&group);
                let barrier = Arc::clone(&barrier);
                let key = key.clone();
                thread::spawn(move || {
                    barrier.wait();
                    group.get(&key).unwrap()
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
    }

    assert_eq!(load_count.load(Ordering::SeqCst), 10);
}

// ============================================================================
// Group — concurrent mixed hit/miss traffic stays within its byte budget
// ============================================================================

#[test]
fn stress_concurrent_gets_respect_the_byte_budget() {
    let group = new_group(
        "stress-byte-budget",
        4096,
        Box::new(FnLoader::new(|key: &str| Ok(format!("value-for-{key}").into_bytes()))),
    );

    let mut handles = Vec::with_capacity(NUM_THREADS);
    for t in 0..NUM_THREADS {
        let group = Arc::clone(&group);
        handles.push(thread::spawn(move || {
            for i in 0..OPS_PER_THREAD {
                // A modest key space so threads repeatedly collide on the
                // same keys and exercise both single-flight and eviction.
                let key = format!("k{}", (t * 37 + i) % 200);
                let value = group.get(&key).unwrap();
                assert_eq!(value.as_str(), format!("value-for-{key}"));
            }
        }));
    }

    for h in handles {
        h.join().expect("worker thread panicked");
    }

    // No public accessor exposes tracked_bytes directly off `Group`, but a
    // budget violation would have caused the backing `Lru` to grow without
    // bound; the metrics snapshot at least confirms evictions happened
    // (200 distinct keys at this budget cannot all fit) and the crate is
    // still answering requests correctly afterward.
    assert!(group.metrics().evictions > 0);
    let check = group.get("k0").unwrap();
    assert_eq!(check.as_str(), "value-for-k0");
}

// ============================================================================
// Registry — concurrent registration and lookup
// ============================================================================

#[test]
fn stress_registry_concurrent_registration_and_lookup() {
    let barrier = Arc::new(Barrier::new(NUM_THREADS));
    let mut handles = Vec::with_capacity(NUM_THREADS);

    for t in 0..NUM_THREADS {
        let barrier = Arc::clone(&barrier);
        handles.push(thread::spawn(move || {
            let name = format!("stress-registry-concurrent-{t}");
            barrier.wait();
            new_group(
                name.clone(),
                1024,
                Box::new(FnLoader::new(|key: &str| Ok(key.as_bytes().to_vec()))),
            );
            // Immediately look it up from the same thread; other threads are
            // concurrently registering distinct names at the same time.
            let found = distcache::get_group(&name);
            assert!(found.is_some());
        }));
    }

    for h in handles {
        h.join().expect("registry worker panicked");
    }

    for t in 0..NUM_THREADS {
        let name = format!("stress-registry-concurrent-{t}");
        assert!(distcache::get_group(&name).is_some());
    }
}

// ============================================================================
// PeerRouter — reconfiguration is never observed half-applied
// ============================================================================

struct TaggedPeer(String);

impl PeerGetter for TaggedPeer {
    fn get(&self, req: &PeerRequest) -> Result<PeerResponse, DistCacheError> {
        Ok(PeerResponse {
            value: format!("{}:{}", self.0, req.key).into_bytes(),
        })
    }
}

#[test]
fn stress_peer_router_swap_is_never_observed_half_applied() {
    let router = Arc::new(PeerRouter::new("self", 10));

    // Two peer generations: "gen-a" nodes and "gen-b" nodes. Readers must
    // only ever see the ring and the getter map agree with each other — a
    // node id with no corresponding getter (or vice versa) would mean a
    // reader observed a torn update.
    let stop = Arc::new(AtomicUsize::new(0));
    let mut handles = Vec::with_capacity(NUM_THREADS);

    for _ in 0..NUM_THREADS {
        let router = Arc::clone(&router);
        let stop = Arc::clone(&stop);
        handles.push(thread::spawn(move || {
            let mut observations = 0;
            while stop.load(Ordering::Relaxed) == 0 {
                if let Some((getter, _owned)) = router.pick("some-key") {
                    let response = getter
                        .get(&PeerRequest {
                            group: "g".to_string(),
                            key: "some-key".to_string(),
                        })
                        .unwrap();
                    let text = String::from_utf8(response.value).unwrap();
                    // Whichever generation answered, its tag must be
                    // internally consistent (gen-a-* or gen-b-*), never a
                    // mix of a stale node id resolved against the other
                    // generation's getter map.
                    assert!(text.starts_with("gen-a") || text.starts_with("gen-b"));
                    observations += 1;
                }
            }
            observations
        }));
    }

    for gen in 0..50 {
        let mut peers: HashMap<String, Arc<dyn PeerGetter>> = HashMap::new();
        let tag = if gen % 2 == 0 { "gen-a" } else { "gen-b" };
        peers.insert(
            "only-node".to_string(),
            Arc::new(TaggedPeer(tag.to_string())) as Arc<dyn PeerGetter>,
        );
        router.set_peers(peers);
        thread::sleep(Duration::from_millis(1));
    }
    stop.store(1, Ordering::Relaxed);

    let mut total_observations = 0;
    for h in handles {
        total_observations += h.join().expect("reader thread panicked");
    }
    assert!(total_observations > 0);
}

// ============================================================================
// Group — concurrent peer fallthrough under load
// ============================================================================

struct FlakyPeer {
    failures: Arc<AtomicUsize>,
}

impl PeerGetter for FlakyPeer {
    fn get(&self, _req: &PeerRequest) -> Result<PeerResponse, DistCacheError> {
        self.failures.fetch_add(1, Ordering::SeqCst);
        Err(DistCacheError::PeerFetchFailure("simulated outage".to_string()))
    }
}

#[test]
fn stress_concurrent_peer_fallthrough_all_fall_back_to_local_loader() {
    let peer_failures = Arc::new(AtomicUsize::new(0));
    let local_loads = Arc::new(AtomicUsize::new(0));
    let local_loads_cb = Arc::clone(&local_loads);

    let group = new_group(
        "stress-peer-fallthrough",
        4096,
        Box::new(FnLoader::new(move |key: &str| {
            local_loads_cb.fetch_add(1, Ordering::SeqCst);
            Ok(format!("local:{key}").into_bytes())
        })),
    );

    let mut peers: HashMap<String, Arc<dyn PeerGetter>> = HashMap::new();
    peers.insert(
        "flaky".to_string(),
        Arc::new(FlakyPeer {
            failures: Arc::clone(&peer_failures),
        }) as Arc<dyn PeerGetter>,
    );
    let router = PeerRouter::new("self", 10);
    router.set_peers(peers);
    group.register_peers(Box::new(router));

    let barrier = Arc::new(Barrier::new(NUM_THREADS));
    let mut handles = Vec::with_capacity(NUM_THREADS);
    for t in 0..NUM_THREADS {
        let group = Arc::clone(&group);
        let barrier = Arc::clone(&barrier);
        handles.push(thread::spawn(move || {
            barrier.wait();
            let key = format!("key-{t}");
            let value = group.get(&key).unwrap();
            assert_eq!(value.as_str(), format!("local:{key}"));
        }));
    }
    for h in handles {
        h.join().expect("fallthrough worker panicked");
    }

    assert!(peer_failures.load(Ordering::SeqCst) >= NUM_THREADS);
    assert_eq!(local_loads.load(Ordering::SeqCst), NUM_THREADS);
}

//! Single-flight coalescing under a concurrent miss storm: many threads
//! requesting the same key during a slow load all share one evaluation of
//! the loader.
//!
//! Run with: cargo run --example singleflight_stress

use distcache::{new_group, FnLoader};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

const CONCURRENT_CALLERS: usize = 500;
const SIMULATED_LOAD_LATENCY: Duration = Duration::from_millis(50);

fn main() {
    println!("distcache: single-flight coalescing under load");
    println!("=================================================\n");

    let load_count = Arc::new(AtomicUsize::new(0));
    let load_count_cb = Arc::clone(&load_count);
    let group = new_group(
        "singleflight-stress-demo",
        1024,
        Box::new(FnLoader::new(move |key: &str| {
            load_count_cb.fetch_add(1, Ordering::SeqCst);
            thread::sleep(SIMULATED_LOAD_LATENCY);
            Ok(key.as_bytes().to_vec())
        })),
    );

    println!(
        "spawning {CONCURRENT_CALLERS} threads, all requesting the same key at once..."
    );
    let start_line = Arc::new(Barrier::new(CONCURRENT_CALLERS));
    let started_at = Instant::now();

    let handles: Vec<_> = (0..CONCURRENT_CALLERS)
        .map(|_| {
            let group = Arc::clone(&group);
            let start_line = Arc::clone(&start_line);
            thread::spawn(move || {
                start_line.wait();
                group.get("hot-key").expect("loader never fails in this demo")
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("caller thread panicked");
    }

    println!("all callers returned in {:?}", started_at.elapsed());
    println!(
        "loader ran {} time(s) for {CONCURRENT_CALLERS} callers",
        load_count.load(Ordering::SeqCst)
    );

    let snapshot = group.metrics();
    println!(
        "metrics: misses={} coalesced_loads={} local_loads={}",
        snapshot.misses, snapshot.coalesced_loads, snapshot.local_loads
    );
    println!(
        "\n({} caller(s) paid the full load latency; the other {} were coalesced onto that one load)",
        snapshot.misses - snapshot.coalesced_loads,
        snapshot.coalesced_loads
    );
}

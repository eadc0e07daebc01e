//! Basic `distcache` usage: a single process, one `Group`, a plain loader.
//!
//! Run with: cargo run --example basic_usage

use distcache::{new_group, FnLoader};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn main() {
    println!("distcache: basic usage");
    println!("=======================\n");

    let loads = Arc::new(AtomicUsize::new(0));
    let loads_for_loader = Arc::clone(&loads);

    // A group that "loads" values by uppercasing the key, standing in for a
    // database call or a network fetch. max_bytes bounds the local cache at
    // 1 KiB regardless of how many distinct keys get requested.
    let group = new_group(
        "basic-usage-demo",
        1024,
        Box::new(FnLoader::new(move |key: &str| {
            loads_for_loader.fetch_add(1, Ordering::SeqCst);
            Ok(key.to_uppercase().into_bytes())
        })),
    );

    for key in ["alice", "bob", "carol", "alice", "bob"] {
        let value = group.get(key).expect("loader never fails in this demo");
        println!("get({key:?}) -> {:?}", value.as_str());
    }

    println!("\nloader invoked {} time(s)", loads.load(Ordering::SeqCst));
    println!("(3, not 5 -- the two repeated keys were served from the cache)");

    let snapshot = group.metrics();
    println!(
        "\nmetrics: hits={} misses={} local_loads={}",
        snapshot.hits, snapshot.misses, snapshot.local_loads
    );
}

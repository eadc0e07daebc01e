//! Peer routing and fallthrough: a key owned by a remote peer is served from
//! there; a peer that's unreachable falls back to the local loader instead
//! of failing the call.
//!
//! Run with: cargo run --example peer_fallthrough

use distcache::{new_group, DistCacheError, FnLoader, Group, PeerGetter, PeerRequest, PeerResponse, PeerRouter};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Stands in for a real network hop to another node: forwards the request
/// to a second, independently-owned `Group` living in this same process.
struct InProcessPeer {
    remote: Arc<Group>,
}

impl PeerGetter for InProcessPeer {
    fn get(&self, req: &PeerRequest) -> Result<PeerResponse, DistCacheError> {
        let view = self.remote.get(&req.key)?;
        Ok(PeerResponse {
            value: view.as_slice().to_vec(),
        })
    }
}

/// A peer that always fails, standing in for a node that's down or
/// unreachable.
struct UnreachablePeer;

impl PeerGetter for UnreachablePeer {
    fn get(&self, _req: &PeerRequest) -> Result<PeerResponse, DistCacheError> {
        Err(DistCacheError::PeerFetchFailure(
            "connection refused".to_string(),
        ))
    }
}

fn main() {
    println!("distcache: peer routing and fallthrough");
    println!("=========================================\n");

    // "remote-node" owns its own copy of the data, independent of the local
    // group's loader.
    let remote_loads = Arc::new(AtomicUsize::new(0));
    let remote_loads_cb = Arc::clone(&remote_loads);
    let remote_group = Arc::new(Group::new(
        "peer-fallthrough-demo-remote",
        1024,
        Box::new(FnLoader::new(move |key: &str| {
            remote_loads_cb.fetch_add(1, Ordering::SeqCst);
            Ok(format!("remote-value-for-{key}").into_bytes())
        })),
    ));

    let local_loads = Arc::new(AtomicUsize::new(0));
    let local_loads_cb = Arc::clone(&local_loads);
    let group = new_group(
        "peer-fallthrough-demo-local",
        1024,
        Box::new(FnLoader::new(move |key: &str| {
            local_loads_cb.fetch_add(1, Ordering::SeqCst);
            Ok(format!("local-value-for-{key}").into_bytes())
        })),
    );

    println!("1. Routing to a healthy peer");
    println!("   --------------------------");
    let router = PeerRouter::new("self", 10);
    let mut peers: HashMap<String, Arc<dyn PeerGetter>> = HashMap::new();
    peers.insert(
        "remote-node".to_string(),
        Arc::new(InProcessPeer {
            remote: Arc::clone(&remote_group),
        }),
    );
    router.set_peers(peers);
    group.register_peers(Box::new(router));

    let value = group.get("widget").unwrap();
    println!("   get(\"widget\") -> {:?}", value.as_str());
    println!(
        "   local loader ran {} time(s), remote ran {} time(s)",
        local_loads.load(Ordering::SeqCst),
        remote_loads.load(Ordering::SeqCst)
    );

    println!("\n2. Falling through an unreachable peer");
    println!("   ------------------------------------");
    let group2 = new_group(
        "peer-fallthrough-demo-local-2",
        1024,
        Box::new(FnLoader::new(|key: &str| {
            Ok(format!("local-value-for-{key}").into_bytes())
        })),
    );
    let router2 = PeerRouter::new("self", 10);
    let mut peers2: HashMap<String, Arc<dyn PeerGetter>> = HashMap::new();
    peers2.insert("down-node".to_string(), Arc::new(UnreachablePeer));
    router2.set_peers(peers2);
    group2.register_peers(Box::new(router2));

    let value = group2.get("gadget").unwrap();
    println!("   get(\"gadget\") -> {:?}", value.as_str());
    let snapshot = group2.metrics();
    println!(
        "   peer_failures={} local_loads={} (the peer fetch failed, but the call still succeeded)",
        snapshot.peer_failures, snapshot.local_loads
    );
}

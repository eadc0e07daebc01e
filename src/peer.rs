//! Capability seams for routing a key to its remote owner.
//!
//! `PeerPicker` and `PeerGetter` are the only things [`Group`](crate::group::Group)
//! knows about peers — how a concrete peer is reached (HTTP, gRPC, in-process
//! channel) is someone else's problem. `distcache-http`, a separate workspace
//! member, is one concrete satisfaction of this contract; tests in this
//! crate use simple in-memory stand-ins.

use crate::byte_view::ByteView;
use crate::error::DistCacheError;
use crate::hash_ring::ConsistentHashRing;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// The `(group, key)` pair carried to a remote peer.
#[derive(Debug, Clone)]
pub struct PeerRequest {
    /// Name of the [`Group`](crate::group::Group) the key belongs to.
    pub group: String,
    /// The cache key being fetched.
    pub key: String,
}

/// A peer's answer to a [`PeerRequest`].
#[derive(Debug, Clone)]
pub struct PeerResponse {
    /// The raw bytes for the requested key.
    pub value: Vec<u8>,
}

/// Fetches a value from one specific remote peer.
///
/// Concrete implementations (e.g. an HTTP client) are external to this
/// crate's core; this trait is the only contract `Group` depends on.
pub trait PeerGetter: Send + Sync {
    /// Fetches `req.key` from this peer's copy of `req.group`.
    fn get(&self, req: &PeerRequest) -> Result<PeerResponse, DistCacheError>;
}

/// Routes a key to the peer that owns it.
pub trait PeerPicker: Send + Sync {
    /// Picks the peer that owns `key`.
    ///
    /// Returns `None` when there is no peer pool configured (or it's empty).
    /// Returns `Some((peer, owned))` with `owned = true` when `peer` is the
    /// authoritative remote owner; a caller checks `peer` against its own
    /// identity to detect "the key is mine" before going remote.
    fn pick(&self, key: &str) -> Option<(Arc<dyn PeerGetter>, bool)>;
}

struct RingState {
    ring: ConsistentHashRing,
    getters: HashMap<String, Arc<dyn PeerGetter>>,
}

/// The default [`PeerPicker`]: a consistent-hash ring over a pool of
/// [`PeerGetter`]s, reconfigurable by atomically swapping in a fresh ring.
///
/// `set_peers` rebuilds the ring and the node-id → getter map together under
/// one lock acquisition, so [`PeerRouter::pick`] never observes a ring built
/// from one peer set paired with getters from another.
pub struct PeerRouter {
    self_id: String,
    replicas: usize,
    state: Mutex<RingState>,
}

impl std::fmt::Debug for PeerRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PeerRouter")
            .field("self_id", &self.self_id)
            .field("replicas", &self.replicas)
            .finish_non_exhaustive()
    }
}

impl PeerRouter {
    /// Creates a router identifying this process as `self_id`, with no peers
    /// configured yet (every `pick` returns `None` until [`PeerRouter::set_peers`]
    /// is called).
    pub fn new(self_id: impl Into<String>, replicas: usize) -> Self {
        PeerRouter {
            self_id: self_id.into(),
            replicas,
            state: Mutex::new(RingState {
                ring: ConsistentHashRing::new(replicas),
                getters: HashMap::new(),
            }),
        }
    }

    /// Atomically replaces the peer pool. `peers` maps each node id to the
    /// [`PeerGetter`] used to reach it; `self_id` (see [`PeerRouter::new`])
    /// should be one of those ids if this process also serves as a peer.
    pub fn set_peers(&self, peers: HashMap<String, Arc<dyn PeerGetter>>) {
        let mut ring = ConsistentHashRing::new(self.replicas);
        ring.add(peers.keys().cloned().collect::<Vec<_>>());
        let mut state = self.state.lock();
        state.ring = ring;
        state.getters = peers;
    }
}

impl PeerPicker for PeerRouter {
    fn pick(&self, key: &str) -> Option<(Arc<dyn PeerGetter>, bool)> {
        let state = self.state.lock();
        let node = state.ring.get(key)?;
        let owned = node != self.self_id;
        let getter = state.getters.get(node)?;
        Some((Arc::clone(getter), owned))
    }
}

/// Convenience: builds a [`ByteView`] from a successful [`PeerResponse`].
pub(crate) fn response_into_view(resp: PeerResponse) -> ByteView {
    ByteView::from_vec(resp.value)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct AlwaysFails;
    impl PeerGetter for AlwaysFails {
        fn get(&self, _req: &PeerRequest) -> Result<PeerResponse, DistCacheError> {
            Err(DistCacheError::PeerFetchFailure("down".to_string()))
        }
    }

    struct Echo(String);
    impl PeerGetter for Echo {
        fn get(&self, req: &PeerRequest) -> Result<PeerResponse, DistCacheError> {
            Ok(PeerResponse {
                value: format!("{}:{}", self.0, req.key).into_bytes(),
            })
        }
    }

    #[test]
    fn no_peers_configured_returns_none() {
        let router = PeerRouter::new("self", 10);
        assert!(router.pick("k").is_none());
    }

    #[test]
    fn self_id_is_reported_as_not_owned_elsewhere() {
        let mut peers: HashMap<String, Arc<dyn PeerGetter>> = HashMap::new();
        peers.insert("self".to_string(), Arc::new(Echo("self".to_string())));
        let router = PeerRouter::new("self", 10);
        router.set_peers(peers);

        // With a single node in the pool, every key routes there; since that
        // node is "self", `owned` must be false.
        let (_getter, owned) = router.pick("any-key").unwrap();
        assert!(!owned);
    }

    #[test]
    fn remote_peer_is_reported_as_owned() {
        let mut peers: HashMap<String, Arc<dyn PeerGetter>> = HashMap::new();
        peers.insert("peer-a".to_string(), Arc::new(Echo("peer-a".to_string())));
        let router = PeerRouter::new("self", 10);
        router.set_peers(peers);

        let (_getter, owned) = router.pick("any-key").unwrap();
        assert!(owned);
    }

    #[test]
    fn failing_peer_surfaces_as_error_from_get() {
        let mut peers: HashMap<String, Arc<dyn PeerGetter>> = HashMap::new();
        peers.insert("bad".to_string(), Arc::new(AlwaysFails));
        let router = PeerRouter::new("self", 10);
        router.set_peers(peers);

        let (getter, _owned) = router.pick("k").unwrap();
        let err = getter.get(&PeerRequest {
            group: "g".to_string(),
            key: "k".to_string(),
        });
        assert!(err.is_err());
    }
}

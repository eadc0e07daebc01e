//! Client-side peer pool: consistent-hash routing over a set of HTTP peers.

use crate::client::HttpPeerGetter;
use distcache::{PeerGetter, PeerPicker, PeerRouter};
use std::collections::HashMap;
use std::sync::Arc;

/// Path prefix `distcache-http` requests and serves under by default.
pub const DEFAULT_BASE_PATH: &str = "/_distcache";

/// Virtual-node replica count used to build the pool's hash ring, matching
/// the reference transport this crate is modeled on.
pub const DEFAULT_REPLICAS: usize = 50;

/// A [`PeerPicker`] backed by HTTP peers, reachable under a shared base path.
///
/// Wraps a [`distcache::PeerRouter`] (the consistent-hash ring that decides
/// *which* peer owns a key) and builds one [`HttpPeerGetter`] per configured
/// address to do the actual fetch. `self_addr` should be included in the
/// address list passed to [`HttpPeerPool::set_peers`] if this process also
/// serves its own shard; the ring then reports that key as not-owned-
/// elsewhere rather than routing it back out over the network.
pub struct HttpPeerPool {
    base_path: String,
    router: PeerRouter,
}

impl std::fmt::Debug for HttpPeerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpPeerPool")
            .field("base_path", &self.base_path)
            .field("router", &self.router)
            .finish()
    }
}

impl HttpPeerPool {
    /// Creates a pool identifying this process as `self_addr`, serving and
    /// dialing peers under [`DEFAULT_BASE_PATH`].
    pub fn new(self_addr: impl Into<String>) -> Self {
        Self::with_base_path(self_addr, DEFAULT_BASE_PATH)
    }

    /// Like [`HttpPeerPool::new`], but serving and dialing peers under a
    /// caller-chosen base path instead of the default.
    pub fn with_base_path(self_addr: impl Into<String>, base_path: impl Into<String>) -> Self {
        HttpPeerPool {
            base_path: base_path.into(),
            router: PeerRouter::new(self_addr, DEFAULT_REPLICAS),
        }
    }

    /// The path prefix peers are expected to serve `distcache-http` requests
    /// under, e.g. `/_distcache`.
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Atomically replaces the peer set. Each `addr` (e.g.
    /// `http://10.0.0.12:8001`) becomes one ring node, reached at
    /// `addr` + [`HttpPeerPool::base_path`].
    pub fn set_peers<I, S>(&self, addrs: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut peers: HashMap<String, Arc<dyn PeerGetter>> = HashMap::new();
        for addr in addrs {
            let addr = addr.into();
            let base_url = format!("{addr}{}", self.base_path);
            peers.insert(addr, Arc::new(HttpPeerGetter::new(base_url)) as Arc<dyn PeerGetter>);
        }
        self.router.set_peers(peers);
    }
}

impl PeerPicker for HttpPeerPool {
    fn pick(&self, key: &str) -> Option<(Arc<dyn PeerGetter>, bool)> {
        self.router.pick(key)
    }
}

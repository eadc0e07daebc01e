//! Consistent-hash ring with virtual-node replication.
//!
//! Maps string keys onto a fixed pool of node identifiers so that, for a
//! given `(replicas, hash_fn, node_id_set, insertion_order)`, every key
//! deterministically routes to the same node — the property the peer router
//! relies on to avoid cross-process coordination on every lookup.

use std::collections::HashMap;

/// A hash function over raw bytes, defaulting to CRC32-IEEE — the same
/// function `hash/crc32.ChecksumIEEE` computes in the source this crate's
/// design was distilled from.
pub type HashFn = fn(&[u8]) -> u32;

fn crc32_ieee(data: &[u8]) -> u32 {
    crc32fast::hash(data)
}

/// A replicated virtual-node ring mapping keys to node identifiers.
///
/// Construct with [`ConsistentHashRing::new`], populate with
/// [`ConsistentHashRing::add`], then query with [`ConsistentHashRing::get`].
/// There is deliberately no `remove`: membership changes are handled by
/// building a fresh ring and swapping it in wholesale (see
/// [`PeerRouter`](crate::peer::PeerRouter)), so a `Get` never observes a
/// ring half-updated mid-reconfiguration.
pub struct ConsistentHashRing {
    hash_fn: HashFn,
    replicas: usize,
    /// Sorted virtual-node hash positions.
    positions: Vec<u32>,
    /// Position -> owning node id. Collisions are resolved by last-add-wins;
    /// this is a documented property, not a bug, and the test suite must not
    /// depend on which of two colliding nodes "wins".
    position_to_node: HashMap<u32, String>,
}

impl std::fmt::Debug for ConsistentHashRing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsistentHashRing")
            .field("replicas", &self.replicas)
            .field("positions", &self.positions.len())
            .finish_non_exhaustive()
    }
}

impl ConsistentHashRing {
    /// Creates an empty ring with `replicas` virtual nodes per physical node
    /// and the default CRC32-IEEE hash.
    pub fn new(replicas: usize) -> Self {
        ConsistentHashRing::with_hash_fn(replicas, crc32_ieee)
    }

    /// Creates an empty ring using a caller-supplied hash function.
    pub fn with_hash_fn(replicas: usize, hash_fn: HashFn) -> Self {
        ConsistentHashRing {
            hash_fn,
            replicas,
            positions: Vec::new(),
            position_to_node: HashMap::new(),
        }
    }

    /// Adds each node id, contributing `replicas` virtual positions per node
    /// computed as `hash(decimal(i) ++ node_id)` for `i` in `0..replicas`.
    pub fn add<S: AsRef<str>>(&mut self, node_ids: impl IntoIterator<Item = S>) {
        for node_id in node_ids {
            let node_id = node_id.as_ref();
            for i in 0..self.replicas {
                let virtual_key = format!("{i}{node_id}");
                let position = (self.hash_fn)(virtual_key.as_bytes());
                self.positions.push(position);
                self.position_to_node.insert(position, node_id.to_string());
            }
        }
        self.positions.sort_unstable();
    }

    /// True when no node has been added yet.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Maps `key` to the node owning the first ring position at or after
    /// `hash(key)`, wrapping around to the first position if none is
    /// greater-or-equal. Returns `None` for an empty ring.
    pub fn get(&self, key: &str) -> Option<&str> {
        if self.positions.is_empty() {
            return None;
        }
        let hash = (self.hash_fn)(key.as_bytes());
        let idx = match self.positions.binary_search(&hash) {
            Ok(i) => i,
            Err(i) => i % self.positions.len(),
        };
        let position = self.positions[idx];
        self.position_to_node.get(&position).map(String::as_str)
    }
}

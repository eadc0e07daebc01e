//! Configuration structures.
//!
//! Plain structs with public fields, no builders. Construct one with all
//! fields set; there is no hidden default-then-mutate step.

use std::time::Duration;

/// Configuration for the bounded, TTL-jittered [`Lru`](crate::lru::Lru).
#[derive(Debug, Clone, Copy)]
pub struct LruConfig {
    /// Maximum tracked byte total (`length(key) + value.size` summed over all
    /// entries). `0` disables size-based eviction entirely.
    pub max_bytes: u64,

    /// Upper bound (exclusive) of the uniform jitter window added to every
    /// entry's expiry at insertion time. Spreads simultaneous-insert batches
    /// across this window to avoid a mass-expiry stampede.
    pub expire_jitter: Duration,
}

impl LruConfig {
    /// The default jitter window: three minutes.
    pub const DEFAULT_EXPIRE_JITTER: Duration = Duration::from_secs(180);

    /// Size-only-bounded config with the default jitter window.
    pub fn with_max_bytes(max_bytes: u64) -> Self {
        LruConfig {
            max_bytes,
            expire_jitter: Self::DEFAULT_EXPIRE_JITTER,
        }
    }
}

impl Default for LruConfig {
    fn default() -> Self {
        LruConfig::with_max_bytes(0)
    }
}

/// Configuration for a [`ConsistentHashRing`](crate::hash_ring::ConsistentHashRing).
#[derive(Debug, Clone, Copy)]
pub struct ConsistentHashConfig {
    /// Number of virtual-node positions each physical node contributes.
    /// Higher replica counts smooth load distribution across a small pool at
    /// the cost of a larger position table.
    pub replicas: usize,
}

impl ConsistentHashConfig {
    /// The value `Group` wires up by default for its peer-routing ring.
    pub const DEFAULT_REPLICAS: usize = 50;
}

impl Default for ConsistentHashConfig {
    fn default() -> Self {
        ConsistentHashConfig {
            replicas: Self::DEFAULT_REPLICAS,
        }
    }
}

/// Configuration for a [`Group`](crate::group::Group).
#[derive(Debug, Clone, Copy)]
pub struct GroupConfig {
    /// Byte budget forwarded to the group's [`SafeCache`](crate::safe_cache::SafeCache).
    pub max_bytes: u64,
    /// Ring replication factor forwarded to the group's [`PeerRouter`](crate::peer::PeerRouter)
    /// once peers are registered.
    pub replicas: usize,
}

impl GroupConfig {
    /// Config with the given capacity and the donor's default replica count.
    pub fn with_max_bytes(max_bytes: u64) -> Self {
        GroupConfig {
            max_bytes,
            replicas: ConsistentHashConfig::DEFAULT_REPLICAS,
        }
    }
}

//! A single-process, read-through, peer-aware cache.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │                              Group::get                               │
//! │                                                                        │
//! │   caller ──▶ SafeCache ──hit──▶ return                                │
//! │                  │                                                     │
//! │                 miss                                                  │
//! │                  ▼                                                     │
//! │            SingleFlight.do_call(key, ‖load‖)                          │
//! │                  │                                                     │
//! │                  ▼                                                     │
//! │          PeerPicker.pick(key) ──owned elsewhere──▶ PeerGetter.get      │
//! │                  │                                      │              │
//! │                 local                                 success          │
//! │                  ▼                                      ▼              │
//! │              Loader.load                            return (no local   │
//! │                  │                                   caching of a      │
//! │                  ▼                                   peer-owned hit)   │
//! │          SafeCache.add + return                                        │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! [`Group`] is the type most callers reach for: give it a name, a byte
//! budget, and a [`Loader`], then call [`Group::get`]. Everything else in
//! this crate exists to make that one call correct under concurrency and,
//! optionally, distributed across peers.
//!
//! ## Modules
//!
//! - [`byte_view`]: immutable, cheaply-cloneable byte snapshots handed back
//!   to callers.
//! - [`lru`]: the bounded, TTL-jittered LRU at the core of the local store.
//! - [`safe_cache`]: a single-mutex concurrency wrapper over [`lru::Lru`].
//! - [`hash_ring`]: consistent hashing with virtual-node replication, used
//!   to route a key to its owning peer.
//! - [`single_flight`]: per-key request coalescing.
//! - [`loader`]: the user-supplied authoritative value producer.
//! - [`peer`]: the `PeerPicker`/`PeerGetter` capability seam; concrete peer
//!   transports (HTTP, etc.) live outside this crate.
//! - [`group`]: [`Group`], the named cache domain composing all of the above.
//! - [`registry`]: a process-wide name -> [`group::Group`] map.
//! - [`config`]: plain configuration structs for the tunable layers.
//! - [`metrics`]: per-group atomic counters.
//! - [`error`]: the crate's error taxonomy.

pub mod byte_view;
pub mod config;
pub mod error;
pub mod group;
pub mod hash_ring;
pub mod loader;
pub mod lru;
pub mod metrics;
pub mod peer;
pub mod registry;
pub mod safe_cache;
pub mod single_flight;

pub use byte_view::ByteView;
pub use config::{ConsistentHashConfig, GroupConfig, LruConfig};
pub use error::{DistCacheError, Result};
pub use group::Group;
pub use hash_ring::ConsistentHashRing;
pub use loader::{FnLoader, Loader};
pub use lru::{CacheValue, Clock, Lru, SystemClock};
pub use metrics::{GroupMetrics, GroupMetricsSnapshot};
pub use peer::{PeerGetter, PeerPicker, PeerRequest, PeerResponse, PeerRouter};
pub use registry::{get_group, new_group};
pub use safe_cache::SafeCache;
pub use single_flight::{Role, SingleFlight};

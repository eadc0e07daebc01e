//! Error taxonomy for the distributed cache core.
//!
//! Two classes of failure exist in this crate:
//!
//! - **Programming errors** (an absent loader, a double [`Group::register_peers`](crate::group::Group::register_peers)
//!   call, a duplicate group name) are never recoverable and are reported by
//!   panicking. Swallowing them would hide a misconfigured embedding
//!   application, which is worse than a loud crash at startup.
//! - **Runtime errors** are represented by [`DistCacheError`] and returned to
//!   callers as `Result::Err`. `PeerFetchFailure` is the one variant the core
//!   itself never hands back to an application: the load pipeline catches it
//!   internally and falls through to the local loader (see §4.5/§7 of the
//!   specification this crate implements).

use thiserror::Error;

/// Errors surfaced by the cache core.
#[derive(Debug, Error, Clone)]
pub enum DistCacheError {
    /// A caller-supplied argument violated a precondition (e.g. an empty key).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The user-supplied [`Loader`](crate::loader::Loader) failed to produce a value.
    #[error("loader failed: {0}")]
    UpstreamLoadFailure(String),

    /// A [`PeerGetter`](crate::peer::PeerGetter) failed to fetch a remote value.
    ///
    /// Never returned from [`Group::get`](crate::group::Group::get) directly —
    /// the load pipeline logs this and falls through to the local loader.
    #[error("peer fetch failed: {0}")]
    PeerFetchFailure(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = core::result::Result<T, DistCacheError>;

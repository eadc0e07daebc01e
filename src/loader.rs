//! The user-supplied value producer consulted on a local cache miss.

use crate::error::DistCacheError;

/// Produces the authoritative bytes for a key when no cache or peer has it.
///
/// Implementations may be slow (a database query, a network call) — the
/// core treats the returned bytes as opaque and takes a defensive copy
/// before caching them. A failed load is propagated to the original caller
/// of [`Group::get`](crate::group::Group::get) verbatim; the core never
/// caches a negative result.
pub trait Loader: Send + Sync {
    /// Loads the value for `key`, or fails with the reason it couldn't.
    fn load(&self, key: &str) -> Result<Vec<u8>, DistCacheError>;
}

/// Lifts a bare closure into a [`Loader`], so callers don't need to define a
/// named type for the common case of a single function.
pub struct FnLoader<F>(F);

impl<F> std::fmt::Debug for FnLoader<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnLoader").finish_non_exhaustive()
    }
}

impl<F> FnLoader<F>
where
    F: Fn(&str) -> Result<Vec<u8>, DistCacheError> + Send + Sync,
{
    /// Wraps `f` as a [`Loader`].
    pub fn new(f: F) -> Self {
        FnLoader(f)
    }
}

impl<F> Loader for FnLoader<F>
where
    F: Fn(&str) -> Result<Vec<u8>, DistCacheError> + Send + Sync,
{
    fn load(&self, key: &str) -> Result<Vec<u8>, DistCacheError> {
        (self.0)(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fn_loader_delegates_to_closure() {
        let loader = FnLoader::new(|key: &str| Ok(key.as_bytes().to_vec()));
        assert_eq!(loader.load("abc").unwrap(), b"abc");
    }

    #[test]
    fn fn_loader_propagates_errors() {
        let loader = FnLoader::new(|_key: &str| {
            Err(DistCacheError::UpstreamLoadFailure("boom".to_string()))
        });
        assert!(loader.load("abc").is_err());
    }
}

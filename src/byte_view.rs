//! Immutable byte snapshots handed back to callers.
//!
//! A [`ByteView`] is the canonical [`CacheValue`](crate::lru::CacheValue) this
//! crate stores: a read-only view over an owned buffer. Callers never get a
//! live reference into the cache's internal storage — every read takes a
//! defensive copy, so a caller mutating the bytes it gets back cannot corrupt
//! another caller's view of the same entry.

use crate::lru::CacheValue;
use std::fmt;
use std::sync::Arc;

/// An immutable, cheaply-cloneable snapshot of a byte sequence.
///
/// Cloning a `ByteView` is a reference-count bump, not a copy — the
/// underlying buffer is shared via `Arc`. Callers that need an owned,
/// independent buffer should use [`ByteView::as_bytes`] or
/// [`ByteView::as_str`], both of which copy.
#[derive(Clone, Eq)]
pub struct ByteView {
    bytes: Arc<[u8]>,
}

impl ByteView {
    /// Builds a view over a defensive copy of `bytes`.
    pub fn new(bytes: &[u8]) -> Self {
        ByteView {
            bytes: Arc::from(bytes),
        }
    }

    /// Takes ownership of `bytes` without copying.
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        ByteView {
            bytes: Arc::from(bytes.into_boxed_slice()),
        }
    }

    /// Number of bytes in the view.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True when the view holds zero bytes.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Returns a defensive copy of the underlying bytes.
    pub fn as_bytes(&self) -> Vec<u8> {
        self.bytes.to_vec()
    }

    /// Returns a defensive copy of the underlying bytes interpreted as UTF-8,
    /// replacing invalid sequences rather than panicking on non-UTF-8
    /// payloads.
    pub fn as_str(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }

    /// Borrows the bytes without copying. Valid only for the lifetime of this view.
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }
}

impl CacheValue for ByteView {
    fn size_in_bytes(&self) -> usize {
        self.bytes.len()
    }
}

impl PartialEq for ByteView {
    fn eq(&self, other: &Self) -> bool {
        self.bytes.as_ref() == other.bytes.as_ref()
    }
}

impl fmt::Debug for ByteView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteView").field("len", &self.len()).finish()
    }
}

impl From<Vec<u8>> for ByteView {
    fn from(bytes: Vec<u8>) -> Self {
        ByteView::from_vec(bytes)
    }
}

impl From<&[u8]> for ByteView {
    fn from(bytes: &[u8]) -> Self {
        ByteView::new(bytes)
    }
}

impl From<String> for ByteView {
    fn from(s: String) -> Self {
        ByteView::from_vec(s.into_bytes())
    }
}

impl From<&str> for ByteView {
    fn from(s: &str) -> Self {
        ByteView::new(s.as_bytes())
    }
}

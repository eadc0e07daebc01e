//! HTTP peer transport for [`distcache`].
//!
//! `distcache`'s core only defines the `PeerPicker`/`PeerGetter` capability
//! seam (see [`distcache::peer`]); it has no opinion on how a peer is
//! actually reached over a network. This crate is one concrete, shippable
//! answer: a plain HTTP GET per fetch, percent-encoded `group`/`key` path
//! segments, and a raw-bytes response body — no protobuf, no custom framing.
//!
//! ```text
//! GET /_distcache/<group>/<key>  ->  200 OK, application/octet-stream, body = raw bytes
//!                                     404 Not Found  (no such group)
//!                                     500            (loader/local error)
//! ```
//!
//! [`HttpPeerPool`] is the entry point on the client side: it builds one
//! [`HttpPeerGetter`] per configured peer address and feeds them into a
//! [`distcache::PeerRouter`], so picking *which* peer owns a key is still the
//! core's consistent-hash ring; this crate only supplies the wire transport.
//! [`server::app`] / [`server::serve`] is the matching server side: an
//! [`axum`] router that answers those same requests out of the process-wide
//! [`distcache::registry`].

pub mod client;
pub mod pool;
pub mod server;

pub use client::HttpPeerGetter;
pub use pool::{HttpPeerPool, DEFAULT_BASE_PATH, DEFAULT_REPLICAS};
pub use server::{app, serve};

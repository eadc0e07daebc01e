//! Server side: answers peer fetches out of the process-wide registry.

use axum::extract::Path;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use std::net::SocketAddr;

/// Builds the router for a `distcache-http` peer server, serving requests
/// under `base_path` as `{base_path}/:group/:key`.
///
/// Looks the group up in [`distcache::registry`] at request time, so groups
/// registered after the server starts are immediately reachable. Returns
/// `404` for an unknown group and `500` for a loader error, mirroring how
/// the reference transport this crate is modeled on maps those same two
/// failure cases to HTTP status codes.
pub fn app(base_path: &str) -> Router {
    Router::new().nest(base_path, Router::new().route("/:group/:key", get(handle_peer_request)))
}

/// Runs a `distcache-http` peer server on `addr` until the process is
/// signaled to stop.
pub async fn serve(addr: SocketAddr, base_path: &str) -> std::io::Result<()> {
    let router = app(base_path);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, %base_path, "distcache-http peer server listening");
    axum::serve(listener, router).await
}

async fn handle_peer_request(Path((group, key)): Path<(String, String)>) -> Response {
    tracing::debug!(%group, %key, "peer request");

    let Some(handle) = distcache::get_group(&group) else {
        return (StatusCode::NOT_FOUND, format!("no such group: {group}")).into_response();
    };

    match handle.get(&key) {
        Ok(view) => (
            [(header::CONTENT_TYPE, "application/octet-stream")],
            view.as_slice().to_vec(),
        )
            .into_response(),
        Err(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response(),
    }
}

//! End-to-end: a real `distcache-http` server answering a real
//! `HttpPeerGetter` over a loopback socket.

use distcache::{new_group, FnLoader, PeerGetter, PeerRequest};
use distcache_http::{app, HttpPeerGetter};

#[tokio::test(flavor = "multi_thread")]
async fn client_fetches_a_key_from_a_live_server() {
    new_group(
        "http-roundtrip-group",
        1024,
        Box::new(FnLoader::new(|key: &str| Ok(format!("served:{key}").into_bytes()))),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app("/_distcache")).await.unwrap();
    });

    let base_url = format!("http://{addr}/_distcache");
    let response = tokio::task::spawn_blocking(move || {
        let getter = HttpPeerGetter::new(base_url);
        getter.get(&PeerRequest {
            group: "http-roundtrip-group".to_string(),
            key: "widget".to_string(),
        })
    })
    .await
    .unwrap()
    .unwrap();

    assert_eq!(response.value, b"served:widget".to_vec());
}

#[tokio::test(flavor = "multi_thread")]
async fn client_surfaces_an_unknown_group_as_a_peer_fetch_failure() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app("/_distcache")).await.unwrap();
    });

    let base_url = format!("http://{addr}/_distcache");
    let result = tokio::task::spawn_blocking(move || {
        let getter = HttpPeerGetter::new(base_url);
        getter.get(&PeerRequest {
            group: "no-such-group-anywhere".to_string(),
            key: "widget".to_string(),
        })
    })
    .await
    .unwrap();

    assert!(result.is_err());
}

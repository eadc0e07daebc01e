//! The client half: fetching one key from one specific peer over HTTP.

use distcache::{DistCacheError, PeerGetter, PeerRequest, PeerResponse};

/// Fetches a key from one peer's `distcache-http` server.
///
/// `base_url` is the peer's address plus its base path, e.g.
/// `http://10.0.0.12:8001/_distcache` — the same string `distcache-http`'s
/// server side was told to serve under.
#[derive(Debug)]
pub struct HttpPeerGetter {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl HttpPeerGetter {
    /// Creates a getter that reaches the peer at `base_url`.
    ///
    /// [`Group::get`](distcache::Group::get) is a synchronous call, so this
    /// uses `reqwest`'s blocking client rather than threading an async
    /// runtime through the core's trait object.
    pub fn new(base_url: impl Into<String>) -> Self {
        HttpPeerGetter {
            base_url: base_url.into(),
            client: reqwest::blocking::Client::new(),
        }
    }
}

fn build_url(base_url: &str, group: &str, key: &str) -> String {
    format!(
        "{}/{}/{}",
        base_url.trim_end_matches('/'),
        urlencoding::encode(group),
        urlencoding::encode(key),
    )
}

impl PeerGetter for HttpPeerGetter {
    fn get(&self, req: &PeerRequest) -> Result<PeerResponse, DistCacheError> {
        let url = build_url(&self.base_url, &req.group, &req.key);

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|err| DistCacheError::PeerFetchFailure(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DistCacheError::PeerFetchFailure(format!(
                "peer {url} returned {status}"
            )));
        }

        let bytes = response
            .bytes()
            .map_err(|err| DistCacheError::PeerFetchFailure(err.to_string()))?;
        Ok(PeerResponse {
            value: bytes.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreachable_host_surfaces_as_peer_fetch_failure() {
        let getter = HttpPeerGetter::new("http://127.0.0.1:1".to_string());
        let err = getter
            .get(&PeerRequest {
                group: "g".to_string(),
                key: "k".to_string(),
            })
            .unwrap_err();
        assert!(matches!(err, DistCacheError::PeerFetchFailure(_)));
    }

    #[test]
    fn url_percent_encodes_group_and_key() {
        assert_eq!(
            build_url("http://10.0.0.1:8001/_distcache", "my group", "a/b"),
            "http://10.0.0.1:8001/_distcache/my%20group/a%2Fb"
        );
    }

    #[test]
    fn url_strips_a_trailing_slash_on_the_base() {
        assert_eq!(
            build_url("http://10.0.0.1:8001/_distcache/", "g", "k"),
            "http://10.0.0.1:8001/_distcache/g/k"
        );
    }
}

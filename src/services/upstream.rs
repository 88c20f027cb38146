use hyper::client::HttpConnector;
use hyper::header::{HeaderValue, ACCEPT};
use hyper::{Body, Client, Method, Request, Uri};
use serde_json::Value;

use crate::errors::ProxyError;

/// Single-attempt GET client for the weather provider.
#[derive(Clone)]
pub struct UpstreamClient {
    client: Client<HttpConnector>,
}

impl Default for UpstreamClient {
    fn default() -> Self {
        Self::new()
    }
}

impl UpstreamClient {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    /// Fetches `url` and decodes the JSON body.
    ///
    /// Failures come back as `Upstream` (non-2xx), `UpstreamUnreachable`
    /// (sent, no usable response) or `ClientFault` (never sent, or an
    /// undecodable body). No retries.
    pub async fn fetch(&self, url: &str) -> Result<Value, ProxyError> {
        let uri: Uri = url.parse().map_err(|e: hyper::http::uri::InvalidUri| {
            ProxyError::ClientFault(format!("invalid upstream uri {}: {}", url, e))
        })?;

        if uri.scheme_str() != Some("http") || uri.host().is_none() {
            return Err(ProxyError::ClientFault(format!("unsupported upstream uri {}", url)));
        }

        let req = Request::builder()
            .method(Method::GET)
            .uri(uri)
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .body(Body::empty())
            .map_err(|e| ProxyError::ClientFault(format!("error building request: {}", e)))?;

        let response = self.client.request(req).await.map_err(|e| {
            if e.is_user() {
                ProxyError::ClientFault(format!("error sending request: {}", e))
            } else {
                ProxyError::UpstreamUnreachable(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProxyError::Upstream(status));
        }

        let body = hyper::body::to_bytes(response.into_body())
            .await
            .map_err(|e| ProxyError::UpstreamUnreachable(format!("error reading response body: {}", e)))?;

        serde_json::from_slice(&body)
            .map_err(|e| ProxyError::ClientFault(format!("error decoding response body: {}", e)))
    }
}

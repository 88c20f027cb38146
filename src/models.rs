use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::Value;
use url::Url;

use crate::config::{Config, DEFAULT_QUERY};
use crate::errors::ProxyError;
use crate::services::{CacheStore, RateLimiter, UpstreamClient};

pub struct CacheEntry {
    pub value: Value,
    pub created_at: Instant,
}

impl CacheEntry {
    pub fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.created_at) >= ttl
    }
}

pub struct RateWindow {
    pub count: u32,
    pub window_start: Instant,
}

impl RateWindow {
    pub fn new(now: Instant) -> Self {
        Self {
            count: 0,
            window_start: now,
        }
    }

    pub fn is_elapsed(&self, now: Instant, window: Duration) -> bool {
        now.saturating_duration_since(self.window_start) >= window
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitStatus {
    WithinLimit,
    Exceeded,
}

impl fmt::Display for RateLimitStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::WithinLimit => write!(f, "within limit"),
            Self::Exceeded => write!(f, "exceeded"),
        }
    }
}

/// Outcome of one limiter check, carried into the response headers.
#[derive(Debug, Clone)]
pub struct RateLimitInfo {
    pub status: RateLimitStatus,
    pub limit: u32,
    pub remaining: u32,
    pub reset_after: Duration,
    pub legacy_headers: bool,
}

/// One inbound `/proxy` exchange, resolved against the upstream endpoint.
#[derive(Debug, Clone)]
pub struct ProxyRequest {
    pub query: String,
    pub upstream_url: String,
    pub client: String,
}

impl ProxyRequest {
    /// Builds the canonical upstream URL from the raw inbound query string.
    /// The URL doubles as the cache key.
    pub fn resolve(
        raw_query: &str,
        client: String,
        upstream_base: &str,
        access_key: &str,
    ) -> Result<Self, ProxyError> {
        let query = url::form_urlencoded::parse(raw_query.as_bytes())
            .find(|(name, _)| name == "query")
            .map(|(_, value)| value.into_owned())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_QUERY.to_string());

        let upstream_url = Url::parse_with_params(
            upstream_base,
            &[("access_key", access_key), ("query", query.as_str())],
        )
        .map_err(|e| ProxyError::ClientFault(format!("invalid upstream url {}: {}", upstream_base, e)))?
        .to_string();

        Ok(Self {
            query,
            upstream_url,
            client,
        })
    }
}

/// Process-scoped state shared by every request. Built once at startup and
/// dropped at process exit.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub cache: Arc<CacheStore>,
    pub rate_limiter: Arc<RateLimiter>,
    pub upstream: UpstreamClient,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            cache: Arc::new(CacheStore::new(config.cache_ttl())),
            rate_limiter: Arc::new(RateLimiter::new(
                config.rate_limit_requests,
                config.rate_limit_window(),
                config.rate_limit_legacy_headers,
            )),
            upstream: UpstreamClient::new(),
            config: Arc::new(config),
        }
    }
}

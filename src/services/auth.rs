use hyper::{HeaderMap, header::AUTHORIZATION};

/// Exact match against the configured `subscription_key <TOKEN>` value.
pub fn is_authenticated(headers: &HeaderMap, expected: &str) -> bool {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .map_or(false, |auth_str| auth_str == expected)
}

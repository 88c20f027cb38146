use std::time::{SystemTime, UNIX_EPOCH};

use hyper::{HeaderMap, header::{HeaderName, HeaderValue, RETRY_AFTER}};

use crate::config::RATE_LIMIT_WINDOW_SECS;
use crate::models::{RateLimitInfo, RateLimitStatus};


/// Seconds until the window resets, rounded up so clients never retry early.
pub fn reset_secs(info: &RateLimitInfo) -> u64 {
    let reset = info.reset_after;
    reset.as_secs() + u64::from(reset.subsec_nanos() > 0)
}

pub fn add_rate_limit_headers(headers: &mut HeaderMap, info: &RateLimitInfo) {
    let reset = reset_secs(info);

    if let Ok(policy) = HeaderValue::from_str(&format!("{};w={}", info.limit, RATE_LIMIT_WINDOW_SECS)) {
        headers.insert(HeaderName::from_static("ratelimit-policy"), policy);
    }
    headers.insert(HeaderName::from_static("ratelimit-limit"), HeaderValue::from(info.limit));
    headers.insert(HeaderName::from_static("ratelimit-remaining"), HeaderValue::from(info.remaining));
    headers.insert(HeaderName::from_static("ratelimit-reset"), HeaderValue::from(reset));

    if info.legacy_headers {
        let reset_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|now| now.as_secs() + reset)
            .unwrap_or(reset);
        headers.insert(HeaderName::from_static("x-ratelimit-limit"), HeaderValue::from(info.limit));
        headers.insert(HeaderName::from_static("x-ratelimit-remaining"), HeaderValue::from(info.remaining));
        headers.insert(HeaderName::from_static("x-ratelimit-reset"), HeaderValue::from(reset_at));
    }

    if info.status == RateLimitStatus::Exceeded {
        headers.insert(RETRY_AFTER, HeaderValue::from(reset));
        headers.insert(
            HeaderName::from_static("ratelimit-status"),
            HeaderValue::from_static("exceeded"),
        );
    }
}

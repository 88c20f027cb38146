use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

use crate::models::{RateLimitInfo, RateLimitStatus, RateWindow};

/// Fixed-window request counter keyed by client identity.
///
/// The write lock is held across the read/increment pair and tokio's lock is
/// fair, so updates for one client land in arrival order.
pub struct RateLimiter {
    windows: RwLock<HashMap<String, RateWindow>>,
    max_requests: u32,
    window: Duration,
    legacy_headers: bool,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration, legacy_headers: bool) -> Self {
        Self {
            windows: RwLock::new(HashMap::new()),
            max_requests,
            window,
            legacy_headers,
        }
    }

    pub async fn check(&self, client: &str) -> RateLimitInfo {
        self.check_at(client, Instant::now()).await
    }

    pub async fn check_at(&self, client: &str, now: Instant) -> RateLimitInfo {
        let mut windows = self.windows.write().await;
        let window = windows
            .entry(client.to_string())
            .or_insert_with(|| RateWindow::new(now));

        if window.is_elapsed(now, self.window) {
            *window = RateWindow::new(now);
        }

        // Rejected requests are not counted, so count never passes the max.
        let status = if window.count >= self.max_requests {
            RateLimitStatus::Exceeded
        } else {
            window.count += 1;
            RateLimitStatus::WithinLimit
        };

        RateLimitInfo {
            status,
            limit: self.max_requests,
            remaining: self.max_requests.saturating_sub(window.count),
            reset_after: self.window.saturating_sub(now.saturating_duration_since(window.window_start)),
            legacy_headers: self.legacy_headers,
        }
    }

    /// Drops windows that have fully elapsed, returning how many were removed.
    pub async fn purge_expired(&self, now: Instant) -> usize {
        let mut windows = self.windows.write().await;
        let before = windows.len();
        windows.retain(|_, window| !window.is_elapsed(now, self.window));
        before - windows.len()
    }

    pub async fn tracked_clients(&self) -> usize {
        self.windows.read().await.len()
    }
}

use std::time::{Duration, Instant};

use tokio::task::JoinHandle;

use crate::models::AppState;

/// Periodically evicts expired cache entries and elapsed rate windows so
/// keys that are never looked up again do not pile up.
pub fn spawn_expiry_sweep(state: AppState, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        // The first tick completes immediately.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            sweep(&state, Instant::now()).await;
        }
    })
}

pub async fn sweep(state: &AppState, now: Instant) -> (usize, usize) {
    let entries = state.cache.purge_expired(now).await;
    let windows = state.rate_limiter.purge_expired(now).await;
    if entries > 0 || windows > 0 {
        tracing::debug!(entries, windows, "purged expired state");
    }
    (entries, windows)
}

use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde_json::Value;
use tokio::sync::RwLock;

use crate::models::CacheEntry;

/// In-memory response cache keyed by upstream URL.
///
/// Entries live for `ttl` from their last `set`. Expired entries are evicted
/// as soon as a lookup observes them, and by [`CacheStore::purge_expired`].
/// There is no capacity bound.
pub struct CacheStore {
    entries: RwLock<HashMap<String, CacheEntry>>,
    ttl: Duration,
}

impl CacheStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub async fn has(&self, key: &str) -> bool {
        self.has_at(key, Instant::now()).await
    }

    pub async fn has_at(&self, key: &str, now: Instant) -> bool {
        let mut entries = self.entries.write().await;
        let expired = match entries.get(key) {
            None => return false,
            Some(entry) => entry.is_expired(now, self.ttl),
        };
        if expired {
            entries.remove(key);
        }
        !expired
    }

    pub async fn get(&self, key: &str) -> Option<Value> {
        self.get_at(key, Instant::now()).await
    }

    pub async fn get_at(&self, key: &str, now: Instant) -> Option<Value> {
        let mut entries = self.entries.write().await;
        if entries.get(key)?.is_expired(now, self.ttl) {
            entries.remove(key);
            return None;
        }
        entries.get(key).map(|entry| entry.value.clone())
    }

    pub async fn set(&self, key: &str, value: Value) {
        self.set_at(key, value, Instant::now()).await
    }

    pub async fn set_at(&self, key: &str, value: Value, now: Instant) {
        let mut entries = self.entries.write().await;
        entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                created_at: now,
            },
        );
    }

    /// Drops every expired entry, returning how many were removed.
    pub async fn purge_expired(&self, now: Instant) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now, self.ttl));
        before - entries.len()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

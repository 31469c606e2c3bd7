//! Time-bounded cache for listings, searches and metadata.

use bridge_traits::time::Clock;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::trace;

use super::key::{CacheKey, CachedPayload};

#[derive(Debug, Clone)]
struct Entry {
    value: CachedPayload,
    stored_at: DateTime<Utc>,
}

/// Key/value store with a single TTL and lazy expiry.
///
/// Entries are checked against the TTL when read; an expired entry is removed
/// at that point and reported as a miss. There is no background sweep.
pub struct TimedCache {
    entries: Mutex<HashMap<CacheKey, Entry>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl TimedCache {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn is_fresh(&self, entry: &Entry, now: DateTime<Utc>) -> bool {
        // A clock that moved backwards counts as age zero
        let age = (now - entry.stored_at).to_std().unwrap_or_default();
        age < self.ttl
    }

    pub async fn get(&self, key: &CacheKey) -> Option<CachedPayload> {
        let now = self.clock.now();
        let mut entries = self.entries.lock().await;

        let entry = entries.get(key)?;
        if self.is_fresh(entry, now) {
            return Some(entry.value.clone());
        }

        trace!(%key, "Timed cache entry expired");
        entries.remove(key);
        None
    }

    /// Insert or overwrite, stamping the entry with the current time.
    pub async fn set(&self, key: CacheKey, value: CachedPayload) {
        let stored_at = self.clock.now();
        self.entries
            .lock()
            .await
            .insert(key, Entry { value, stored_at });
    }

    /// When `key` was stored, without checking freshness.
    pub async fn stored_at(&self, key: &CacheKey) -> Option<DateTime<Utc>> {
        self.entries.lock().await.get(key).map(|e| e.stored_at)
    }

    pub async fn invalidate(&self, key: &CacheKey) -> bool {
        self.entries.lock().await.remove(key).is_some()
    }

    /// Remove every entry matching `predicate`; returns how many were removed.
    pub async fn invalidate_matching<F>(&self, predicate: F) -> usize
    where
        F: Fn(&CacheKey, &CachedPayload) -> bool,
    {
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|key, entry| !predicate(key, &entry.value));
        before - entries.len()
    }

    pub async fn clear(&self) {
        self.entries.lock().await.clear();
    }

    /// Number of stored entries, expired ones included.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::file;
    use bridge_traits::time::ManualClock;

    fn cache(ttl_secs: u64) -> (TimedCache, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::default());
        let cache = TimedCache::new(Duration::from_secs(ttl_secs), clock.clone());
        (cache, clock)
    }

    fn payload(id: &str) -> CachedPayload {
        CachedPayload::Metadata(file(id, "essay.pdf", "root"))
    }

    #[tokio::test]
    async fn test_get_within_ttl_is_idempotent() {
        let (cache, clock) = cache(300);
        let key = CacheKey::metadata("f1");
        cache.set(key.clone(), payload("f1")).await;

        clock.advance(Duration::from_secs(299));
        assert_eq!(cache.get(&key).await, Some(payload("f1")));
        assert_eq!(cache.get(&key).await, Some(payload("f1")));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_expired_entry_is_removed_on_access() {
        let (cache, clock) = cache(300);
        let key = CacheKey::metadata("f1");
        cache.set(key.clone(), payload("f1")).await;

        clock.advance(Duration::from_millis(300_001));
        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.get(&key).await, None);
        assert_eq!(cache.len().await, 0);
        assert_eq!(cache.stored_at(&key).await, None);
    }

    #[tokio::test]
    async fn test_entry_at_exact_ttl_is_stale() {
        let (cache, clock) = cache(10);
        let key = CacheKey::list("root", 100, None);
        cache
            .set(key.clone(), CachedPayload::Page(Default::default()))
            .await;

        clock.advance(Duration::from_secs(10));
        assert!(cache.get(&key).await.is_none());
    }

    #[tokio::test]
    async fn test_set_overwrites_and_restamps() {
        let (cache, clock) = cache(60);
        let key = CacheKey::metadata("f1");
        cache.set(key.clone(), payload("f1")).await;
        let first = cache.stored_at(&key).await.unwrap();

        clock.advance(Duration::from_secs(30));
        cache.set(key.clone(), payload("f1")).await;
        let second = cache.stored_at(&key).await.unwrap();
        assert!(second > first);

        clock.advance(Duration::from_secs(45));
        assert!(cache.get(&key).await.is_some());
    }

    #[tokio::test]
    async fn test_invalidate_and_clear() {
        let (cache, _clock) = cache(60);
        cache.set(CacheKey::metadata("a"), payload("a")).await;
        cache.set(CacheKey::metadata("b"), payload("b")).await;
        cache.set(CacheKey::metadata("c"), payload("c")).await;

        assert!(cache.invalidate(&CacheKey::metadata("a")).await);
        assert!(!cache.invalidate(&CacheKey::metadata("a")).await);

        let removed = cache
            .invalidate_matching(|key, _| key.concerns("b"))
            .await;
        assert_eq!(removed, 1);
        assert_eq!(cache.len().await, 1);

        cache.clear().await;
        assert!(cache.is_empty().await);
    }
}

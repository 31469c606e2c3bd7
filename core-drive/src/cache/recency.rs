//! Bounded LRU cache for metadata-by-id lookups.

use bridge_traits::storage::RemoteFile;
use lru::LruCache;
use std::future::Future;
use std::num::NonZeroUsize;
use tokio::sync::Mutex;
use tracing::trace;

use crate::error::EvictError;

/// Strict LRU map from file id to metadata.
///
/// A read promotes its entry; inserting past capacity drops the least recently
/// used one. The lock is never held while a value is being computed.
pub struct RecencyCache {
    entries: Mutex<LruCache<String, RemoteFile>>,
}

impl RecencyCache {
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub async fn capacity(&self) -> usize {
        self.entries.lock().await.cap().get()
    }

    /// Look up and promote.
    pub async fn get(&self, file_id: &str) -> Option<RemoteFile> {
        self.entries.lock().await.get(file_id).cloned()
    }

    /// Presence check that leaves the recency order untouched.
    pub async fn contains(&self, file_id: &str) -> bool {
        self.entries.lock().await.contains(file_id)
    }

    pub async fn put(&self, file_id: impl Into<String>, file: RemoteFile) {
        let file_id = file_id.into();
        let mut entries = self.entries.lock().await;
        if let Some((evicted, _)) = entries.push(file_id.clone(), file) {
            if evicted != file_id {
                trace!(evicted = %evicted, "Recency cache full, dropped least recent entry");
            }
        }
    }

    /// Return the cached value or compute, store and return a new one.
    ///
    /// A failed computation leaves the cache unchanged.
    pub async fn get_or_compute<F, Fut, E>(&self, file_id: &str, compute: F) -> Result<RemoteFile, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<RemoteFile, E>>,
    {
        if let Some(file) = self.get(file_id).await {
            return Ok(file);
        }

        let file = compute().await?;
        self.put(file_id, file.clone()).await;
        Ok(file)
    }

    pub async fn evict(&self, file_id: &str) -> Option<RemoteFile> {
        self.entries.lock().await.pop(file_id)
    }

    /// Evict `file_id`, reporting whether it was cached.
    pub async fn try_evict(&self, file_id: &str) -> Result<(), EvictError> {
        self.evict(file_id)
            .await
            .map(|_| ())
            .ok_or_else(|| EvictError::NotCached(file_id.to_string()))
    }

    /// Evict every entry matching `predicate`; returns how many were removed.
    pub async fn evict_matching<F>(&self, predicate: F) -> usize
    where
        F: Fn(&str, &RemoteFile) -> bool,
    {
        let mut entries = self.entries.lock().await;
        let doomed: Vec<String> = entries
            .iter()
            .filter(|(id, file)| predicate(id, file))
            .map(|(id, _)| id.clone())
            .collect();

        for id in &doomed {
            entries.pop(id);
        }
        doomed.len()
    }

    pub async fn clear(&self) {
        self.entries.lock().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

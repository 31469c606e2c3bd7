//! # Cache Invalidation
//!
//! Removes stale entries from both caches after a successful mutation.
//!
//! An entry is stale for a scope id when:
//! - its key names the id (metadata for that object, a listing, search or
//!   folder-children entry for that folder), or
//! - its value holds a record for the id or for one of the id's children.
//!
//! Matching is on whole ids. Invalidating `folderA` never touches entries for
//! `folderAB`.

use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;

use crate::cache::{RecencyCache, TimedCache};
use crate::error::EvictError;

pub struct InvalidationCoordinator {
    timed: Arc<TimedCache>,
    recency: Arc<RecencyCache>,
}

impl InvalidationCoordinator {
    pub fn new(timed: Arc<TimedCache>, recency: Arc<RecencyCache>) -> Self {
        Self { timed, recency }
    }

    /// Purge entries concerning `scope`, or everything when `scope` is `None`.
    ///
    /// Returns the number of entries removed across both caches.
    pub async fn invalidate(&self, scope: Option<&str>) -> usize {
        let Some(id) = scope else {
            let removed = self.timed.len().await + self.recency.len().await;
            self.timed.clear().await;
            self.recency.clear().await;
            debug!(removed, "Cleared all drive caches");
            return removed;
        };

        let mut removed = self
            .timed
            .invalidate_matching(|key, value| key.concerns(id) || value.references(id))
            .await;

        match self.recency.try_evict(id).await {
            Ok(()) => removed += 1,
            Err(EvictError::NotCached(_)) => {}
        }

        removed += self
            .recency
            .evict_matching(|_, file| file.has_parent(id))
            .await;

        debug!(scope = id, removed, "Invalidated cache scope");
        removed
    }

    /// Invalidate several scopes, each once.
    pub async fn invalidate_all<'a, I>(&self, scopes: I) -> usize
    where
        I: IntoIterator<Item = &'a str>,
    {
        let scopes: BTreeSet<&str> = scopes.into_iter().collect();
        let mut removed = 0;
        for scope in scopes {
            removed += self.invalidate(Some(scope)).await;
        }
        removed
    }
}

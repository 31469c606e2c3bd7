//! # Drive Façade
//!
//! The public surface of the drive access layer.
//!
//! ## Overview
//!
//! `DriveFacade` sits between application code and a [`RemoteFileClient`]:
//! - Read paths consult the caches first and fall back to the network
//! - Every remote call goes through the [`RetryExecutor`]
//! - Write paths invalidate the affected scopes after a successful mutation
//!
//! No error crosses this boundary. Failures are logged and reported as
//! `None`, `false` or an empty search result.
//!
//! ## Usage
//!
//! ```ignore
//! use core_drive::DriveFacade;
//! use core_runtime::config::DriveConfig;
//! use std::sync::Arc;
//!
//! let drive = DriveFacade::new(Arc::new(client), DriveConfig::default());
//!
//! let page = drive.list("root", 100, None, true).await;
//! let folder = drive.create_folder("Week 3", "root").await;
//! ```

use bridge_traits::storage::{
    FilePage, FileUpdate, ListRequest, NewFile, RemoteFile, RemoteFileClient, UploadTarget,
};
use bridge_traits::time::{Clock, SystemClock};
use core_runtime::config::DriveConfig;
use core_runtime::logging::strip_path;
use futures_util::future::{BoxFuture, FutureExt};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::cache::{CacheKey, CachedPayload, RecencyCache, TimedCache};
use crate::error::{DriveError, Result};
use crate::invalidation::InvalidationCoordinator;
use crate::models::{FolderNode, ProgressCallback};
use crate::query;
use crate::requests::{CreateFile, DeleteFile, GetFile, ListChildren, UpdateFile};
use crate::retry::RetryExecutor;
use crate::transfer;

/// Page size for exact-name lookups; only the first match is used.
const FIND_EXACT_PAGE_SIZE: u32 = 10;

/// Caching, retrying and invalidating access to a remote drive.
pub struct DriveFacade {
    executor: RetryExecutor,
    timed: Arc<TimedCache>,
    recency: Arc<RecencyCache>,
    invalidation: InvalidationCoordinator,
    config: DriveConfig,
}

impl DriveFacade {
    /// Create a façade with fresh caches on the system clock.
    pub fn new(client: Arc<dyn RemoteFileClient>, config: DriveConfig) -> Self {
        Self::with_clock(client, config, Arc::new(SystemClock))
    }

    /// Create a façade with fresh caches reading time from `clock`.
    pub fn with_clock(
        client: Arc<dyn RemoteFileClient>,
        config: DriveConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let timed = Arc::new(TimedCache::new(config.cache_ttl, clock));
        let recency = Arc::new(RecencyCache::new(config.recency_capacity));
        Self::with_caches(client, config, timed, recency)
    }

    /// Create a façade over caller-owned caches.
    pub fn with_caches(
        client: Arc<dyn RemoteFileClient>,
        config: DriveConfig,
        timed: Arc<TimedCache>,
        recency: Arc<RecencyCache>,
    ) -> Self {
        let executor = RetryExecutor::from_config(client, &config);
        let invalidation = InvalidationCoordinator::new(timed.clone(), recency.clone());
        Self {
            executor,
            timed,
            recency,
            invalidation,
            config,
        }
    }

    pub fn config(&self) -> &DriveConfig {
        &self.config
    }

    pub fn timed_cache(&self) -> &Arc<TimedCache> {
        &self.timed
    }

    pub fn recency_cache(&self) -> &Arc<RecencyCache> {
        &self.recency
    }

    /// Log a failure and turn it into the `None` sentinel.
    fn settle<T>(operation: &'static str, result: Result<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(error) => {
                warn!(operation, error = %error, "Drive operation failed");
                None
            }
        }
    }

    // ------------------------------------------------------------------
    // Read paths
    // ------------------------------------------------------------------

    /// List one page of a folder's non-trashed children, folders first.
    ///
    /// Returns `None` on failure, which is distinct from an empty page.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        folder_id: &str,
        page_size: u32,
        page_token: Option<&str>,
        use_cache: bool,
    ) -> Option<FilePage> {
        let key = CacheKey::list(folder_id, page_size, page_token);

        if use_cache {
            if let Some(CachedPayload::Page(page)) = self.timed.get(&key).await {
                debug!(%key, "Cache hit");
                return Some(page);
            }
            debug!(%key, "Cache miss");
        }

        let request = ListRequest::new(query::children_of(folder_id), page_size)
            .page_token(page_token.map(str::to_string))
            .order_by(query::LIST_ORDER);

        let page = Self::settle("list", self.executor.execute(&ListChildren { request }).await)?;
        self.timed.set(key, CachedPayload::Page(page.clone())).await;
        Some(page)
    }

    /// Follow page tokens until the folder is exhausted.
    #[instrument(skip(self))]
    pub async fn list_all(&self, folder_id: &str, use_cache: bool) -> Option<Vec<RemoteFile>> {
        let mut items = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = self
                .list(
                    folder_id,
                    self.config.list_page_size,
                    page_token.as_deref(),
                    use_cache,
                )
                .await?;
            items.extend(page.items);

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        debug!(count = items.len(), "Listed all children");
        Some(items)
    }

    /// Search non-trashed objects by name substring.
    ///
    /// No match and failure both produce an empty list.
    #[instrument(skip(self))]
    pub async fn search(
        &self,
        query_text: &str,
        folder_id: Option<&str>,
        use_cache: bool,
    ) -> Vec<RemoteFile> {
        let key = CacheKey::search(query_text, folder_id);

        if use_cache {
            if let Some(CachedPayload::Search(items)) = self.timed.get(&key).await {
                debug!(%key, "Cache hit");
                return items;
            }
        }

        let request = ListRequest::new(
            query::name_contains(query_text, folder_id),
            self.config.search_page_size,
        );

        match self.executor.execute(&ListChildren { request }).await {
            Ok(page) => {
                self.timed
                    .set(key, CachedPayload::Search(page.items.clone()))
                    .await;
                page.items
            }
            Err(error) => {
                warn!(error = %error, "Search failed");
                Vec::new()
            }
        }
    }

    async fn fetch_metadata(&self, file_id: &str) -> Result<RemoteFile> {
        let file = self.executor.execute(&GetFile::new(file_id)).await?;
        self.timed
            .set(CacheKey::metadata(file_id), CachedPayload::Metadata(file.clone()))
            .await;
        Ok(file)
    }

    /// Metadata for one object: recency cache, then timed cache, then network.
    #[instrument(skip(self))]
    pub async fn get_metadata(&self, file_id: &str, use_cache: bool) -> Option<RemoteFile> {
        if !use_cache {
            let file = Self::settle("get_metadata", self.fetch_metadata(file_id).await)?;
            self.recency.put(file_id, file.clone()).await;
            return Some(file);
        }

        if let Some(file) = self.recency.get(file_id).await {
            debug!("Recency cache hit");
            return Some(file);
        }

        if let Some(CachedPayload::Metadata(file)) =
            self.timed.get(&CacheKey::metadata(file_id)).await
        {
            debug!("Timed cache hit");
            self.recency.put(file_id, file.clone()).await;
            return Some(file);
        }

        let result = self
            .recency
            .get_or_compute(file_id, || self.fetch_metadata(file_id))
            .await;
        Self::settle("get_metadata", result)
    }

    /// The object named exactly `name` (case-sensitive) directly in `parent_id`.
    ///
    /// Never cached.
    #[instrument(skip(self))]
    pub async fn find_exact(&self, name: &str, parent_id: &str) -> Option<RemoteFile> {
        let request = ListRequest::new(query::exact_name_in(name, parent_id), FIND_EXACT_PAGE_SIZE);
        let page = Self::settle("find_exact", self.executor.execute(&ListChildren { request }).await)?;
        page.items.into_iter().find(|file| file.name == name)
    }

    /// Sub-folders of `folder_id`, sorted by name, across all pages.
    async fn folder_children(&self, folder_id: &str) -> Option<Vec<RemoteFile>> {
        let key = CacheKey::folder_children(folder_id);
        if let Some(CachedPayload::Folders(folders)) = self.timed.get(&key).await {
            debug!(%key, "Cache hit");
            return Some(folders);
        }

        let mut folders = Vec::new();
        let mut page_token = None;
        loop {
            let request = ListRequest::new(
                query::folder_children_of(folder_id),
                self.config.list_page_size,
            )
            .page_token(page_token)
            .order_by(query::FOLDER_ORDER);

            let page = Self::settle(
                "folder_children",
                self.executor.execute(&ListChildren { request }).await,
            )?;
            folders.extend(page.items);

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        self.timed
            .set(key, CachedPayload::Folders(folders.clone()))
            .await;
        Some(folders)
    }

    /// Folder hierarchy below `root_id`, `max_depth` levels deep.
    ///
    /// Returns `None` when `max_depth` is zero or the root listing fails.
    pub async fn folder_tree(&self, root_id: &str, max_depth: u32) -> Option<Vec<FolderNode>> {
        self.folder_tree_from(root_id, max_depth, 0).await
    }

    /// Like [`folder_tree`](Self::folder_tree), starting the depth count at `current_depth`.
    ///
    /// Nodes at the depth limit, and nodes whose listing failed, have
    /// `children == None`.
    pub fn folder_tree_from<'a>(
        &'a self,
        folder_id: &'a str,
        max_depth: u32,
        current_depth: u32,
    ) -> BoxFuture<'a, Option<Vec<FolderNode>>> {
        async move {
            if current_depth >= max_depth {
                return None;
            }

            let folders = self.folder_children(folder_id).await?;
            let mut nodes = Vec::with_capacity(folders.len());
            for folder in folders {
                let children = self
                    .folder_tree_from(&folder.id, max_depth, current_depth + 1)
                    .await;
                nodes.push(FolderNode {
                    id: folder.id,
                    name: folder.name,
                    children,
                });
            }
            Some(nodes)
        }
        .boxed()
    }

    /// Stream an object's content into `destination`.
    #[instrument(skip(self, destination, progress))]
    pub async fn download(
        &self,
        file_id: &str,
        destination: &Path,
        progress: Option<ProgressCallback>,
    ) -> bool {
        let total_bytes = self
            .get_metadata(file_id, true)
            .await
            .and_then(|file| file.size)
            .unwrap_or(0);

        info!(
            destination = strip_path(&destination.to_string_lossy()),
            "Downloading file"
        );

        let result = transfer::download_file(
            &self.executor,
            file_id,
            destination,
            self.config.chunk_size,
            total_bytes,
            progress.as_ref(),
        )
        .await;

        match result {
            Ok(bytes) => {
                debug!(bytes, "Download complete");
                true
            }
            Err(error) => {
                warn!(error = %error, "Download failed");
                false
            }
        }
    }

    // ------------------------------------------------------------------
    // Write paths
    // ------------------------------------------------------------------

    /// Fresh, uncached read used to learn an object's current parents.
    async fn current_state(&self, file_id: &str) -> Result<RemoteFile> {
        self.executor.execute(&GetFile::new(file_id)).await
    }

    #[instrument(skip(self))]
    pub async fn create_folder(&self, name: &str, parent_id: &str) -> Option<RemoteFile> {
        info!("Creating folder");

        let request = CreateFile {
            file: NewFile::folder(name, parent_id),
        };
        let folder = Self::settle("create_folder", self.executor.execute(&request).await)?;

        self.invalidation.invalidate(Some(parent_id)).await;
        Some(folder)
    }

    /// Upload a local file into `parent_id`.
    ///
    /// The remote name defaults to the local file name.
    #[instrument(skip(self, local_path, progress))]
    pub async fn upload(
        &self,
        local_path: &Path,
        parent_id: &str,
        display_name: Option<&str>,
        progress: Option<ProgressCallback>,
    ) -> Option<RemoteFile> {
        let name = display_name
            .map(str::to_string)
            .or_else(|| local_path.file_name().map(|n| n.to_string_lossy().into_owned()));
        let Some(name) = name else {
            let error = DriveError::InvalidArgument("upload source has no file name".to_string());
            return Self::settle("upload", Err(error));
        };
        info!(source = strip_path(&local_path.to_string_lossy()), name = %name, "Uploading file");

        let result = transfer::upload_file(
            &self.executor,
            UploadTarget::Create(NewFile::file(name, parent_id)),
            local_path,
            self.config.chunk_size,
            progress.as_ref(),
        )
        .await;
        let file = Self::settle("upload", result)?;

        self.invalidation.invalidate(Some(parent_id)).await;
        Some(file)
    }

    /// Replace an object's content, optionally renaming it in the same session.
    #[instrument(skip(self, local_path))]
    pub async fn update_content(
        &self,
        file_id: &str,
        local_path: &Path,
        new_name: Option<&str>,
    ) -> Option<RemoteFile> {
        info!(source = strip_path(&local_path.to_string_lossy()), "Replacing file content");

        let target = UploadTarget::Replace {
            file_id: file_id.to_string(),
            new_name: new_name.map(str::to_string),
        };
        let result = transfer::upload_file(
            &self.executor,
            target,
            local_path,
            self.config.chunk_size,
            None,
        )
        .await;
        let file = Self::settle("update_content", result)?;

        self.invalidation.invalidate(Some(file_id)).await;
        Some(file)
    }

    /// Move an object under `new_parent_id`, detaching it from its current parents.
    #[instrument(skip(self))]
    pub async fn move_file(&self, file_id: &str, new_parent_id: &str) -> Option<RemoteFile> {
        info!("Moving file");

        let result = async {
            let current = self.current_state(file_id).await?;
            let old_parents: Vec<String> = current
                .parent_ids
                .into_iter()
                .filter(|parent| parent != new_parent_id)
                .collect();

            let request = UpdateFile {
                file_id: file_id.to_string(),
                update: FileUpdate::relocate(new_parent_id, old_parents.clone()),
            };
            let moved = self.executor.execute(&request).await?;
            Ok::<_, DriveError>((moved, old_parents))
        }
        .await;
        let (moved, old_parents) = Self::settle("move_file", result)?;

        let scopes = old_parents
            .iter()
            .map(String::as_str)
            .chain([new_parent_id, file_id]);
        self.invalidation.invalidate_all(scopes).await;
        Some(moved)
    }

    #[instrument(skip(self))]
    pub async fn rename(&self, file_id: &str, new_name: &str) -> Option<RemoteFile> {
        info!("Renaming file");

        let request = UpdateFile {
            file_id: file_id.to_string(),
            update: FileUpdate::rename(new_name),
        };
        let renamed = Self::settle("rename", self.executor.execute(&request).await)?;

        // A rename keeps the parents, and the update response carries them
        let scopes = renamed.parent_ids.iter().map(String::as_str).chain([file_id]);
        self.invalidation.invalidate_all(scopes).await;
        Some(renamed)
    }

    /// Delete an object. Folders are removed recursively by the remote store.
    #[instrument(skip(self))]
    pub async fn delete(&self, file_id: &str) -> bool {
        info!("Deleting file");

        let result = async {
            let current = self.current_state(file_id).await?;
            self.executor
                .execute(&DeleteFile {
                    file_id: file_id.to_string(),
                })
                .await?;
            Ok::<_, DriveError>(current.parent_ids)
        }
        .await;
        let Some(parents) = Self::settle("delete", result) else {
            return false;
        };

        let scopes = parents.iter().map(String::as_str).chain([file_id]);
        self.invalidation.invalidate_all(scopes).await;
        true
    }

    /// Drop every cached entry.
    pub async fn clear_cache(&self) {
        let removed = self.invalidation.invalidate(None).await;
        info!(removed, "Drive caches cleared");
    }
}

//! Cache keys and cached values.

use bridge_traits::storage::{FilePage, RemoteFile};
use std::fmt;

/// Identifies one cached read.
///
/// Two requests with the same parameters produce equal keys. The `Display`
/// form is stable and only used for logging.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Metadata {
        file_id: String,
    },
    List {
        folder_id: String,
        page_size: u32,
        page_token: Option<String>,
    },
    Search {
        text: String,
        folder_id: Option<String>,
    },
    FolderChildren {
        folder_id: String,
    },
}

impl CacheKey {
    pub fn metadata(file_id: impl Into<String>) -> Self {
        CacheKey::Metadata {
            file_id: file_id.into(),
        }
    }

    pub fn list(folder_id: impl Into<String>, page_size: u32, page_token: Option<&str>) -> Self {
        CacheKey::List {
            folder_id: folder_id.into(),
            page_size,
            page_token: page_token.map(str::to_string),
        }
    }

    pub fn search(text: impl Into<String>, folder_id: Option<&str>) -> Self {
        CacheKey::Search {
            text: text.into(),
            folder_id: folder_id.map(str::to_string),
        }
    }

    pub fn folder_children(folder_id: impl Into<String>) -> Self {
        CacheKey::FolderChildren {
            folder_id: folder_id.into(),
        }
    }

    /// The object or folder this entry describes, if any.
    pub fn scope_id(&self) -> Option<&str> {
        match self {
            CacheKey::Metadata { file_id } => Some(file_id),
            CacheKey::List { folder_id, .. } | CacheKey::FolderChildren { folder_id } => {
                Some(folder_id)
            }
            CacheKey::Search { folder_id, .. } => folder_id.as_deref(),
        }
    }

    /// Whether invalidating `id` must drop this entry.
    pub fn concerns(&self, id: &str) -> bool {
        self.scope_id() == Some(id)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::Metadata { file_id } => write!(f, "metadata:{}", file_id),
            CacheKey::List {
                folder_id,
                page_size,
                page_token,
            } => write!(
                f,
                "list:{}:{}:{}",
                folder_id,
                page_size,
                page_token.as_deref().unwrap_or("-")
            ),
            CacheKey::Search { text, folder_id } => write!(
                f,
                "search:{}:{}",
                text,
                folder_id.as_deref().unwrap_or("*")
            ),
            CacheKey::FolderChildren { folder_id } => write!(f, "folders:{}", folder_id),
        }
    }
}

/// A value held by the timed cache.
#[derive(Debug, Clone, PartialEq)]
pub enum CachedPayload {
    Metadata(RemoteFile),
    Page(FilePage),
    Search(Vec<RemoteFile>),
    Folders(Vec<RemoteFile>),
}

impl CachedPayload {
    fn records(&self) -> &[RemoteFile] {
        match self {
            CachedPayload::Metadata(file) => std::slice::from_ref(file),
            CachedPayload::Page(page) => &page.items,
            CachedPayload::Search(items) | CachedPayload::Folders(items) => items,
        }
    }

    /// Whether any record in this value is `id` itself or a child of `id`.
    pub fn references(&self, id: &str) -> bool {
        self.records()
            .iter()
            .any(|record| record.id == id || record.has_parent(id))
    }
}

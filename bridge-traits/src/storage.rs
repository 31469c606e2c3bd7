//! Remote File Storage Abstractions
//!
//! The contract between the drive façade and an authenticated remote file
//! store. The façade never talks HTTP itself; it drives a [`RemoteFileClient`]
//! and treats everything behind it as an opaque, rate-limited service.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// MIME type that marks an object as a folder.
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// Field mask requested for every file resource.
pub const FILE_FIELDS: &str =
    "id,name,mimeType,size,createdTime,modifiedTime,owners(emailAddress,displayName),parents,webViewLink";

/// Whether a remote object is a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileKind {
    File,
    Folder,
}

impl FileKind {
    pub fn from_mime_type(mime_type: &str) -> Self {
        if mime_type == FOLDER_MIME_TYPE {
            FileKind::Folder
        } else {
            FileKind::File
        }
    }
}

/// Copy of a remote object's metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteFile {
    pub id: String,
    pub name: String,
    pub kind: FileKind,
    pub mime_type: Option<String>,
    /// Size in bytes; absent for folders and native documents
    pub size: Option<u64>,
    pub created_at: Option<DateTime<Utc>>,
    pub modified_at: Option<DateTime<Utc>>,
    /// Owner email addresses (display names when no email is exposed)
    pub owners: Vec<String>,
    /// Usually exactly one parent; the root has none
    pub parent_ids: Vec<String>,
    pub view_link: Option<String>,
}

impl RemoteFile {
    pub fn is_folder(&self) -> bool {
        self.kind == FileKind::Folder
    }

    pub fn has_parent(&self, folder_id: &str) -> bool {
        self.parent_ids.iter().any(|parent| parent == folder_id)
    }
}

/// One `files.list` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRequest {
    /// Query in the remote store's search grammar
    pub query: String,
    pub page_size: u32,
    pub page_token: Option<String>,
    /// Field mask applied to each returned file
    pub fields: String,
    pub order_by: Option<String>,
}

impl ListRequest {
    pub fn new(query: impl Into<String>, page_size: u32) -> Self {
        Self {
            query: query.into(),
            page_size,
            page_token: None,
            fields: FILE_FIELDS.to_string(),
            order_by: None,
        }
    }

    pub fn page_token(mut self, token: Option<String>) -> Self {
        self.page_token = token;
        self
    }

    pub fn order_by(mut self, order_by: impl Into<String>) -> Self {
        self.order_by = Some(order_by.into());
        self
    }
}

/// A single page of listing results.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FilePage {
    pub items: Vec<RemoteFile>,
    pub next_page_token: Option<String>,
}

/// Metadata for an object about to be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFile {
    pub name: String,
    pub parent_ids: Vec<String>,
    pub mime_type: Option<String>,
}

impl NewFile {
    pub fn folder(name: impl Into<String>, parent_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent_ids: vec![parent_id.into()],
            mime_type: Some(FOLDER_MIME_TYPE.to_string()),
        }
    }

    pub fn file(name: impl Into<String>, parent_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent_ids: vec![parent_id.into()],
            mime_type: None,
        }
    }
}

/// Metadata-only changes applied by `files.update`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FileUpdate {
    pub name: Option<String>,
    pub add_parents: Vec<String>,
    pub remove_parents: Vec<String>,
}

impl FileUpdate {
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn relocate(add_parent: impl Into<String>, remove_parents: Vec<String>) -> Self {
        Self {
            name: None,
            add_parents: vec![add_parent.into()],
            remove_parents,
        }
    }
}

/// What a resumable upload session writes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadTarget {
    /// Create a new object
    Create(NewFile),
    /// Replace the bytes of an existing object, optionally renaming it
    Replace {
        file_id: String,
        new_name: Option<String>,
    },
}

/// Handle to an open resumable upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSession {
    pub url: String,
}

/// Server answer to one uploaded chunk.
#[derive(Debug, Clone, PartialEq)]
pub enum ChunkOutcome {
    /// More bytes expected; the server has persisted everything before `next_offset`
    Incomplete { next_offset: u64 },
    /// Upload finished
    Complete(RemoteFile),
}

/// Authenticated handle to the remote file store.
///
/// Each method performs exactly one remote call. Implementations must map
/// transport timeouts to [`BridgeError::Timeout`](crate::error::BridgeError::Timeout)
/// and non-success HTTP answers to
/// [`BridgeError::Status`](crate::error::BridgeError::Status) so callers can
/// decide whether a retry is worthwhile.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::{ListRequest, RemoteFileClient};
///
/// async fn first_page(client: &dyn RemoteFileClient) -> Result<usize> {
///     let request = ListRequest::new("'root' in parents and trashed = false", 100);
///     Ok(client.list_children(&request).await?.items.len())
/// }
/// ```
#[async_trait]
pub trait RemoteFileClient: Send + Sync {
    /// List objects matching a query, one page at a time.
    async fn list_children(&self, request: &ListRequest) -> Result<FilePage>;

    /// Fetch metadata for a single object.
    async fn get_file(&self, file_id: &str) -> Result<RemoteFile>;

    /// Create an object without content (folders).
    async fn create_file(&self, file: &NewFile) -> Result<RemoteFile>;

    /// Apply metadata changes (rename, re-parent).
    async fn update_file(&self, file_id: &str, update: &FileUpdate) -> Result<RemoteFile>;

    /// Delete an object. Folders are removed recursively by the store.
    async fn delete_file(&self, file_id: &str) -> Result<()>;

    /// Open a byte stream over an object's content.
    async fn download(&self, file_id: &str)
        -> Result<Box<dyn tokio::io::AsyncRead + Send + Unpin>>;

    /// Open a resumable upload session for `total_bytes` bytes.
    async fn start_upload(&self, target: &UploadTarget, total_bytes: u64) -> Result<UploadSession>;

    /// Send the chunk starting at `offset`.
    async fn upload_chunk(
        &self,
        session: &UploadSession,
        offset: u64,
        chunk: Bytes,
        total_bytes: u64,
    ) -> Result<ChunkOutcome>;
}

//! Google Drive API connector implementation
//!
//! Implements the `RemoteFileClient` trait for Google Drive API v3.

use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result};
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
use bridge_traits::storage::{
    ChunkOutcome, FileKind, FilePage, FileUpdate, ListRequest, NewFile, RemoteFile,
    RemoteFileClient, UploadSession, UploadTarget, FILE_FIELDS,
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::error::GoogleDriveError;
use crate::types::{DriveFile, ErrorEnvelope, FileMetadataBody, FilesListResponse};

/// Google Drive API base URL
const DRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v3";

/// Google Drive media upload base URL
const DRIVE_UPLOAD_BASE: &str = "https://www.googleapis.com/upload/drive/v3";

/// Maximum results per page (Google Drive API limit)
const MAX_PAGE_SIZE: u32 = 1000;

/// Timeout for metadata requests
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for a single upload chunk or download
const MEDIA_TIMEOUT: Duration = Duration::from_secs(120);

/// Status the upload endpoint uses for "chunk stored, send the next one"
const RESUME_INCOMPLETE: u16 = 308;

/// Google Drive API connector
///
/// Implements `RemoteFileClient` for Google Drive API v3. Every method issues
/// exactly one HTTP request; retries, caching and invalidation are layered on
/// top by the drive façade.
///
/// # Example
///
/// ```ignore
/// use provider_google_drive::GoogleDriveClient;
/// use bridge_traits::storage::{ListRequest, RemoteFileClient};
///
/// let client = GoogleDriveClient::new(http_client, access_token);
/// let page = client
///     .list_children(&ListRequest::new("'root' in parents and trashed = false", 100))
///     .await?;
/// ```
pub struct GoogleDriveClient {
    /// HTTP client for API requests
    http_client: Arc<dyn HttpClient>,

    /// OAuth 2.0 access token
    access_token: String,
}

impl GoogleDriveClient {
    /// Create a new Google Drive client
    ///
    /// # Arguments
    ///
    /// * `http_client` - HTTP client implementation
    /// * `access_token` - OAuth 2.0 access token with `drive` scope
    pub fn new(http_client: Arc<dyn HttpClient>, access_token: String) -> Self {
        Self {
            http_client,
            access_token,
        }
    }

    /// Parse RFC 3339 timestamp
    fn parse_timestamp(rfc3339: Option<&str>) -> Option<DateTime<Utc>> {
        rfc3339
            .and_then(|value| DateTime::parse_from_rfc3339(value).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Convert DriveFile to RemoteFile
    fn convert_file(drive_file: DriveFile) -> RemoteFile {
        let owners = drive_file
            .owners
            .into_iter()
            .filter_map(|owner| owner.email_address.or(owner.display_name))
            .collect();

        RemoteFile {
            kind: FileKind::from_mime_type(&drive_file.mime_type),
            created_at: Self::parse_timestamp(drive_file.created_time.as_deref()),
            modified_at: Self::parse_timestamp(drive_file.modified_time.as_deref()),
            size: drive_file.size.and_then(|s| s.parse().ok()),
            id: drive_file.id,
            name: drive_file.name,
            mime_type: Some(drive_file.mime_type),
            owners,
            parent_ids: drive_file.parents,
            view_link: drive_file.web_view_link,
        }
    }

    fn authorized(&self, method: HttpMethod, url: impl Into<String>) -> HttpRequest {
        HttpRequest::new(method, url)
            .bearer_token(self.access_token.as_str())
            .header("Accept", "application/json")
            .timeout(REQUEST_TIMEOUT)
    }

    /// Execute one request and map non-success statuses to typed errors.
    async fn send(&self, request: HttpRequest, file_id: Option<&str>) -> Result<HttpResponse> {
        let response = self.http_client.execute(request).await?;
        Self::check_status(response, file_id)
    }

    fn check_status(response: HttpResponse, file_id: Option<&str>) -> Result<HttpResponse> {
        if response.is_success() {
            debug!("API request succeeded: status={}", response.status);
            return Ok(response);
        }

        let message = serde_json::from_slice::<ErrorEnvelope>(&response.body)
            .map(|envelope| envelope.error.message)
            .unwrap_or_else(|_| String::from_utf8_lossy(&response.body).to_string());

        let error = match (response.status, file_id) {
            (401, _) => GoogleDriveError::AuthenticationFailed(message),
            (404, Some(id)) => GoogleDriveError::FileNotFound {
                file_id: id.to_string(),
            },
            (status, _) => GoogleDriveError::ApiError {
                status_code: status,
                message,
            },
        };
        Err(error.into())
    }

    fn parse_file(response: &HttpResponse) -> Result<RemoteFile> {
        let drive_file: DriveFile = serde_json::from_slice(&response.body).map_err(|e| {
            GoogleDriveError::ParseError(format!("Failed to parse file resource: {}", e))
        })?;
        Ok(Self::convert_file(drive_file))
    }

    fn file_url(file_id: &str) -> String {
        format!(
            "{}/files/{}?fields={}",
            DRIVE_API_BASE,
            urlencoding::encode(file_id),
            urlencoding::encode(FILE_FIELDS)
        )
    }

    /// Parse the `Range: bytes=0-N` header of a 308 answer into the next offset.
    fn next_offset(response: &HttpResponse) -> u64 {
        response
            .header("Range")
            .and_then(|range| range.rsplit('-').next())
            .and_then(|last| last.trim().parse::<u64>().ok())
            .map(|last| last + 1)
            .unwrap_or(0)
    }

    fn content_range(offset: u64, len: usize, total_bytes: u64) -> String {
        if len == 0 {
            format!("bytes */{}", total_bytes)
        } else {
            format!("bytes {}-{}/{}", offset, offset + len as u64 - 1, total_bytes)
        }
    }
}

#[async_trait]
impl RemoteFileClient for GoogleDriveClient {
    #[instrument(skip(self, request), fields(page_size = request.page_size))]
    async fn list_children(&self, request: &ListRequest) -> Result<FilePage> {
        let mut url = format!(
            "{}/files?q={}&pageSize={}&fields={}",
            DRIVE_API_BASE,
            urlencoding::encode(&request.query),
            request.page_size.min(MAX_PAGE_SIZE),
            urlencoding::encode(&format!("nextPageToken,files({})", request.fields))
        );

        if let Some(order_by) = &request.order_by {
            url.push_str(&format!("&orderBy={}", urlencoding::encode(order_by)));
        }

        if let Some(page_token) = &request.page_token {
            url.push_str(&format!("&pageToken={}", urlencoding::encode(page_token)));
        }

        let response = self.send(self.authorized(HttpMethod::Get, url), None).await?;

        let list_response: FilesListResponse =
            serde_json::from_slice(&response.body).map_err(|e| {
                GoogleDriveError::ParseError(format!("Failed to parse files list response: {}", e))
            })?;

        if list_response.incomplete_search {
            warn!("Drive reported an incomplete search; results may be partial");
        }

        let items: Vec<RemoteFile> = list_response
            .files
            .into_iter()
            .map(Self::convert_file)
            .collect();

        debug!("Listed {} files from Google Drive", items.len());

        Ok(FilePage {
            items,
            next_page_token: list_response.next_page_token,
        })
    }

    #[instrument(skip(self))]
    async fn get_file(&self, file_id: &str) -> Result<RemoteFile> {
        let request = self.authorized(HttpMethod::Get, Self::file_url(file_id));
        let response = self.send(request, Some(file_id)).await?;
        Self::parse_file(&response)
    }

    #[instrument(skip(self, file), fields(name = %file.name))]
    async fn create_file(&self, file: &NewFile) -> Result<RemoteFile> {
        info!("Creating object in Google Drive");

        let url = format!(
            "{}/files?fields={}",
            DRIVE_API_BASE,
            urlencoding::encode(FILE_FIELDS)
        );
        let body = FileMetadataBody {
            name: Some(file.name.clone()),
            mime_type: file.mime_type.clone(),
            parents: file.parent_ids.clone(),
        };

        let request = self.authorized(HttpMethod::Post, url).json(&body)?;
        let response = self.send(request, None).await?;
        Self::parse_file(&response)
    }

    #[instrument(skip(self, update))]
    async fn update_file(&self, file_id: &str, update: &FileUpdate) -> Result<RemoteFile> {
        let mut url = Self::file_url(file_id);
        if !update.add_parents.is_empty() {
            url.push_str(&format!(
                "&addParents={}",
                urlencoding::encode(&update.add_parents.join(","))
            ));
        }
        if !update.remove_parents.is_empty() {
            url.push_str(&format!(
                "&removeParents={}",
                urlencoding::encode(&update.remove_parents.join(","))
            ));
        }

        let body = FileMetadataBody {
            name: update.name.clone(),
            ..FileMetadataBody::default()
        };

        let request = self.authorized(HttpMethod::Patch, url).json(&body)?;
        let response = self.send(request, Some(file_id)).await?;
        Self::parse_file(&response)
    }

    #[instrument(skip(self))]
    async fn delete_file(&self, file_id: &str) -> Result<()> {
        info!("Deleting object from Google Drive");

        let url = format!("{}/files/{}", DRIVE_API_BASE, urlencoding::encode(file_id));
        self.send(self.authorized(HttpMethod::Delete, url), Some(file_id))
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn download(
        &self,
        file_id: &str,
    ) -> Result<Box<dyn tokio::io::AsyncRead + Send + Unpin>> {
        let url = format!(
            "{}/files/{}?alt=media",
            DRIVE_API_BASE,
            urlencoding::encode(file_id)
        );
        let request = HttpRequest::new(HttpMethod::Get, url)
            .bearer_token(self.access_token.as_str())
            .timeout(MEDIA_TIMEOUT);

        self.http_client.download_stream(request).await
    }

    #[instrument(skip(self, target))]
    async fn start_upload(&self, target: &UploadTarget, total_bytes: u64) -> Result<UploadSession> {
        let fields = urlencoding::encode(FILE_FIELDS);
        let (method, url, body) = match target {
            UploadTarget::Create(file) => (
                HttpMethod::Post,
                format!(
                    "{}/files?uploadType=resumable&fields={}",
                    DRIVE_UPLOAD_BASE, fields
                ),
                FileMetadataBody {
                    name: Some(file.name.clone()),
                    mime_type: file.mime_type.clone(),
                    parents: file.parent_ids.clone(),
                },
            ),
            UploadTarget::Replace { file_id, new_name } => (
                HttpMethod::Patch,
                format!(
                    "{}/files/{}?uploadType=resumable&fields={}",
                    DRIVE_UPLOAD_BASE,
                    urlencoding::encode(file_id),
                    fields
                ),
                FileMetadataBody {
                    name: new_name.clone(),
                    ..FileMetadataBody::default()
                },
            ),
        };

        let request = self
            .authorized(method, url)
            .header("X-Upload-Content-Length", total_bytes.to_string())
            .json(&body)?;

        let file_id = match target {
            UploadTarget::Replace { file_id, .. } => Some(file_id.as_str()),
            UploadTarget::Create(_) => None,
        };
        let response = self.send(request, file_id).await?;

        let location = response.header("Location").ok_or_else(|| {
            BridgeError::from(GoogleDriveError::UploadSession(
                "Session response carried no Location header".to_string(),
            ))
        })?;

        debug!("Opened resumable upload session for {} bytes", total_bytes);

        Ok(UploadSession {
            url: location.to_string(),
        })
    }

    #[instrument(skip(self, session, chunk), fields(len = chunk.len()))]
    async fn upload_chunk(
        &self,
        session: &UploadSession,
        offset: u64,
        chunk: Bytes,
        total_bytes: u64,
    ) -> Result<ChunkOutcome> {
        let request = HttpRequest::new(HttpMethod::Put, session.url.clone())
            .bearer_token(self.access_token.as_str())
            .header(
                "Content-Range",
                Self::content_range(offset, chunk.len(), total_bytes),
            )
            .timeout(MEDIA_TIMEOUT)
            .body(chunk);

        let response = self.http_client.execute(request).await?;

        if response.status == RESUME_INCOMPLETE {
            let next_offset = Self::next_offset(&response);
            debug!("Chunk accepted, server has {} bytes", next_offset);
            return Ok(ChunkOutcome::Incomplete { next_offset });
        }

        let response = Self::check_status(response, None)?;
        Ok(ChunkOutcome::Complete(Self::parse_file(&response)?))
    }
}

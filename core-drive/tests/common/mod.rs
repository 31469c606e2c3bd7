#![allow(dead_code)]

use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result};
use bridge_traits::storage::{
    ChunkOutcome, FileKind, FilePage, FileUpdate, ListRequest, NewFile, RemoteFile,
    RemoteFileClient, UploadSession, UploadTarget, FOLDER_MIME_TYPE,
};
use bridge_traits::time::ManualClock;
use bytes::Bytes;
use core_drive::DriveFacade;
use core_runtime::config::DriveConfig;
use mockall::mock;
use std::sync::Arc;
use std::time::Duration;

mock! {
    pub Drive {}

    #[async_trait]
    impl RemoteFileClient for Drive {
        async fn list_children(&self, request: &ListRequest) -> Result<FilePage>;
        async fn get_file(&self, file_id: &str) -> Result<RemoteFile>;
        async fn create_file(&self, file: &NewFile) -> Result<RemoteFile>;
        async fn update_file(&self, file_id: &str, update: &FileUpdate) -> Result<RemoteFile>;
        async fn delete_file(&self, file_id: &str) -> Result<()>;
        async fn download(&self, file_id: &str) -> Result<Box<dyn tokio::io::AsyncRead + Send + Unpin>>;
        async fn start_upload(&self, target: &UploadTarget, total_bytes: u64) -> Result<UploadSession>;
        async fn upload_chunk(
            &self,
            session: &UploadSession,
            offset: u64,
            chunk: Bytes,
            total_bytes: u64,
        ) -> Result<ChunkOutcome>;
    }
}

pub fn file(id: &str, name: &str, parent: &str) -> RemoteFile {
    RemoteFile {
        id: id.to_string(),
        name: name.to_string(),
        kind: FileKind::File,
        mime_type: Some("application/pdf".to_string()),
        size: Some(11),
        created_at: None,
        modified_at: None,
        owners: vec!["teacher@school.edu".to_string()],
        parent_ids: vec![parent.to_string()],
        view_link: None,
    }
}

pub fn folder(id: &str, name: &str, parent: &str) -> RemoteFile {
    RemoteFile {
        kind: FileKind::Folder,
        mime_type: Some(FOLDER_MIME_TYPE.to_string()),
        size: None,
        ..file(id, name, parent)
    }
}

pub fn page(items: Vec<RemoteFile>, next: Option<&str>) -> FilePage {
    FilePage {
        items,
        next_page_token: next.map(str::to_string),
    }
}

pub fn status(code: u16) -> BridgeError {
    BridgeError::Status {
        status: code,
        message: format!("status {code}"),
    }
}

/// Façade with no backoff delay and a manual clock.
pub fn facade(client: MockDrive) -> (DriveFacade, Arc<ManualClock>) {
    let config = DriveConfig::builder()
        .base_retry_delay(Duration::ZERO)
        .build()
        .unwrap();
    facade_with(client, config)
}

pub fn facade_with(client: MockDrive, config: DriveConfig) -> (DriveFacade, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::default());
    let drive = DriveFacade::with_clock(Arc::new(client), config, clock.clone());
    (drive, clock)
}

/// Whether a listing request targets the children of `folder_id`.
pub fn lists(request: &ListRequest, folder_id: &str) -> bool {
    request
        .query
        .starts_with(&format!("'{}' in parents", folder_id))
}

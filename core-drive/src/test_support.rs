//! Shared fixtures for unit tests.

use async_trait::async_trait;
use bridge_traits::error::Result;
use bridge_traits::storage::{
    ChunkOutcome, FileKind, FilePage, FileUpdate, ListRequest, NewFile, RemoteFile,
    RemoteFileClient, UploadSession, UploadTarget, FOLDER_MIME_TYPE,
};
use bytes::Bytes;
use mockall::mock;

mock! {
    pub RemoteFileClient {}

    #[async_trait]
    impl RemoteFileClient for RemoteFileClient {
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
        size: Some(1024),
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

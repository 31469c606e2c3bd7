//! Request descriptors replayed by the [`RetryExecutor`](crate::retry::RetryExecutor).
//!
//! Each descriptor owns the parameters of exactly one `RemoteFileClient` call.

use async_trait::async_trait;
use bridge_traits::error::Result;
use bridge_traits::storage::{
    ChunkOutcome, FilePage, FileUpdate, ListRequest, NewFile, RemoteFile, RemoteFileClient,
    UploadSession, UploadTarget,
};
use bytes::Bytes;

use crate::retry::RemoteCall;

pub type ByteStream = Box<dyn tokio::io::AsyncRead + Send + Unpin>;

#[derive(Debug, Clone)]
pub struct ListChildren {
    pub request: ListRequest,
}

#[async_trait]
impl RemoteCall for ListChildren {
    type Output = FilePage;

    fn name(&self) -> &'static str {
        "list_children"
    }

    async fn call(&self, client: &dyn RemoteFileClient) -> Result<FilePage> {
        client.list_children(&self.request).await
    }
}

#[derive(Debug, Clone)]
pub struct GetFile {
    pub file_id: String,
}

impl GetFile {
    pub fn new(file_id: impl Into<String>) -> Self {
        Self {
            file_id: file_id.into(),
        }
    }
}

#[async_trait]
impl RemoteCall for GetFile {
    type Output = RemoteFile;

    fn name(&self) -> &'static str {
        "get_file"
    }

    async fn call(&self, client: &dyn RemoteFileClient) -> Result<RemoteFile> {
        client.get_file(&self.file_id).await
    }
}

#[derive(Debug, Clone)]
pub struct CreateFile {
    pub file: NewFile,
}

#[async_trait]
impl RemoteCall for CreateFile {
    type Output = RemoteFile;

    fn name(&self) -> &'static str {
        "create_file"
    }

    async fn call(&self, client: &dyn RemoteFileClient) -> Result<RemoteFile> {
        client.create_file(&self.file).await
    }
}

#[derive(Debug, Clone)]
pub struct UpdateFile {
    pub file_id: String,
    pub update: FileUpdate,
}

#[async_trait]
impl RemoteCall for UpdateFile {
    type Output = RemoteFile;

    fn name(&self) -> &'static str {
        "update_file"
    }

    async fn call(&self, client: &dyn RemoteFileClient) -> Result<RemoteFile> {
        client.update_file(&self.file_id, &self.update).await
    }
}

#[derive(Debug, Clone)]
pub struct DeleteFile {
    pub file_id: String,
}

#[async_trait]
impl RemoteCall for DeleteFile {
    type Output = ();

    fn name(&self) -> &'static str {
        "delete_file"
    }

    async fn call(&self, client: &dyn RemoteFileClient) -> Result<()> {
        client.delete_file(&self.file_id).await
    }
}

#[derive(Debug, Clone)]
pub struct OpenDownload {
    pub file_id: String,
}

#[async_trait]
impl RemoteCall for OpenDownload {
    type Output = ByteStream;

    fn name(&self) -> &'static str {
        "download"
    }

    async fn call(&self, client: &dyn RemoteFileClient) -> Result<ByteStream> {
        client.download(&self.file_id).await
    }
}

#[derive(Debug, Clone)]
pub struct StartUpload {
    pub target: UploadTarget,
    pub total_bytes: u64,
}

#[async_trait]
impl RemoteCall for StartUpload {
    type Output = UploadSession;

    fn name(&self) -> &'static str {
        "start_upload"
    }

    async fn call(&self, client: &dyn RemoteFileClient) -> Result<UploadSession> {
        client.start_upload(&self.target, self.total_bytes).await
    }
}

/// One chunk of a resumable upload. Cloning the payload is a refcount bump.
#[derive(Debug, Clone)]
pub struct UploadChunk {
    pub session: UploadSession,
    pub offset: u64,
    pub chunk: Bytes,
    pub total_bytes: u64,
}

#[async_trait]
impl RemoteCall for UploadChunk {
    type Output = ChunkOutcome;

    fn name(&self) -> &'static str {
        "upload_chunk"
    }

    async fn call(&self, client: &dyn RemoteFileClient) -> Result<ChunkOutcome> {
        client
            .upload_chunk(&self.session, self.offset, self.chunk.clone(), self.total_bytes)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{file, MockRemoteFileClient};

    #[tokio::test]
    async fn test_descriptors_forward_parameters() {
        let mut client = MockRemoteFileClient::new();
        client
            .expect_get_file()
            .withf(|id| id == "f1")
            .times(2)
            .returning(|id| Ok(file(id, "essay.pdf", "root")));
        client
            .expect_update_file()
            .withf(|id, update| id == "f1" && update.name.as_deref() == Some("final.pdf"))
            .times(1)
            .returning(|id, _| Ok(file(id, "final.pdf", "root")));

        let get = GetFile::new("f1");
        assert_eq!(get.name(), "get_file");
        assert_eq!(get.call(&client).await.unwrap().id, "f1");
        assert_eq!(get.call(&client).await.unwrap().id, "f1");

        let update = UpdateFile {
            file_id: "f1".to_string(),
            update: FileUpdate::rename("final.pdf"),
        };
        assert_eq!(update.call(&client).await.unwrap().name, "final.pdf");
    }

    #[tokio::test]
    async fn test_chunk_descriptor_is_replayable() {
        let mut client = MockRemoteFileClient::new();
        client
            .expect_upload_chunk()
            .withf(|session, offset, chunk, total| {
                session.url == "s" && *offset == 4 && chunk.as_ref() == b"ef" && *total == 6
            })
            .times(2)
            .returning(|_, _, _, _| Ok(ChunkOutcome::Incomplete { next_offset: 6 }));

        let chunk = UploadChunk {
            session: UploadSession { url: "s".into() },
            offset: 4,
            chunk: Bytes::from_static(b"ef"),
            total_bytes: 6,
        };
        for _ in 0..2 {
            assert_eq!(
                chunk.call(&client).await.unwrap(),
                ChunkOutcome::Incomplete { next_offset: 6 }
            );
        }
    }
}

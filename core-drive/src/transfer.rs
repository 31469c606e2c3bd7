//! Chunked uploads and downloads.
//!
//! Uploads use the resumable protocol: one session request followed by
//! sequential chunks, each replayed through the retry executor on its own.
//! Downloads stream the media body into a temporary file next to the
//! destination, which replaces the destination only once the body is complete.

use bridge_traits::error::BridgeError;
use bridge_traits::storage::{ChunkOutcome, RemoteFile, UploadTarget};
use bytes::Bytes;
use core_runtime::logging::{redact_if_sensitive, strip_path};
use std::io::SeekFrom;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tracing::{debug, warn};

use crate::error::{DriveError, Result};
use crate::models::ProgressCallback;
use crate::requests::{OpenDownload, StartUpload, UploadChunk};
use crate::retry::RetryExecutor;

fn local_io(path: &Path, source: std::io::Error) -> DriveError {
    DriveError::LocalIo {
        path: strip_path(&path.to_string_lossy()).to_string(),
        source,
    }
}

async fn read_chunk(file: &mut File, path: &Path, offset: u64, chunk_size: usize) -> Result<Bytes> {
    file.seek(SeekFrom::Start(offset))
        .await
        .map_err(|e| local_io(path, e))?;

    let mut buffer = Vec::with_capacity(chunk_size);
    (&mut *file)
        .take(chunk_size as u64)
        .read_to_end(&mut buffer)
        .await
        .map_err(|e| local_io(path, e))?;
    Ok(Bytes::from(buffer))
}

/// Upload `source` through a resumable session and return the final resource.
pub async fn upload_file(
    executor: &RetryExecutor,
    target: UploadTarget,
    source: &Path,
    chunk_size: usize,
    progress: Option<&ProgressCallback>,
) -> Result<RemoteFile> {
    let mut file = File::open(source).await.map_err(|e| local_io(source, e))?;
    let total_bytes = file
        .metadata()
        .await
        .map_err(|e| local_io(source, e))?
        .len();

    let session = executor
        .execute(&StartUpload {
            target,
            total_bytes,
        })
        .await?;
    debug!(
        session = %redact_if_sensitive("upload_session", &session.url),
        total_bytes,
        "Upload session started"
    );

    let mut offset = 0u64;
    let mut restarted = false;
    loop {
        let chunk = read_chunk(&mut file, source, offset, chunk_size).await?;
        if chunk.is_empty() && total_bytes > 0 {
            return Err(DriveError::Transfer(format!(
                "server still expects data after all {} bytes were sent",
                total_bytes
            )));
        }

        let outcome = executor
            .execute(&UploadChunk {
                session: session.clone(),
                offset,
                chunk,
                total_bytes,
            })
            .await?;

        match outcome {
            ChunkOutcome::Complete(remote) => {
                if let Some(progress) = progress {
                    progress(total_bytes, total_bytes);
                }
                debug!(bytes = total_bytes, "Upload complete");
                return Ok(remote);
            }
            ChunkOutcome::Incomplete { next_offset: 0 } if !restarted => {
                // Nothing persisted yet; the session accepts one resend from the start
                warn!(offset, "Upload session kept no bytes, resending from start");
                restarted = true;
                offset = 0;
            }
            ChunkOutcome::Incomplete { next_offset } => {
                if next_offset <= offset || next_offset > total_bytes {
                    return Err(DriveError::Transfer(format!(
                        "upload stalled at offset {} (server reported {})",
                        offset, next_offset
                    )));
                }
                offset = next_offset;
                if let Some(progress) = progress {
                    progress(offset, total_bytes);
                }
            }
        }
    }
}

async fn stream_to_file(
    reader: &mut (dyn tokio::io::AsyncRead + Send + Unpin),
    file: &mut File,
    destination: &Path,
    chunk_size: usize,
    total_bytes: u64,
    progress: Option<&ProgressCallback>,
) -> Result<u64> {
    let mut buffer = vec![0u8; chunk_size];
    let mut written = 0u64;
    loop {
        let read = reader
            .read(&mut buffer)
            .await
            .map_err(|e| DriveError::Remote(BridgeError::Io(e)))?;
        if read == 0 {
            break;
        }

        file.write_all(&buffer[..read])
            .await
            .map_err(|e| local_io(destination, e))?;
        written += read as u64;

        if let Some(progress) = progress {
            progress(written, total_bytes);
        }
    }

    file.flush().await.map_err(|e| local_io(destination, e))?;
    Ok(written)
}

/// Stream the content of `file_id` into `destination`.
///
/// Bytes land in a temporary file in the destination's directory. It is
/// renamed over `destination` on success and removed on failure, so an
/// existing file at `destination` is only replaced by a complete download.
pub async fn download_file(
    executor: &RetryExecutor,
    file_id: &str,
    destination: &Path,
    chunk_size: usize,
    total_bytes: u64,
    progress: Option<&ProgressCallback>,
) -> Result<u64> {
    let mut reader = executor
        .execute(&OpenDownload {
            file_id: file_id.to_string(),
        })
        .await?;

    let directory = match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let (partial, partial_path) = tempfile::NamedTempFile::new_in(directory)
        .map_err(|e| local_io(destination, e))?
        .into_parts();
    let mut partial = File::from_std(partial);

    let written = match stream_to_file(
        reader.as_mut(),
        &mut partial,
        destination,
        chunk_size,
        total_bytes,
        progress,
    )
    .await
    {
        Ok(written) => written,
        Err(e) => {
            drop(partial);
            if let Err(cleanup) = partial_path.close() {
                warn!(error = %cleanup, "Could not remove partial download");
            }
            return Err(e);
        }
    };

    drop(partial);
    partial_path
        .persist(destination)
        .map_err(|e| local_io(destination, e.error))?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{file, MockRemoteFileClient};
    use bridge_traits::storage::{NewFile, UploadSession};
    use std::io::Write;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    fn executor(client: MockRemoteFileClient) -> RetryExecutor {
        RetryExecutor::new(Arc::new(client), 3, Duration::from_millis(10))
    }

    fn recorder() -> (ProgressCallback, Arc<Mutex<Vec<(u64, u64)>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let callback: ProgressCallback = Arc::new(move |done, total| {
            sink.lock().unwrap().push((done, total));
        });
        (callback, seen)
    }

    #[tokio::test]
    async fn test_upload_sends_sequential_chunks() {
        let mut source = tempfile::NamedTempFile::new().unwrap();
        source.write_all(b"0123456789").unwrap();

        let mut client = MockRemoteFileClient::new();
        client
            .expect_start_upload()
            .withf(|_, total| *total == 10)
            .times(1)
            .returning(|_, _| {
                Ok(UploadSession {
                    url: "session".into(),
                })
            });
        client
            .expect_upload_chunk()
            .times(3)
            .returning(|_, offset, chunk, total| {
                let next = offset + chunk.len() as u64;
                if next == total {
                    Ok(ChunkOutcome::Complete(file("new", "digits.txt", "root")))
                } else {
                    Ok(ChunkOutcome::Incomplete { next_offset: next })
                }
            });

        let (progress, seen) = recorder();
        let uploaded = upload_file(
            &executor(client),
            UploadTarget::Create(NewFile::file("digits.txt", "root")),
            source.path(),
            4,
            Some(&progress),
        )
        .await
        .unwrap();

        assert_eq!(uploaded.id, "new");
        assert_eq!(*seen.lock().unwrap(), vec![(4, 10), (8, 10), (10, 10)]);
    }

    #[tokio::test]
    async fn test_upload_resends_from_server_offset() {
        let mut source = tempfile::NamedTempFile::new().unwrap();
        source.write_all(b"abcdef").unwrap();

        let sent = Arc::new(Mutex::new(Vec::new()));
        let log = sent.clone();

        let mut client = MockRemoteFileClient::new();
        client
            .expect_start_upload()
            .returning(|_, _| Ok(UploadSession { url: "s".into() }));
        client
            .expect_upload_chunk()
            .times(2)
            .returning(move |_, offset, chunk, _| {
                log.lock().unwrap().push((offset, chunk.to_vec()));
                if offset == 0 {
                    // Server only persisted two bytes
                    Ok(ChunkOutcome::Incomplete { next_offset: 2 })
                } else {
                    Ok(ChunkOutcome::Complete(file("new", "letters.txt", "root")))
                }
            });

        upload_file(
            &executor(client),
            UploadTarget::Create(NewFile::file("letters.txt", "root")),
            source.path(),
            1024 * 256,
            None,
        )
        .await
        .unwrap();

        let sent = sent.lock().unwrap();
        assert_eq!(sent[1], (2, b"cdef".to_vec()));
    }

    #[tokio::test]
    async fn test_upload_empty_file_sends_one_empty_chunk() {
        let source = tempfile::NamedTempFile::new().unwrap();

        let mut client = MockRemoteFileClient::new();
        client
            .expect_start_upload()
            .returning(|_, _| Ok(UploadSession { url: "s".into() }));
        client
            .expect_upload_chunk()
            .withf(|_, offset, chunk, total| *offset == 0 && chunk.is_empty() && *total == 0)
            .times(1)
            .returning(|_, _, _, _| Ok(ChunkOutcome::Complete(file("e", "empty.txt", "root"))));

        let uploaded = upload_file(
            &executor(client),
            UploadTarget::Create(NewFile::file("empty.txt", "root")),
            source.path(),
            4,
            None,
        )
        .await
        .unwrap();
        assert_eq!(uploaded.id, "e");
    }

    #[tokio::test]
    async fn test_upload_missing_source_is_local_error() {
        let client = MockRemoteFileClient::new();
        let err = upload_file(
            &executor(client),
            UploadTarget::Create(NewFile::file("ghost.txt", "root")),
            Path::new("/definitely/not/here/ghost.txt"),
            4,
            None,
        )
        .await
        .unwrap_err();

        match err {
            DriveError::LocalIo { path, .. } => assert_eq!(path, "ghost.txt"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_upload_stalled_session_fails() {
        let mut source = tempfile::NamedTempFile::new().unwrap();
        source.write_all(b"abcdef").unwrap();

        let mut client = MockRemoteFileClient::new();
        client
            .expect_start_upload()
            .returning(|_, _| Ok(UploadSession { url: "s".into() }));
        client
            .expect_upload_chunk()
            .times(2)
            .returning(|_, _, _, _| Ok(ChunkOutcome::Incomplete { next_offset: 0 }));

        let err = upload_file(
            &executor(client),
            UploadTarget::Create(NewFile::file("letters.txt", "root")),
            source.path(),
            4,
            None,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, DriveError::Transfer(_)));
    }

    #[tokio::test]
    async fn test_upload_resends_once_when_server_kept_nothing() {
        let mut source = tempfile::NamedTempFile::new().unwrap();
        source.write_all(b"abcdef").unwrap();

        let sent = Arc::new(Mutex::new(Vec::new()));
        let log = sent.clone();

        let mut client = MockRemoteFileClient::new();
        client
            .expect_start_upload()
            .returning(|_, _| Ok(UploadSession { url: "s".into() }));
        client
            .expect_upload_chunk()
            .times(3)
            .returning(move |_, offset, chunk, total| {
                let mut log = log.lock().unwrap();
                log.push(offset);
                if log.len() == 1 {
                    // 308 without a Range header
                    return Ok(ChunkOutcome::Incomplete { next_offset: 0 });
                }
                let next = offset + chunk.len() as u64;
                if next == total {
                    Ok(ChunkOutcome::Complete(file("new", "letters.txt", "root")))
                } else {
                    Ok(ChunkOutcome::Incomplete { next_offset: next })
                }
            });

        let uploaded = upload_file(
            &executor(client),
            UploadTarget::Create(NewFile::file("letters.txt", "root")),
            source.path(),
            4,
            None,
        )
        .await
        .unwrap();

        assert_eq!(uploaded.id, "new");
        assert_eq!(*sent.lock().unwrap(), vec![0, 0, 4]);
    }

    #[tokio::test]
    async fn test_download_streams_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("essay.pdf");

        let mut client = MockRemoteFileClient::new();
        client.expect_download().times(1).returning(|_| {
            let reader: Box<dyn tokio::io::AsyncRead + Send + Unpin> =
                Box::new(std::io::Cursor::new(b"hello drive".to_vec()));
            Ok(reader)
        });

        let (progress, seen) = recorder();
        let written = download_file(
            &executor(client),
            "f1",
            &destination,
            4,
            11,
            Some(&progress),
        )
        .await
        .unwrap();

        assert_eq!(written, 11);
        assert_eq!(std::fs::read(&destination).unwrap(), b"hello drive");
        assert_eq!(seen.lock().unwrap().last(), Some(&(11, 11)));
    }

    #[tokio::test]
    async fn test_download_failure_removes_partial_file() {
        struct Broken(bool);

        impl tokio::io::AsyncRead for Broken {
            fn poll_read(
                mut self: std::pin::Pin<&mut Self>,
                _cx: &mut std::task::Context<'_>,
                buf: &mut tokio::io::ReadBuf<'_>,
            ) -> std::task::Poll<std::io::Result<()>> {
                if self.0 {
                    return std::task::Poll::Ready(Err(std::io::Error::new(
                        std::io::ErrorKind::ConnectionReset,
                        "reset",
                    )));
                }
                self.0 = true;
                buf.put_slice(b"part");
                std::task::Poll::Ready(Ok(()))
            }
        }

        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("partial.bin");

        let mut client = MockRemoteFileClient::new();
        client.expect_download().times(1).returning(|_| {
            let reader: Box<dyn tokio::io::AsyncRead + Send + Unpin> = Box::new(Broken(false));
            Ok(reader)
        });

        let result = download_file(&executor(client), "f1", &destination, 4, 0, None).await;

        assert!(result.is_err());
        assert!(!destination.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_failed_download_keeps_existing_destination() {
        struct Reset;

        impl tokio::io::AsyncRead for Reset {
            fn poll_read(
                self: std::pin::Pin<&mut Self>,
                _cx: &mut std::task::Context<'_>,
                _buf: &mut tokio::io::ReadBuf<'_>,
            ) -> std::task::Poll<std::io::Result<()>> {
                std::task::Poll::Ready(Err(std::io::Error::new(
                    std::io::ErrorKind::ConnectionReset,
                    "reset",
                )))
            }
        }

        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("graded.pdf");
        std::fs::write(&destination, b"previous graded copy").unwrap();

        let mut client = MockRemoteFileClient::new();
        client.expect_download().times(1).returning(|_| {
            let reader: Box<dyn tokio::io::AsyncRead + Send + Unpin> = Box::new(Reset);
            Ok(reader)
        });

        let result = download_file(&executor(client), "f1", &destination, 4, 0, None).await;

        assert!(result.is_err());
        assert_eq!(std::fs::read(&destination).unwrap(), b"previous graded copy");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_download_replaces_existing_destination() {
        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("graded.pdf");
        std::fs::write(&destination, b"previous graded copy").unwrap();

        let mut client = MockRemoteFileClient::new();
        client.expect_download().times(1).returning(|_| {
            let reader: Box<dyn tokio::io::AsyncRead + Send + Unpin> =
                Box::new(std::io::Cursor::new(b"regraded".to_vec()));
            Ok(reader)
        });

        let written = download_file(&executor(client), "f1", &destination, 4, 8, None)
            .await
            .unwrap();

        assert_eq!(written, 8);
        assert_eq!(std::fs::read(&destination).unwrap(), b"regraded");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}

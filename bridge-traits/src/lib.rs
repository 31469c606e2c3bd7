//! # Host Bridge Traits
//!
//! Capability traits the drive access layer depends on but does not
//! implement itself.
//!
//! ## Overview
//!
//! This crate defines the contract between the drive façade and the
//! platform-specific pieces around it. Each trait is a capability the core
//! requires but that is provided from outside: a transport, a time source and
//! an authenticated remote file store.
//!
//! ## Traits
//!
//! - [`HttpClient`](http::HttpClient) - Single-attempt async HTTP operations
//! - [`RemoteFileClient`](storage::RemoteFileClient) - List/get/create/update/delete
//!   remote objects and stream their bytes
//! - [`Clock`](time::Clock) - Time source for deterministic cache expiry tests
//!
//! ## Error Handling
//!
//! All bridge traits use the [`BridgeError`](error::BridgeError) type. HTTP
//! answers keep their status code (`BridgeError::Status`) and transport
//! timeouts are reported as `BridgeError::Timeout`, which is what the retry
//! classification in `core-drive` keys on.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` bounds so one implementation can be
//! shared across async tasks.

pub mod error;
pub mod http;
pub mod storage;
pub mod time;

pub use error::BridgeError;

// Re-export commonly used types
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
pub use storage::{
    ChunkOutcome, FileKind, FilePage, FileUpdate, ListRequest, NewFile, RemoteFile,
    RemoteFileClient, UploadSession, UploadTarget,
};
pub use time::{Clock, LogLevel, ManualClock, SystemClock};

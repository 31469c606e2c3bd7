//! # Google Drive Provider
//!
//! Implements `RemoteFileClient` for Google Drive API v3.
//!
//! ## Overview
//!
//! This module provides:
//! - Paged listing and search through `files.list`
//! - Metadata reads, folder creation, rename, move and delete
//! - Streaming downloads (`alt=media`)
//! - Resumable uploads for new files and content replacement
//!
//! Every call is a single HTTP attempt. Non-success answers keep their status
//! code when converted to `BridgeError` so the drive façade can classify them.

pub mod connector;
pub mod error;
pub mod types;

pub use connector::GoogleDriveClient;
pub use error::{GoogleDriveError, Result};

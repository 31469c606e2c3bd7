//! # Drive Access Core
//!
//! A caching, retrying and invalidating façade over a remote file store.
//!
//! ## Overview
//!
//! This crate provides:
//! - `DriveFacade`: list, search, metadata, exact lookup, folder trees,
//!   transfers and mutations behind a sentinel-returning API
//! - `RetryExecutor`: bounded retries with exponential backoff for every
//!   remote call, driven by `RemoteCall` request descriptors
//! - `TimedCache` and `RecencyCache`: a TTL store for all reads and an LRU
//!   store for metadata-by-id
//! - `InvalidationCoordinator`: scope-based purging after successful writes
//!
//! The remote store is reached only through
//! [`bridge_traits::storage::RemoteFileClient`]; the Google Drive binding
//! lives in `provider-google-drive`.

pub mod cache;
pub mod error;
pub mod facade;
pub mod invalidation;
pub mod models;
pub mod query;
pub mod requests;
pub mod retry;
pub mod transfer;

#[cfg(test)]
pub(crate) mod test_support;

pub use cache::{CacheKey, CachedPayload, RecencyCache, TimedCache};
pub use error::{DriveError, EvictError, Result};
pub use facade::DriveFacade;
pub use invalidation::InvalidationCoordinator;
pub use models::{FolderNode, ProgressCallback};
pub use retry::{classify, Classification, RemoteCall, RetryExecutor};

//! # Drive Access Configuration
//!
//! Constructor-time settings for the drive façade.
//!
//! ## Overview
//!
//! The configuration uses a builder to construct a [`DriveConfig`]. Every
//! value has a default matching the behaviour the application was tuned for,
//! and `build()` validates the combination before any façade is created so a
//! bad setting fails at startup rather than on the first remote call.
//!
//! | Setting | Default |
//! |---------|---------|
//! | cache TTL | 300 s |
//! | max retries | 3 |
//! | base retry delay | 1 s |
//! | recency cache capacity | 128 |
//! | list page size | 100 |
//! | search page size | 50 |
//! | transfer chunk size | 5 MiB |
//!
//! ## Usage
//!
//! ```
//! use core_runtime::config::DriveConfig;
//! use std::time::Duration;
//!
//! let config = DriveConfig::builder()
//!     .cache_ttl(Duration::from_secs(120))
//!     .max_retries(5)
//!     .build()
//!     .expect("valid configuration");
//!
//! assert_eq!(config.max_retries, 5);
//! ```
//!
//! ## Error Handling
//!
//! Invalid values are reported with an actionable message:
//!
//! ```should_panic
//! use core_runtime::config::DriveConfig;
//!
//! let config = DriveConfig::builder()
//!     .recency_capacity(0)
//!     .build()
//!     .expect("Should fail - recency cache needs at least one slot");
//! ```

use crate::error::{Error, Result};
use std::time::Duration;

/// Resumable upload chunks must be a multiple of this many bytes.
pub const CHUNK_ALIGNMENT: usize = 256 * 1024;

/// Largest page the remote store will return.
pub const MAX_PAGE_SIZE: u32 = 1000;

const MAX_RETRIES_LIMIT: u32 = 10;
const MAX_BASE_DELAY: Duration = Duration::from_secs(60);

/// Settings for one drive façade instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriveConfig {
    /// How long a listing, search or metadata entry stays fresh
    pub cache_ttl: Duration,

    /// Total attempts per remote call, including the first
    pub max_retries: u32,

    /// Delay before the first retry; doubles on every further retry
    pub base_retry_delay: Duration,

    /// Number of metadata records kept in the recency cache
    pub recency_capacity: usize,

    /// Page size used when a caller does not ask for one
    pub list_page_size: u32,

    /// Page size for name searches
    pub search_page_size: u32,

    /// Bytes per upload/download chunk
    pub chunk_size: usize,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(300),
            max_retries: 3,
            base_retry_delay: Duration::from_secs(1),
            recency_capacity: 128,
            list_page_size: 100,
            search_page_size: 50,
            chunk_size: 20 * CHUNK_ALIGNMENT,
        }
    }
}

impl DriveConfig {
    /// Creates a new builder seeded with the defaults.
    pub fn builder() -> DriveConfigBuilder {
        DriveConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - TTL is non-zero
    /// - Retry count is between 1 and 10
    /// - Base retry delay does not exceed 60 seconds
    /// - Recency cache holds at least one entry
    /// - Page sizes are within the remote store's limits
    /// - Chunk size is a positive multiple of 256 KiB
    pub fn validate(&self) -> Result<()> {
        if self.cache_ttl.is_zero() {
            return Err(Error::Config(
                "Cache TTL must be greater than zero".to_string(),
            ));
        }

        if self.max_retries == 0 || self.max_retries > MAX_RETRIES_LIMIT {
            return Err(Error::Config(format!(
                "Max retries must be between 1 and {} (got {})",
                MAX_RETRIES_LIMIT, self.max_retries
            )));
        }

        if self.base_retry_delay > MAX_BASE_DELAY {
            return Err(Error::Config(
                "Base retry delay exceeds maximum of 60 seconds".to_string(),
            ));
        }

        if self.recency_capacity == 0 {
            return Err(Error::Config(
                "Recency cache capacity must be greater than 0".to_string(),
            ));
        }

        for (label, size) in [
            ("List page size", self.list_page_size),
            ("Search page size", self.search_page_size),
        ] {
            if size == 0 || size > MAX_PAGE_SIZE {
                return Err(Error::Config(format!(
                    "{} must be between 1 and {} (got {})",
                    label, MAX_PAGE_SIZE, size
                )));
            }
        }

        if self.chunk_size == 0 || self.chunk_size % CHUNK_ALIGNMENT != 0 {
            return Err(Error::Config(format!(
                "Chunk size must be a positive multiple of {} bytes (got {})",
                CHUNK_ALIGNMENT, self.chunk_size
            )));
        }

        Ok(())
    }
}

/// Builder for [`DriveConfig`].
#[derive(Debug, Clone, Default)]
pub struct DriveConfigBuilder {
    config: DriveConfig,
}

impl DriveConfigBuilder {
    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.config.cache_ttl = ttl;
        self
    }

    /// Convenience for the common "TTL in seconds" setting
    pub fn cache_ttl_secs(self, seconds: u64) -> Self {
        self.cache_ttl(Duration::from_secs(seconds))
    }

    pub fn max_retries(mut self, retries: u32) -> Self {
        self.config.max_retries = retries;
        self
    }

    pub fn base_retry_delay(mut self, delay: Duration) -> Self {
        self.config.base_retry_delay = delay;
        self
    }

    pub fn recency_capacity(mut self, capacity: usize) -> Self {
        self.config.recency_capacity = capacity;
        self
    }

    pub fn list_page_size(mut self, size: u32) -> Self {
        self.config.list_page_size = size;
        self
    }

    pub fn search_page_size(mut self, size: u32) -> Self {
        self.config.search_page_size = size;
        self
    }

    pub fn chunk_size(mut self, bytes: usize) -> Self {
        self.config.chunk_size = bytes;
        self
    }

    /// Validate and produce the configuration.
    pub fn build(self) -> Result<DriveConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

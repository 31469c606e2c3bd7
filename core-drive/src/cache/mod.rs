//! Two-tier read cache: a TTL store for every read and an LRU store for
//! metadata-by-id. Both live only as long as the façade that owns them.

pub mod key;
pub mod recency;
pub mod timed;

pub use key::{CacheKey, CachedPayload};
pub use recency::RecencyCache;
pub use timed::TimedCache;

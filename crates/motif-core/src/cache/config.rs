//! Configuration and error types for the TTL cache.

use std::time::Duration;
use thiserror::Error;

/// Errors raised by the cache itself, as opposed to errors produced by a fill.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    /// A zero TTL would make every entry expire on insertion.
    #[error("cache ttl must be greater than zero")]
    ZeroTtl,

    /// A zero budget would reject every entry.
    #[error("cache max size must be greater than zero")]
    ZeroCapacity,

    /// The task running a fill ended without producing an outcome (it panicked or the
    /// runtime shut down under it).
    #[error("cache fill for {0} was abandoned before completing")]
    FetchAbandoned(String),
}

/// Sizing and expiry policy for a [`TtlCache`](super::TtlCache).
///
/// `sweep_interval` of zero disables the background expiry sweeper; expiry is then
/// enforced lazily on read and on eviction only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TtlCacheConfig {
    /// TTL applied when a caller does not pass one explicitly.
    pub default_ttl: Duration,
    /// Budget for the sum of estimated entry sizes.
    pub max_size_bytes: usize,
    /// Period of the background expiry sweep.
    pub sweep_interval: Duration,
}

impl Default for TtlCacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: Duration::from_secs(15 * 60),
            max_size_bytes: 4096 * 1024 * 1024,
            sweep_interval: Duration::from_secs(60),
        }
    }
}

impl TtlCacheConfig {
    /// # Errors
    ///
    /// Returns [`CacheError::ZeroTtl`] or [`CacheError::ZeroCapacity`].
    pub fn validate(&self) -> Result<(), CacheError> {
        if self.default_ttl.is_zero() {
            return Err(CacheError::ZeroTtl);
        }
        if self.max_size_bytes == 0 {
            return Err(CacheError::ZeroCapacity);
        }
        Ok(())
    }
}

//! Configuration for the Least Frequently Used (LFU) cache.

use crate::CacheError;
use core::fmt;
use core::num::NonZeroUsize;

/// Configuration for an LFU (Least Frequently Used) cache.
///
/// # Fields
///
/// - `capacity`: Maximum number of entries the cache can hold
///
/// # Examples
///
/// ```
/// use freqcache::config::LfuCacheConfig;
/// use freqcache::LfuCache;
/// use core::num::NonZeroUsize;
///
/// let config = LfuCacheConfig {
///     capacity: NonZeroUsize::new(100).unwrap(),
/// };
/// let cache: LfuCache<&str, i32> = LfuCache::init(config);
/// assert!(cache.is_empty());
/// ```
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct LfuCacheConfig {
    /// Maximum number of key-value pairs the cache can hold
    pub capacity: NonZeroUsize,
}

impl LfuCacheConfig {
    /// Builds a configuration from a plain count, rejecting zero.
    pub fn with_capacity(capacity: usize) -> Result<Self, CacheError> {
        let capacity = NonZeroUsize::new(capacity).ok_or(CacheError::ZeroCapacity)?;
        Ok(Self { capacity })
    }
}

impl fmt::Debug for LfuCacheConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LfuCacheConfig")
            .field("capacity", &self.capacity)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_capacity_rejects_zero() {
        assert_eq!(
            LfuCacheConfig::with_capacity(0),
            Err(CacheError::ZeroCapacity)
        );
        let config = LfuCacheConfig::with_capacity(3).unwrap();
        assert_eq!(config.capacity.get(), 3);
    }
}

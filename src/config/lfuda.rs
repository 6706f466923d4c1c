//! Configuration for the Least Frequently Used with Dynamic Aging (LFUDA) cache.

use crate::CacheError;
use core::fmt;
use core::num::NonZeroUsize;

/// Configuration for an LFUDA (Least Frequently Used with Dynamic Aging) cache.
///
/// # Fields
///
/// - `capacity`: Maximum number of entries the cache can hold
/// - `initial_age`: Starting value of the global age (usually 0). New entries
///   enter at weight `1 + global_age`.
///
/// # Examples
///
/// ```
/// use freqcache::config::LfudaCacheConfig;
/// use freqcache::LfudaCache;
/// use core::num::NonZeroUsize;
///
/// let config = LfudaCacheConfig {
///     capacity: NonZeroUsize::new(100).unwrap(),
///     initial_age: 0,
/// };
/// let cache: LfudaCache<&str, i32> = LfudaCache::init(config);
/// assert_eq!(cache.global_age(), 0);
/// ```
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct LfudaCacheConfig {
    /// Maximum number of key-value pairs the cache can hold
    pub capacity: NonZeroUsize,
    /// Initial global age value
    pub initial_age: u64,
}

impl LfudaCacheConfig {
    /// Builds a configuration starting at age 0, rejecting a zero capacity.
    pub fn with_capacity(capacity: usize) -> Result<Self, CacheError> {
        let capacity = NonZeroUsize::new(capacity).ok_or(CacheError::ZeroCapacity)?;
        Ok(Self {
            capacity,
            initial_age: 0,
        })
    }
}

impl fmt::Debug for LfudaCacheConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LfudaCacheConfig")
            .field("capacity", &self.capacity)
            .field("initial_age", &self.initial_age)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    extern crate alloc;

    use super::*;

    #[test]
    fn test_with_capacity_starts_young() {
        let config = LfudaCacheConfig::with_capacity(8).unwrap();
        assert_eq!(config.capacity.get(), 8);
        assert_eq!(config.initial_age, 0);
        assert!(LfudaCacheConfig::with_capacity(0).is_err());
    }

    #[test]
    fn test_debug_shows_age() {
        let config = LfudaCacheConfig {
            initial_age: 10,
            ..LfudaCacheConfig::with_capacity(50).unwrap()
        };
        let rendered = alloc::format!("{config:?}");
        assert!(rendered.contains("initial_age: 10"), "{rendered}");
    }
}

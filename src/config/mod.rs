//! Cache Configuration Module
//!
//! Configuration structures for the cache implementations. Each cache type
//! has its own configuration struct with public fields.
//!
//! # Design Philosophy
//!
//! - **Simple**: Just create the struct with all fields set
//! - **Type safety**: A zero capacity cannot be expressed (`NonZeroUsize`)
//! - **No boilerplate**: No builder methods needed
//!
//! | Config | Cache | Description |
//! |--------|-------|-------------|
//! | `LfuCacheConfig` | [`LfuCache`](crate::LfuCache) | Least Frequently Used |
//! | `LfudaCacheConfig` | [`LfudaCache`](crate::LfudaCache) | LFU with Dynamic Aging |
//!
//! Callers holding a plain `usize` can go through `LfuCache::new` /
//! `LfudaCache::new` instead, which reject zero with
//! [`CacheError::ZeroCapacity`](crate::CacheError::ZeroCapacity).
//!
//! # Examples
//!
//! ```
//! use freqcache::config::LfuCacheConfig;
//! use freqcache::LfuCache;
//! use core::num::NonZeroUsize;
//!
//! let config = LfuCacheConfig {
//!     capacity: NonZeroUsize::new(1000).unwrap(),
//! };
//! let cache: LfuCache<String, i32> = LfuCache::init(config);
//! assert_eq!(cache.cap().get(), 1000);
//! ```

pub mod lfu;
pub mod lfuda;

pub use lfu::LfuCacheConfig;
pub use lfuda::LfudaCacheConfig;

//! Cache Metrics System
//!
//! Every cache keeps a small set of counters and reports them through the
//! [`CacheMetrics`] trait as a `BTreeMap<String, f64>`. The map is ordered so
//! that reports from different policies line up key for key, which is what
//! the simulator relies on when it prints policies side by side or exports
//! them to CSV.

extern crate alloc;

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};

pub mod lfu;
pub mod lfuda;

pub use lfu::LfuCacheMetrics;
pub use lfuda::LfudaCacheMetrics;

/// Counters shared by all cache policies.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CoreCacheMetrics {
    /// Completed lookups (hits plus misses whose fetch succeeded)
    pub requests: u64,

    /// Lookups served from a resident entry
    pub cache_hits: u64,

    /// Entries placed into a free slot (no eviction needed)
    pub insertions: u64,

    /// Entries displaced to make room for a missed key
    pub evictions: u64,
}

impl CoreCacheMetrics {
    /// Creates an all-zero set of counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a lookup served from the cache.
    pub fn record_hit(&mut self) {
        self.requests += 1;
        self.cache_hits += 1;
    }

    /// Records a lookup whose fetch succeeded and whose value is now resident.
    pub fn record_miss(&mut self) {
        self.requests += 1;
    }

    /// Records a miss stored without displacing anything.
    pub fn record_insertion(&mut self) {
        self.insertions += 1;
    }

    /// Records a miss stored by reusing an evicted entry's slot.
    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    /// Lookups that had to go to the backing store.
    pub fn cache_misses(&self) -> u64 {
        self.requests - self.cache_hits
    }

    /// Fraction of lookups served from the cache, 0.0 before any lookup.
    pub fn hit_rate(&self) -> f64 {
        if self.requests > 0 {
            self.cache_hits as f64 / self.requests as f64
        } else {
            0.0
        }
    }

    /// Fraction of lookups that missed, 0.0 before any lookup.
    pub fn miss_rate(&self) -> f64 {
        if self.requests > 0 {
            self.cache_misses() as f64 / self.requests as f64
        } else {
            0.0
        }
    }

    /// Converts the counters to a deterministically ordered map.
    pub fn to_btreemap(&self) -> BTreeMap<String, f64> {
        let mut metrics = BTreeMap::new();

        metrics.insert("cache_hits".to_string(), self.cache_hits as f64);
        metrics.insert("cache_misses".to_string(), self.cache_misses() as f64);
        metrics.insert("evictions".to_string(), self.evictions as f64);
        metrics.insert("insertions".to_string(), self.insertions as f64);
        metrics.insert("requests".to_string(), self.requests as f64);

        metrics.insert("hit_rate".to_string(), self.hit_rate());
        metrics.insert("miss_rate".to_string(), self.miss_rate());

        if self.requests > 0 {
            metrics.insert(
                "eviction_rate".to_string(),
                self.evictions as f64 / self.requests as f64,
            );
        }

        metrics
    }
}

/// Uniform metrics interface implemented by every cache.
pub trait CacheMetrics {
    /// Returns all metrics as key-value pairs in deterministic order.
    fn metrics(&self) -> BTreeMap<String, f64>;

    /// Algorithm name for identification (e.g. "LFU", "LFUDA").
    fn algorithm_name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_metrics_rates() {
        let mut core = CoreCacheMetrics::new();
        assert_eq!(core.hit_rate(), 0.0);
        assert_eq!(core.miss_rate(), 0.0);

        core.record_miss();
        core.record_insertion();
        core.record_hit();
        core.record_hit();
        core.record_miss();
        core.record_eviction();

        assert_eq!(core.requests, 4);
        assert_eq!(core.cache_misses(), 2);
        assert_eq!(core.hit_rate(), 0.5);
        assert_eq!(core.miss_rate(), 0.5);
    }

    #[test]
    fn test_core_metrics_map_is_complete() {
        let mut core = CoreCacheMetrics::new();
        core.record_miss();
        core.record_insertion();

        let map = core.to_btreemap();
        assert_eq!(map.get("requests"), Some(&1.0));
        assert_eq!(map.get("cache_misses"), Some(&1.0));
        assert_eq!(map.get("insertions"), Some(&1.0));
        assert_eq!(map.get("eviction_rate"), Some(&0.0));
    }
}

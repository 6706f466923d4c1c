//! LFU Cache Metrics

extern crate alloc;

use super::{CacheMetrics, CoreCacheMetrics};
use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};

/// LFU-specific metrics (extends CoreCacheMetrics)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LfuCacheMetrics {
    /// Core metrics common to all cache algorithms
    pub core: CoreCacheMetrics,

    /// Total number of promotions (one per hit)
    pub promotions: u64,

    /// Highest frequency any entry has reached
    pub max_frequency: u64,

    /// Frequency of the most recently evicted entry
    pub last_evicted_frequency: u64,

    /// Number of frequency buckets currently alive
    pub active_frequency_levels: u64,
}

impl LfuCacheMetrics {
    /// Creates a zeroed set of LFU metrics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a hit that moved an entry up to `new_frequency`.
    pub fn record_promotion(&mut self, new_frequency: u64) {
        self.core.record_hit();
        self.promotions += 1;
        if new_frequency > self.max_frequency {
            self.max_frequency = new_frequency;
        }
    }

    /// Records an eviction from the bucket with `frequency`.
    pub fn record_eviction(&mut self, frequency: u64) {
        self.core.record_eviction();
        self.last_evicted_frequency = frequency;
    }

    /// Updates the number of live frequency buckets.
    pub fn update_frequency_levels(&mut self, levels: usize) {
        self.active_frequency_levels = levels as u64;
        if self.max_frequency == 0 && levels > 0 {
            self.max_frequency = 1;
        }
    }

    /// Converts LFU metrics to a BTreeMap for reporting.
    pub fn to_btreemap(&self) -> BTreeMap<String, f64> {
        let mut metrics = self.core.to_btreemap();

        metrics.insert("promotions".to_string(), self.promotions as f64);
        metrics.insert("max_frequency".to_string(), self.max_frequency as f64);
        metrics.insert(
            "last_evicted_frequency".to_string(),
            self.last_evicted_frequency as f64,
        );
        metrics.insert(
            "active_frequency_levels".to_string(),
            self.active_frequency_levels as f64,
        );

        metrics
    }
}

impl CacheMetrics for LfuCacheMetrics {
    fn metrics(&self) -> BTreeMap<String, f64> {
        self.to_btreemap()
    }

    fn algorithm_name(&self) -> &'static str {
        "LFU"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lfu_metrics_promotion_tracks_max() {
        let mut metrics = LfuCacheMetrics::new();
        metrics.record_promotion(2);
        metrics.record_promotion(5);
        metrics.record_promotion(3);
        assert_eq!(metrics.promotions, 3);
        assert_eq!(metrics.max_frequency, 5);
        assert_eq!(metrics.core.cache_hits, 3);
    }

    #[test]
    fn test_lfu_metrics_report() {
        let mut metrics = LfuCacheMetrics::new();
        metrics.core.record_miss();
        metrics.record_eviction(4);
        metrics.update_frequency_levels(2);

        let map = metrics.metrics();
        assert_eq!(map.get("last_evicted_frequency"), Some(&4.0));
        assert_eq!(map.get("active_frequency_levels"), Some(&2.0));
        assert_eq!(map.get("evictions"), Some(&1.0));
        assert_eq!(metrics.algorithm_name(), "LFU");
    }
}

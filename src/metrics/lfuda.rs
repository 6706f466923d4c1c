//! LFUDA Cache Metrics

extern crate alloc;

use super::{CacheMetrics, CoreCacheMetrics};
use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};

/// LFUDA-specific metrics (extends CoreCacheMetrics)
///
/// Besides the core counters this tracks how far the global age has moved
/// and how often an eviction actually raised it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LfudaCacheMetrics {
    /// Core metrics common to all cache algorithms
    pub core: CoreCacheMetrics,

    /// Current global age value
    pub global_age: u64,

    /// Evictions that strictly increased the global age
    pub aging_events: u64,

    /// Total number of promotions (one per hit)
    pub promotions: u64,

    /// Highest weight any entry has reached
    pub max_weight: u64,

    /// Number of weight buckets currently alive
    pub active_weight_levels: u64,
}

impl LfudaCacheMetrics {
    /// Creates LFUDA metrics starting from `initial_age`.
    pub fn new(initial_age: u64) -> Self {
        Self {
            global_age: initial_age,
            ..Self::default()
        }
    }

    /// Records an eviction that set the global age to `new_global_age`.
    pub fn record_aging_event(&mut self, new_global_age: u64) {
        self.core.record_eviction();
        if new_global_age > self.global_age {
            self.aging_events += 1;
        }
        self.global_age = new_global_age;
    }

    /// Records a hit that moved an entry to `new_weight`.
    pub fn record_promotion(&mut self, new_weight: u64) {
        self.core.record_hit();
        self.promotions += 1;
        self.observe_weight(new_weight);
    }

    /// Tracks the weight an entry was placed at.
    pub fn observe_weight(&mut self, weight: u64) {
        if weight > self.max_weight {
            self.max_weight = weight;
        }
    }

    /// Updates the number of live weight buckets.
    pub fn update_weight_levels(&mut self, levels: usize) {
        self.active_weight_levels = levels as u64;
    }

    /// Fraction of evictions that raised the global age.
    pub fn aging_effectiveness(&self) -> f64 {
        if self.core.evictions > 0 {
            self.aging_events as f64 / self.core.evictions as f64
        } else {
            0.0
        }
    }

    /// Converts LFUDA metrics to a BTreeMap for reporting.
    pub fn to_btreemap(&self) -> BTreeMap<String, f64> {
        let mut metrics = self.core.to_btreemap();

        metrics.insert("global_age".to_string(), self.global_age as f64);
        metrics.insert("aging_events".to_string(), self.aging_events as f64);
        metrics.insert(
            "aging_effectiveness".to_string(),
            self.aging_effectiveness(),
        );
        metrics.insert("promotions".to_string(), self.promotions as f64);
        metrics.insert("max_weight".to_string(), self.max_weight as f64);
        metrics.insert(
            "active_weight_levels".to_string(),
            self.active_weight_levels as f64,
        );

        metrics
    }
}

impl CacheMetrics for LfudaCacheMetrics {
    fn metrics(&self) -> BTreeMap<String, f64> {
        self.to_btreemap()
    }

    fn algorithm_name(&self) -> &'static str {
        "LFUDA"
    }
}

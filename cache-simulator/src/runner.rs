//! Simulation runner for cache algorithms
//!
//! Replays one trace through every selected policy. The online caches see
//! the keys one at a time through `lookup`, with a fetch closure standing in
//! for the backing store; the Belady oracle gets the whole trace at once.
//! Every policy starts from an empty cache, so the numbers are directly
//! comparable.

use std::collections::BTreeMap;
use std::convert::Infallible;
use std::time::Instant;

use freqcache::{optimal_report, CacheError, LfuCache, LfudaCache};

use crate::input::Key;
use crate::models::{Algorithm, AlgorithmStats, SimulationConfig, SimulationResult, Trace};

/// The online caches behind one interface.
enum CacheWrapper {
    Lfu(LfuCache<Key, Key>),
    Lfuda(LfudaCache<Key, Key>),
}

impl CacheWrapper {
    /// Looks `key` up, loading it on a miss. Returns whether it was a hit.
    fn access(&mut self, key: Key) -> bool {
        let mut missed = false;
        let fetch = |k: &Key| {
            missed = true;
            Ok::<_, Infallible>(*k)
        };
        let result = match self {
            CacheWrapper::Lfu(cache) => cache.lookup(key, fetch).map(|_| ()),
            CacheWrapper::Lfuda(cache) => cache.lookup(key, fetch).map(|_| ()),
        };
        match result {
            Ok(()) => !missed,
            Err(never) => match never {},
        }
    }

    fn evictions(&self) -> u64 {
        match self {
            CacheWrapper::Lfu(cache) => cache.lfu_metrics().core.evictions,
            CacheWrapper::Lfuda(cache) => cache.lfuda_metrics().core.evictions,
        }
    }

    fn hits(&self) -> u64 {
        match self {
            CacheWrapper::Lfu(cache) => cache.get_hits(),
            CacheWrapper::Lfuda(cache) => cache.get_hits(),
        }
    }
}

/// Builds the online cache for `algorithm`. Offline policies never get here.
fn create_cache(algorithm: Algorithm, capacity: usize) -> Result<CacheWrapper, CacheError> {
    Ok(match algorithm {
        Algorithm::Lfu => CacheWrapper::Lfu(LfuCache::new(capacity)?),
        Algorithm::Lfuda => CacheWrapper::Lfuda(LfudaCache::new(capacity)?),
        Algorithm::Belady => unreachable!("{algorithm} has no online cache"),
    })
}

/// Runs a configured simulation over a trace.
#[derive(Debug)]
pub struct SimulationRunner {
    config: SimulationConfig,
}

impl SimulationRunner {
    /// Create a new simulation runner with the given configuration
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }

    /// Replay `trace` through every configured algorithm.
    ///
    /// Zero capacity and an empty trace are rejected before any policy runs.
    pub fn run(&self, trace: &Trace) -> Result<SimulationResult, CacheError> {
        let capacity = self.config.capacity;
        if capacity == 0 {
            return Err(CacheError::ZeroCapacity);
        }
        if trace.keys.is_empty() {
            return Err(CacheError::EmptyTrace);
        }

        let start = Instant::now();
        let mut stats = BTreeMap::new();
        for &algorithm in &self.config.algorithms {
            let algo_stats = Self::run_algorithm(algorithm, capacity, &trace.keys)?;
            tracing::info!(
                algorithm = algorithm.as_str(),
                hits = algo_stats.hits,
                misses = algo_stats.misses,
                evictions = algo_stats.evictions,
                "replay finished"
            );
            stats.insert(algorithm, algo_stats);
        }

        Ok(SimulationResult {
            stats,
            total_requests: trace.keys.len(),
            unique_keys: trace.unique_keys(),
            duration: start.elapsed(),
            capacity,
        })
    }

    fn run_algorithm(
        algorithm: Algorithm,
        capacity: usize,
        keys: &[Key],
    ) -> Result<AlgorithmStats, CacheError> {
        let start = Instant::now();

        if algorithm.is_offline() {
            let report = optimal_report(capacity, keys)?;
            return Ok(AlgorithmStats {
                hits: report.hits,
                misses: report.misses,
                evictions: report.evictions,
                duration: start.elapsed(),
            });
        }

        let mut cache = create_cache(algorithm, capacity)?;
        let mut stats = AlgorithmStats::new();
        for &key in keys {
            if cache.access(key) {
                stats.hits += 1;
            } else {
                stats.misses += 1;
            }
        }
        stats.duration = start.elapsed();
        stats.evictions = cache.evictions() as usize;
        debug_assert_eq!(cache.hits() as usize, stats.hits);
        Ok(stats)
    }
}

// Data models for cache simulation

use crate::input::Key;
use clap::ValueEnum;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// A parsed request trace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trace {
    /// Capacity carried by the trace header, if the format has one
    pub capacity: Option<usize>,
    /// Requested keys in order
    pub keys: Vec<Key>,
}

impl Trace {
    /// Number of distinct keys in the trace
    pub fn unique_keys(&self) -> usize {
        let mut keys = self.keys.clone();
        keys.sort_unstable();
        keys.dedup();
        keys.len()
    }
}

/// Replacement policies supported for simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, ValueEnum)]
pub enum Algorithm {
    Lfu,
    Lfuda,
    /// Offline optimum; the ceiling the online policies are measured against
    Belady,
}

impl Algorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::Lfu => "LFU",
            Algorithm::Lfuda => "LFUDA",
            Algorithm::Belady => "Belady",
        }
    }

    /// Get all available algorithms
    pub fn all() -> Vec<Algorithm> {
        vec![Algorithm::Lfu, Algorithm::Lfuda, Algorithm::Belady]
    }

    /// Whether this policy needs the whole trace up front
    pub fn is_offline(&self) -> bool {
        matches!(self, Algorithm::Belady)
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Configuration for a simulation run
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Cache capacity in number of entries
    pub capacity: usize,
    /// Algorithms to simulate
    pub algorithms: Vec<Algorithm>,
    /// Where to write per-algorithm rows, if anywhere
    pub output_csv: Option<PathBuf>,
}

/// Results of a simulation run
#[derive(Debug, Clone)]
pub struct SimulationResult {
    /// Statistics for each algorithm
    pub stats: BTreeMap<Algorithm, AlgorithmStats>,
    /// Total number of requests processed
    pub total_requests: usize,
    /// Number of unique keys in the trace
    pub unique_keys: usize,
    /// Wall-clock duration of the whole run
    pub duration: Duration,
    /// Cache capacity used
    pub capacity: usize,
}

/// Statistics for a single algorithm
#[derive(Debug, Default, Clone, PartialEq)]
pub struct AlgorithmStats {
    /// Number of cache hits
    pub hits: usize,
    /// Number of cache misses
    pub misses: usize,
    /// Number of entries displaced to make room
    pub evictions: usize,
    /// Time spent replaying the trace through this policy
    pub duration: Duration,
}

impl AlgorithmStats {
    /// Create new empty statistics
    pub fn new() -> Self {
        Self::default()
    }

    /// Calculate hit rate as percentage
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total > 0 {
            (self.hits as f64 / total as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Requests per second through the policy
    pub fn ops_per_sec(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs > 0.0 {
            (self.hits + self.misses) as f64 / secs
        } else {
            0.0
        }
    }
}

/// CSV export row for simulation results
#[derive(Debug, Serialize)]
pub struct CsvResultRow {
    pub algorithm: String,
    pub capacity: usize,
    pub requests: usize,
    pub hits: usize,
    pub misses: usize,
    pub evictions: usize,
    pub hit_rate: f64,
    /// Share of the Belady hit count this policy reached, when Belady ran
    pub fraction_of_optimal: Option<f64>,
    pub duration_ns: u64,
    pub ops_per_sec: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_rate() {
        let stats = AlgorithmStats {
            hits: 3,
            misses: 1,
            ..AlgorithmStats::new()
        };
        assert!((stats.hit_rate() - 75.0).abs() < f64::EPSILON);
        assert_eq!(AlgorithmStats::new().hit_rate(), 0.0);
    }

    #[test]
    fn test_unique_keys() {
        let trace = Trace {
            capacity: None,
            keys: vec![3, 1, 3, -2, 1],
        };
        assert_eq!(trace.unique_keys(), 3);
    }

    #[test]
    fn test_only_belady_is_offline() {
        let offline: Vec<_> = Algorithm::all()
            .into_iter()
            .filter(Algorithm::is_offline)
            .collect();
        assert_eq!(offline, vec![Algorithm::Belady]);
    }
}

//! Belady's optimal (MIN) replacement oracle.
//!
//! Given the whole access trace up front, the oracle replays it against a
//! cache of fixed capacity and, whenever it has to evict, drops the resident
//! key whose next use lies farthest in the future, or one that is never used
//! again. No online policy can score more hits on the same trace, which makes
//! the result a ceiling for [`LfuCache`](crate::LfuCache) and
//! [`LfudaCache`](crate::LfudaCache).
//!
//! ```text
//!   trace:     a  b  c  a  b  d  a
//!   index:     0  1  2  3  4  5  6
//!
//!   at i=2 (capacity 2, resident {a, b}):
//!     next(a) = 3, next(b) = 4   → evict b
//! ```
//!
//! The eviction step scans the resident set, so a run costs
//! O(n · capacity) on misses. This is an offline analysis tool; the caches
//! themselves never consult it.
//!
//! # Examples
//!
//! ```
//! use freqcache::{optimal_hits, optimal_report};
//!
//! let trace = ['a', 'b', 'c', 'a', 'b', 'd', 'a'];
//! assert_eq!(optimal_hits(2, &trace), Ok(2));
//!
//! let report = optimal_report(2, &trace).unwrap();
//! assert_eq!(report.misses, 5);
//! assert_eq!(report.evictions, 3);
//! ```

extern crate alloc;

use crate::error::CacheError;
use alloc::collections::VecDeque;
use core::hash::Hash;

#[cfg(feature = "hashbrown")]
use hashbrown::{HashMap, HashSet};

#[cfg(not(feature = "hashbrown"))]
use std::collections::{HashMap, HashSet};

/// Outcome of replaying a trace under optimal replacement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OptimalReport {
    /// Accesses that found their key resident.
    pub hits: usize,
    /// Accesses that had to load their key.
    pub misses: usize,
    /// Misses that displaced a resident key.
    pub evictions: usize,
}

impl OptimalReport {
    /// Total accesses replayed.
    pub fn requests(&self) -> usize {
        self.hits + self.misses
    }

    /// Fraction of accesses that hit, in `[0, 1]`.
    pub fn hit_rate(&self) -> f64 {
        match self.requests() {
            0 => 0.0,
            n => self.hits as f64 / n as f64,
        }
    }
}

/// Maximum number of hits any replacement policy can achieve on `trace`
/// with a cache of `capacity` entries.
///
/// # Errors
///
/// [`CacheError::ZeroCapacity`] if `capacity` is zero and
/// [`CacheError::EmptyTrace`] if `trace` is empty.
pub fn optimal_hits<K: Hash + Eq>(capacity: usize, trace: &[K]) -> Result<usize, CacheError> {
    optimal_report(capacity, trace).map(|report| report.hits)
}

/// Replays `trace` under optimal replacement and reports hits, misses and
/// evictions.
///
/// # Errors
///
/// Same preconditions as [`optimal_hits`], checked before any work is done.
pub fn optimal_report<K: Hash + Eq>(
    capacity: usize,
    trace: &[K],
) -> Result<OptimalReport, CacheError> {
    if capacity == 0 {
        return Err(CacheError::ZeroCapacity);
    }
    if trace.is_empty() {
        return Err(CacheError::EmptyTrace);
    }

    let mut oracle = Oracle::new(capacity, trace);
    for key in trace {
        oracle.access(key);
    }
    tracing::debug!(
        capacity,
        requests = trace.len(),
        hits = oracle.report.hits,
        "optimal replay finished"
    );
    Ok(oracle.report)
}

/// Future positions of every key, consumed front to back as the replay
/// advances.
struct OccurrenceMap<'a, K> {
    positions: HashMap<&'a K, VecDeque<usize>>,
}

impl<'a, K: Hash + Eq> OccurrenceMap<'a, K> {
    fn new(trace: &'a [K]) -> Self {
        let mut positions: HashMap<&'a K, VecDeque<usize>> = HashMap::with_capacity(trace.len());
        for (idx, key) in trace.iter().enumerate() {
            positions.entry(key).or_default().push_back(idx);
        }
        OccurrenceMap { positions }
    }

    /// Drops the current position of `key`. Keys with no positions left are
    /// forgotten, which is how "never used again" is represented.
    fn consume(&mut self, key: &K) {
        if let Some(queue) = self.positions.get_mut(key) {
            queue.pop_front();
            if queue.is_empty() {
                self.positions.remove(key);
            }
        }
    }

    fn next_use(&self, key: &K) -> Option<usize> {
        self.positions.get(key).and_then(|queue| queue.front().copied())
    }

    /// The resident key used farthest in the future. Keys never used again
    /// sort past every real position.
    fn farthest(&self, resident: &HashSet<&'a K>) -> Option<&'a K> {
        resident
            .iter()
            .copied()
            .max_by_key(|key| self.next_use(key).unwrap_or(usize::MAX))
    }
}

struct Oracle<'a, K> {
    capacity: usize,
    resident: HashSet<&'a K>,
    occurrences: OccurrenceMap<'a, K>,
    report: OptimalReport,
}

impl<'a, K: Hash + Eq> Oracle<'a, K> {
    fn new(capacity: usize, trace: &'a [K]) -> Self {
        Oracle {
            capacity,
            resident: HashSet::with_capacity(capacity.min(trace.len())),
            occurrences: OccurrenceMap::new(trace),
            report: OptimalReport::default(),
        }
    }

    fn access(&mut self, key: &'a K) {
        self.occurrences.consume(key);

        if self.resident.contains(key) {
            self.report.hits += 1;
            return;
        }

        self.report.misses += 1;
        if self.resident.len() == self.capacity {
            if let Some(victim) = self.occurrences.farthest(&self.resident) {
                self.resident.remove(victim);
                self.report.evictions += 1;
            }
        }
        self.resident.insert(key);
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use alloc::vec;
    use std::vec::Vec;

    const REGRESSION_TRACE: [u32; 37] = [
        1, 1, 1, 2, 2, 4, 4, 4, 3, 3, 3, 3, 3, 3, 3, 3, 44, 44, 44, 44, 44, 3, 3, 44, 44, 3, 1,
        44, 1, 1, 1, 1, 1, 1, 1, 1, 44,
    ];

    /// Exhaustive search over every eviction choice. Only usable on tiny
    /// traces.
    fn brute_force(capacity: usize, trace: &[u8], resident: &mut Vec<u8>) -> usize {
        let Some((&key, rest)) = trace.split_first() else {
            return 0;
        };
        if resident.contains(&key) {
            return 1 + brute_force(capacity, rest, resident);
        }
        if resident.len() < capacity {
            resident.push(key);
            let best = brute_force(capacity, rest, resident);
            resident.pop();
            return best;
        }
        let mut best = 0;
        for slot in 0..resident.len() {
            let evicted = core::mem::replace(&mut resident[slot], key);
            best = best.max(brute_force(capacity, rest, resident));
            resident[slot] = evicted;
        }
        best
    }

    #[test]
    fn test_regression_trace() {
        assert_eq!(optimal_hits(2, &REGRESSION_TRACE), Ok(31));
    }

    #[test]
    fn test_long_driver_trace() {
        let mut trace = vec![1u32; 14];
        trace.extend([2, 2, 2, 4, 4, 4]);
        trace.extend([3; 8]);
        trace.extend([44; 5]);
        trace.extend([3, 3, 44, 44, 3, 1, 44]);
        trace.extend([1; 8]);
        trace.push(44);
        assert_eq!(trace.len(), 49);
        assert_eq!(optimal_hits(2, &trace), Ok(43));
    }

    #[test]
    fn test_rejects_bad_input() {
        assert_eq!(optimal_hits(0, &[1, 2, 3]), Err(CacheError::ZeroCapacity));
        assert_eq!(optimal_hits::<u32>(3, &[]), Err(CacheError::EmptyTrace));
        assert_eq!(optimal_report::<u32>(0, &[]), Err(CacheError::ZeroCapacity));
    }

    #[test]
    fn test_capacity_covers_every_key() {
        let trace = [5, 6, 7, 5, 6, 7, 5];
        let report = optimal_report(3, &trace).unwrap();
        assert_eq!(report.hits, 4);
        assert_eq!(report.misses, 3);
        assert_eq!(report.evictions, 0);
        assert_eq!(report.requests(), trace.len());
    }

    #[test]
    fn test_prefers_key_never_used_again() {
        // at 'c', 'a' is dead and 'b' comes back
        let trace = ['a', 'b', 'c', 'b', 'c'];
        assert_eq!(optimal_hits(2, &trace), Ok(2));
    }

    #[test]
    fn test_single_slot() {
        assert_eq!(optimal_hits(1, &[1, 1, 2, 1, 1]), Ok(2));
    }

    #[test]
    fn test_matches_exhaustive_search() {
        let traces: [&[u8]; 5] = [
            &[1, 2, 3, 1, 2, 3, 4, 1],
            &[1, 2, 1, 3, 1, 4, 2, 3],
            &[4, 3, 2, 1, 4, 3, 5, 4],
            &[1, 1, 2, 3, 2, 4, 3, 1, 4],
            &[1, 2, 3, 4, 5, 1, 2, 3],
        ];
        for trace in traces {
            for capacity in 1..=3 {
                let expected = brute_force(capacity, trace, &mut Vec::new());
                assert_eq!(
                    optimal_hits(capacity, trace),
                    Ok(expected),
                    "trace {trace:?} capacity {capacity}"
                );
            }
        }
    }

    #[test]
    fn test_hit_rate() {
        let report = optimal_report(2, &REGRESSION_TRACE).unwrap();
        assert!((report.hit_rate() - 31.0 / 37.0).abs() < 1e-12);
    }
}

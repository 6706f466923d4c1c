//! Least Frequently Used with Dynamic Aging (LFUDA) Cache Implementation
//!
//! LFUDA is LFU with a cache-wide **global age** folded into every entry's
//! weight. Plain LFU lets an entry that was hot long ago sit in the cache
//! forever on the strength of its old visit count; LFUDA makes newcomers
//! enter at a weight that rises as evictions happen, so stale favourites are
//! eventually overtaken.
//!
//! # How the Algorithm Works
//!
//! ```text
//! For each resident entry i:
//!   F_i = visits since i was inserted
//!   A_i = global age when i's weight was last recomputed
//!   W_i = F_i + A_i
//!
//! On eviction:
//!   j = least recently used entry among those with W_j = min W
//!   global_age = W_j
//!
//! On a hit:
//!   F_i += 1, A_i = global_age
//!
//! On insertion:
//!   F_i = 1, A_i = global_age
//! ```
//!
//! The global age never decreases, so a hit always moves an entry to a
//! strictly heavier bucket.
//!
//! ## Data Structure
//!
//! ```text
//!   global_age = 5
//!
//!   HashMap<K, (weight, node)>        BTreeMap<weight, list>
//!   ┌──────────────┐                  ┌────────────────────────────┐
//!   │ "hot"  ──────┼─────────────────▶│ w=6:  [hot, new] ◄─ evict  │
//!   │ "new"  ──────┼─────────────────▶│       (LRU tail)           │
//!   │ "warm" ──────┼─────────────────▶│ w=9:  [warm]               │
//!   └──────────────┘                  └────────────────────────────┘
//! ```
//!
//! Weights are sparse (they jump by the age on every hit), so buckets are
//! kept in an ordered map keyed by weight rather than in a contiguous
//! sequence.
//!
//! ## Aging Example
//!
//! ```text
//! capacity 2, global_age 0
//!
//! A        → A: w=1
//! B        → B: w=1
//! A (hit)  → A: w=2
//! C        → evict B (w=1), global_age = 1, C: w=1+1 = 2
//! ```
//!
//! # Examples
//!
//! ```
//! use freqcache::LfudaCache;
//! use core::convert::Infallible;
//!
//! let mut cache = LfudaCache::new(2).unwrap();
//! let fetch = |k: &char| Ok::<_, Infallible>(k.to_ascii_lowercase());
//!
//! for key in ['A', 'B', 'A', 'C'] {
//!     cache.lookup(key, fetch).unwrap();
//! }
//!
//! assert!(!cache.contains(&'B'));
//! assert_eq!(cache.global_age(), 1);
//! assert_eq!(cache.weight(&'A'), Some(2));
//! assert_eq!(cache.weight(&'C'), Some(2));
//! ```

extern crate alloc;

use crate::buckets::{Entry, WeightMap};
use crate::config::LfudaCacheConfig;
use crate::error::CacheError;
use crate::list::NodeId;
use crate::meta::LfudaMeta;
use crate::metrics::{CacheMetrics, LfudaCacheMetrics};
use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::String;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::num::NonZeroUsize;

#[cfg(feature = "hashbrown")]
use hashbrown::DefaultHashBuilder;
#[cfg(feature = "hashbrown")]
use hashbrown::HashMap;

#[cfg(not(feature = "hashbrown"))]
use std::collections::hash_map::RandomState as DefaultHashBuilder;
#[cfg(not(feature = "hashbrown"))]
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Slot {
    weight: u64,
    node: NodeId,
}

/// An O(log b) LFU cache with dynamic aging, where `b` is the number of
/// distinct weights in use.
///
/// # Examples
///
/// ```
/// use freqcache::LfudaCache;
///
/// let mut cache: LfudaCache<u64, u64> = LfudaCache::new(16).unwrap();
/// let square = |k: &u64| Ok::<_, &'static str>(k * k);
/// assert_eq!(cache.lookup(12, square), Ok(&144));
/// assert_eq!(cache.frequency(&12), Some(1));
/// ```
pub struct LfudaCache<K, V, S = DefaultHashBuilder> {
    config: LfudaCacheConfig,

    /// Raised to the victim's weight on every eviction. Never decreases.
    global_age: u64,

    map: HashMap<K, Slot, S>,
    buckets: WeightMap<K, V, LfudaMeta>,
    metrics: LfudaCacheMetrics,
}

impl<K: Hash + Eq, V> LfudaCache<K, V> {
    /// Creates a cache holding at most `capacity` entries, starting at age 0.
    ///
    /// Returns [`CacheError::ZeroCapacity`] when `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self, CacheError> {
        LfudaCacheConfig::with_capacity(capacity).map(Self::init)
    }

    /// Creates a cache from a configuration.
    pub fn init(config: LfudaCacheConfig) -> Self {
        Self::with_hasher(config, DefaultHashBuilder::default())
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> LfudaCache<K, V, S> {
    /// Creates a cache from a configuration and a custom hash builder.
    pub fn with_hasher(config: LfudaCacheConfig, hash_builder: S) -> Self {
        let capacity = config.capacity.get();
        LfudaCache {
            global_age: config.initial_age,
            map: HashMap::with_capacity_and_hasher(capacity, hash_builder),
            buckets: WeightMap::with_capacity(capacity),
            metrics: LfudaCacheMetrics::new(config.initial_age),
            config,
        }
    }

    /// Returns the maximum number of key-value pairs the cache can hold.
    #[inline]
    pub fn cap(&self) -> NonZeroUsize {
        self.config.capacity
    }

    /// Returns the current number of key-value pairs in the cache.
    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if the cache contains no key-value pairs.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns `true` once the next miss will have to evict.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.map.len() == self.config.capacity.get()
    }

    /// Current global age.
    #[inline]
    pub fn global_age(&self) -> u64 {
        self.global_age
    }

    /// Number of lookups served from the cache since construction.
    #[inline]
    pub fn get_hits(&self) -> u64 {
        self.metrics.core.cache_hits
    }

    /// Number of lookups whose fetch succeeded since construction.
    #[inline]
    pub fn get_misses(&self) -> u64 {
        self.metrics.core.cache_misses()
    }

    /// Returns `true` if `key` is resident. Does not count as a visit.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.map.contains_key(key)
    }

    /// Returns the resident value for `key` without promoting it.
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.map
            .get(key)
            .map(|slot| &self.buckets.entry(slot.node).value)
    }

    /// Visits recorded for a resident key since it was inserted.
    pub fn frequency<Q>(&self, key: &Q) -> Option<u64>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.map
            .get(key)
            .map(|slot| self.buckets.entry(slot.node).meta.frequency)
    }

    /// Replacement weight (`frequency + age`) of a resident key.
    pub fn weight<Q>(&self, key: &Q) -> Option<u64>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.map.get(key).map(|slot| slot.weight)
    }

    /// Detailed counters for this cache.
    #[inline]
    pub fn lfuda_metrics(&self) -> &LfudaCacheMetrics {
        &self.metrics
    }

    /// Returns the value for `key`, fetching it on a miss.
    ///
    /// A hit recomputes the entry's weight against the current global age.
    /// A miss calls `fetch` exactly once; on failure the error is returned
    /// and nothing changes. On success the value enters at weight
    /// `1 + global_age`, after evicting the lowest-weight entry (and raising
    /// the global age to its weight) if the cache is full.
    pub fn lookup<F, E>(&mut self, key: K, fetch: F) -> Result<&V, E>
    where
        K: Clone,
        F: FnOnce(&K) -> Result<V, E>,
    {
        if let Some(slot) = self.map.get_mut(&key) {
            let from = slot.weight;
            let to = self.buckets.entry_mut(slot.node).meta.promote(self.global_age);
            // equal only once weights saturate at u64::MAX
            debug_assert!(to >= from);

            self.buckets.bucket_with_weight(to);
            self.buckets.splice_to_front(from, to, slot.node);
            self.buckets.remove_if_empty(from);
            slot.weight = to;
            let node = slot.node;

            self.metrics.record_promotion(to);
            self.metrics.update_weight_levels(self.buckets.bucket_count());
            return Ok(&self.buckets.entry(node).value);
        }

        let value = fetch(&key)?;
        self.metrics.core.record_miss();

        let node = if self.is_full() {
            self.replace_least_weight(key, value)
        } else {
            self.insert_new(key, value)
        };
        self.metrics.update_weight_levels(self.buckets.bucket_count());
        Ok(&self.buckets.entry(node).value)
    }

    /// Removes every entry. Counters and the global age are kept.
    pub fn clear(&mut self) {
        self.map.clear();
        self.buckets.clear();
        self.metrics.update_weight_levels(0);
    }

    /// Walks the whole structure and verifies the cache invariants.
    ///
    /// Besides the structural checks shared with [`crate::LfuCache`], every
    /// entry's stored metadata must reproduce its bucket weight and no entry
    /// may claim an age newer than the global age.
    pub fn check_invariants(&self) -> Result<(), CacheError> {
        let cap = self.config.capacity.get();
        if self.map.len() > cap {
            return Err(CacheError::Invariant(format!(
                "{} resident entries exceed capacity {cap}",
                self.map.len()
            )));
        }
        if self.map.len() != self.buckets.len() {
            return Err(CacheError::Invariant(format!(
                "index holds {} keys but buckets hold {} entries",
                self.map.len(),
                self.buckets.len()
            )));
        }

        let mut seen = 0;
        for (weight, len) in self.buckets.buckets() {
            if len == 0 {
                return Err(CacheError::Invariant(format!(
                    "bucket {weight} is empty"
                )));
            }
            if weight < self.global_age {
                return Err(CacheError::Invariant(format!(
                    "bucket {weight} is below global age {}",
                    self.global_age
                )));
            }
            for (node, entry) in self.buckets.bucket_entries(weight) {
                seen += 1;
                if entry.meta.frequency == 0
                    || entry.meta.age > self.global_age
                    || entry.meta.weight() != weight
                {
                    return Err(CacheError::Invariant(format!(
                        "entry metadata {:?} disagrees with bucket {weight}",
                        entry.meta
                    )));
                }
                match self.map.get(&entry.key) {
                    Some(slot) if slot.weight == weight && slot.node == node => {}
                    _ => {
                        return Err(CacheError::Invariant(format!(
                            "entry in bucket {weight} is not indexed there"
                        )))
                    }
                }
            }
        }
        if seen != self.map.len() {
            return Err(CacheError::Invariant(format!(
                "buckets reach {seen} entries, index has {}",
                self.map.len()
            )));
        }
        if let Some(slot) = self
            .map
            .values()
            .find(|slot| self.buckets.bucket_for(slot.weight).is_none())
        {
            return Err(CacheError::Invariant(format!(
                "index points at missing bucket {}",
                slot.weight
            )));
        }
        Ok(())
    }

    fn insert_new(&mut self, key: K, value: V) -> NodeId
    where
        K: Clone,
    {
        let meta = LfudaMeta::new(1, self.global_age);
        let weight = self.buckets.bucket_with_weight(meta.weight());
        let node = self
            .buckets
            .push_front(weight, Entry::new(key.clone(), value, meta));
        self.map.insert(key, Slot { weight, node });
        self.metrics.core.record_insertion();
        self.metrics.observe_weight(weight);
        node
    }

    fn replace_least_weight(&mut self, key: K, value: V) -> NodeId
    where
        K: Clone,
    {
        let least = self.buckets.least_weight_bucket();
        let victim = self.buckets.lru_entry(least);
        let previous_age = self.global_age;
        self.global_age = least;
        self.metrics.record_aging_event(least);
        tracing::debug!(
            victim_weight = least,
            previous_age,
            global_age = self.global_age,
            "evicted lowest weight entry"
        );

        let entry = self.buckets.entry_mut(victim);
        let (old_key, _) = entry.replace(key.clone(), value);
        let weight = entry.meta.reset(self.global_age);
        self.map.remove(&old_key);

        self.buckets.bucket_with_weight(weight);
        self.buckets.splice_to_front(least, weight, victim);
        self.buckets.remove_if_empty(least);
        self.map.insert(
            key,
            Slot {
                weight,
                node: victim,
            },
        );
        self.metrics.observe_weight(weight);
        victim
    }
}

impl<K, V, S> fmt::Debug for LfudaCache<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LfudaCache")
            .field("capacity", &self.config.capacity)
            .field("len", &self.map.len())
            .field("global_age", &self.global_age)
            .field("max_weight", &self.buckets.greatest_weight())
            .finish()
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> CacheMetrics for LfudaCache<K, V, S> {
    fn metrics(&self) -> BTreeMap<String, f64> {
        self.metrics.metrics()
    }

    fn algorithm_name(&self) -> &'static str {
        self.metrics.algorithm_name()
    }
}

//! Least Frequently Used Cache Implementation.
//!
//! The LFU cache evicts the entry with the fewest visits when it needs room,
//! breaking ties in favour of the entry that has gone longest without being
//! touched. Entries are grouped into frequency buckets `1, 2, 3, ...` kept in
//! an ascending sequence; a hit moves the entry to the head of the bucket for
//! `frequency + 1`, and a miss on a full cache takes the tail of the lowest
//! bucket.
//!
//! ```text
//!   index: HashMap<K, (bucket, node)>
//!
//!   w=1: [d, c]  ◄──►  w=2: [b]  ◄──►  w=5: [a]
//!            ▲
//!            └── eviction victim (lowest weight, least recent)
//! ```
//!
//! On a miss with a full cache the victim's slot is not freed: its key and
//! value are overwritten with the new pair and the slot is spliced to the
//! front of the weight-1 bucket. A miss on a cache with room pushes a new
//! entry instead; the two paths touch different list positions and are kept
//! apart on purpose.
//!
//! # Examples
//!
//! ```
//! use freqcache::LfuCache;
//! use core::convert::Infallible;
//!
//! let mut cache = LfuCache::new(2).unwrap();
//! let slow = |k: &u32| Ok::<_, Infallible>(k * 100);
//!
//! cache.lookup(1, slow).unwrap();
//! cache.lookup(1, slow).unwrap(); // hit, 1 now has frequency 2
//! cache.lookup(2, slow).unwrap();
//! cache.lookup(3, slow).unwrap(); // evicts 2, the least frequently used
//!
//! assert!(cache.contains(&1));
//! assert!(!cache.contains(&2));
//! assert_eq!(cache.get_hits(), 1);
//! ```

extern crate alloc;

use crate::buckets::{BucketId, Entry, FrequencyList};
use crate::config::LfuCacheConfig;
use crate::error::CacheError;
use crate::list::NodeId;
use crate::metrics::{CacheMetrics, LfuCacheMetrics};
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

/// Where a resident key lives: its bucket and its node inside that bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Slot {
    bucket: BucketId,
    node: NodeId,
}

/// An O(1) Least Frequently Used cache with LRU tie-breaking.
///
/// Values are produced by the caller's fetch callback on a miss; the cache
/// never performs I/O itself.
///
/// # Examples
///
/// ```
/// use freqcache::LfuCache;
///
/// let mut cache: LfuCache<&str, String> = LfuCache::new(3).unwrap();
/// let value = cache
///     .lookup("k", |k| Ok::<_, std::io::Error>(k.to_uppercase()))
///     .unwrap();
/// assert_eq!(value, "K");
/// ```
pub struct LfuCache<K, V, S = DefaultHashBuilder> {
    config: LfuCacheConfig,

    /// Lookup index: the single source of truth for residency
    map: HashMap<K, Slot, S>,

    /// Frequency buckets in ascending order, entries MRU first
    buckets: FrequencyList<K, V>,

    metrics: LfuCacheMetrics,
}

impl<K: Hash + Eq, V> LfuCache<K, V> {
    /// Creates a cache holding at most `capacity` entries.
    ///
    /// Returns [`CacheError::ZeroCapacity`] when `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self, CacheError> {
        LfuCacheConfig::with_capacity(capacity).map(Self::init)
    }

    /// Creates a cache from a configuration.
    pub fn init(config: LfuCacheConfig) -> Self {
        Self::with_hasher(config, DefaultHashBuilder::default())
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> LfuCache<K, V, S> {
    /// Creates a cache from a configuration and a custom hash builder.
    pub fn with_hasher(config: LfuCacheConfig, hash_builder: S) -> Self {
        let capacity = config.capacity.get();
        LfuCache {
            config,
            map: HashMap::with_capacity_and_hasher(capacity, hash_builder),
            buckets: FrequencyList::with_capacity(capacity),
            metrics: LfuCacheMetrics::new(),
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

    /// Returns the visit count of a resident key.
    pub fn frequency<Q>(&self, key: &Q) -> Option<u64>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.map.get(key).map(|slot| self.buckets.weight(slot.bucket))
    }

    /// Detailed counters for this cache.
    #[inline]
    pub fn lfu_metrics(&self) -> &LfuCacheMetrics {
        &self.metrics
    }

    /// Returns the value for `key`, fetching it on a miss.
    ///
    /// A hit promotes the entry to the next frequency bucket. A miss calls
    /// `fetch` exactly once; if it fails the error is returned and the cache
    /// is left untouched. Otherwise the value is stored at frequency 1,
    /// evicting the least frequently used entry (least recently used among
    /// equals) when the cache is full.
    pub fn lookup<F, E>(&mut self, key: K, fetch: F) -> Result<&V, E>
    where
        K: Clone,
        F: FnOnce(&K) -> Result<V, E>,
    {
        if let Some(slot) = self.map.get_mut(&key) {
            let from = slot.bucket;
            let to = self.buckets.next_weight_bucket(from);
            self.buckets.splice_to_front(from, to, slot.node);
            self.buckets.remove_if_empty(from);
            slot.bucket = to;
            let node = slot.node;

            self.metrics.record_promotion(self.buckets.weight(to));
            self.metrics
                .update_frequency_levels(self.buckets.bucket_count());
            return Ok(&self.buckets.entry(node).value);
        }

        let value = fetch(&key)?;
        self.metrics.core.record_miss();

        let node = if self.is_full() {
            self.replace_least_frequent(key, value)
        } else {
            self.insert_new(key, value)
        };
        self.metrics
            .update_frequency_levels(self.buckets.bucket_count());
        Ok(&self.buckets.entry(node).value)
    }

    /// Removes every entry. Hit and miss counters are kept.
    pub fn clear(&mut self) {
        self.map.clear();
        self.buckets.clear();
        self.metrics.update_frequency_levels(0);
    }

    /// Walks the whole structure and verifies the cache invariants: size
    /// within capacity, index and buckets in one-to-one correspondence,
    /// strictly ascending non-empty buckets.
    ///
    /// This is O(n) and meant for tests and debugging.
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
        if !self.buckets.sequence_is_consistent() {
            return Err(CacheError::Invariant(String::from(
                "bucket sequence links disagree",
            )));
        }

        let mut previous: Option<u64> = None;
        let mut seen = 0;
        for (bucket, weight) in self.buckets.buckets() {
            if weight == 0 || previous.is_some_and(|prev| weight <= prev) {
                return Err(CacheError::Invariant(format!(
                    "bucket weight {weight} out of order after {previous:?}"
                )));
            }
            previous = Some(weight);
            if self.buckets.bucket_for(weight) != Some(bucket) {
                return Err(CacheError::Invariant(format!(
                    "weight {weight} does not resolve to its own bucket"
                )));
            }

            let mut count = 0;
            for (node, entry) in self.buckets.bucket_entries(bucket) {
                count += 1;
                match self.map.get(&entry.key) {
                    Some(slot) if slot.bucket == bucket && slot.node == node => {}
                    _ => {
                        return Err(CacheError::Invariant(format!(
                            "entry in bucket {weight} is not indexed there"
                        )))
                    }
                }
            }
            if count == 0 || count != self.buckets.bucket_len(bucket) {
                return Err(CacheError::Invariant(format!(
                    "bucket {weight} walked {count} entries, expected {}",
                    self.buckets.bucket_len(bucket)
                )));
            }
            seen += count;
        }
        if seen != self.map.len() {
            return Err(CacheError::Invariant(format!(
                "buckets reach {seen} entries, index has {}",
                self.map.len()
            )));
        }
        Ok(())
    }

    fn insert_new(&mut self, key: K, value: V) -> NodeId
    where
        K: Clone,
    {
        let first = self.buckets.first_weight_bucket();
        let node = self
            .buckets
            .push_front(first, Entry::new(key.clone(), value, ()));
        self.map.insert(key, Slot { bucket: first, node });
        self.metrics.core.record_insertion();
        node
    }

    fn replace_least_frequent(&mut self, key: K, value: V) -> NodeId
    where
        K: Clone,
    {
        let least = self.buckets.least_weight_bucket();
        let victim = self.buckets.lru_entry(least);
        let frequency = self.buckets.weight(least);

        let (old_key, _) = self
            .buckets
            .entry_mut(victim)
            .replace(key.clone(), value);
        self.map.remove(&old_key);

        let first = self.buckets.first_weight_bucket();
        self.buckets.splice_to_front(least, first, victim);
        self.buckets.remove_if_empty(least);
        self.map.insert(
            key,
            Slot {
                bucket: first,
                node: victim,
            },
        );

        self.metrics.record_eviction(frequency);
        tracing::debug!(frequency, "evicted least frequently used entry");
        victim
    }
}

impl<K, V, S> fmt::Debug for LfuCache<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LfuCache")
            .field("capacity", &self.config.capacity)
            .field("len", &self.map.len())
            .field("buckets", &self.buckets.bucket_count())
            .field("hits", &self.metrics.core.cache_hits)
            .finish()
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> CacheMetrics for LfuCache<K, V, S> {
    fn metrics(&self) -> BTreeMap<String, f64> {
        self.metrics.metrics()
    }

    fn algorithm_name(&self) -> &'static str {
        self.metrics.algorithm_name()
    }
}

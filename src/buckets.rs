//! Frequency bucket containers.
//!
//! Both frequency-based caches group resident entries into buckets that share
//! one replacement weight. Inside a bucket, entries are ordered MRU at the
//! head and LRU at the tail, so "evict the lowest weight, tie-broken by
//! recency" is always the tail of the lowest bucket.
//!
//! ```text
//!   FrequencyList (LFU)                    WeightMap (LFUDA)
//!
//!   order: w=1 ◄──► w=2 ◄──► w=5           BTreeMap<u64, Links>
//!           │        │        │              7 → [e3, e1]
//!           ▼        ▼        ▼             12 → [e0]
//!         [e4,e2]  [e0]     [e1]            19 → [e2]
//! ```
//!
//! Entries for all buckets of a container share one [`Arena`], so a
//! promotion is an unlink and a relink of the same slot.

extern crate alloc;

use crate::list::{Arena, Iter, Links, NodeId};
use alloc::collections::BTreeMap;
use core::mem;

/// Handle to a bucket in a [`FrequencyList`].
pub(crate) type BucketId = NodeId;

/// A resident key/value pair plus the per-policy metadata `M`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Entry<K, V, M = ()> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) meta: M,
}

impl<K, V, M> Entry<K, V, M> {
    pub(crate) fn new(key: K, value: V, meta: M) -> Self {
        Entry { key, value, meta }
    }

    /// Overwrites key and value in place, returning the previous pair.
    pub(crate) fn replace(&mut self, key: K, value: V) -> (K, V) {
        (
            mem::replace(&mut self.key, key),
            mem::replace(&mut self.value, value),
        )
    }
}

/// One weight class of an LFU [`FrequencyList`].
#[derive(Debug, Clone, Copy)]
pub(crate) struct Bucket {
    weight: u64,
    entries: Links,
}

impl Bucket {
    fn new(weight: u64) -> Self {
        Bucket {
            weight,
            entries: Links::new(),
        }
    }
}

/// Buckets keyed by small contiguous visit counts, kept as an ascending
/// doubly linked sequence.
///
/// Promotion only ever needs the bucket directly after the current one, so
/// the sequence never has to be searched on the hot path.
pub(crate) struct FrequencyList<K, V, M = ()> {
    entries: Arena<Entry<K, V, M>>,
    buckets: Arena<Bucket>,
    order: Links,
}

impl<K, V, M> FrequencyList<K, V, M> {
    /// Creates a container sized for `capacity` resident entries.
    ///
    /// There can never be more distinct weights than entries, plus one bucket
    /// created transiently before the emptied source bucket is dropped.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        FrequencyList {
            entries: Arena::with_capacity(capacity),
            buckets: Arena::with_capacity(capacity.saturating_add(1)),
            order: Links::new(),
        }
    }

    /// Number of resident entries across all buckets.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Number of live buckets.
    #[inline]
    pub(crate) fn bucket_count(&self) -> usize {
        self.order.len()
    }

    #[inline]
    pub(crate) fn entry(&self, node: NodeId) -> &Entry<K, V, M> {
        self.entries.get(node)
    }

    #[inline]
    pub(crate) fn entry_mut(&mut self, node: NodeId) -> &mut Entry<K, V, M> {
        self.entries.get_mut(node)
    }

    #[inline]
    pub(crate) fn weight(&self, bucket: BucketId) -> u64 {
        self.buckets.get(bucket).weight
    }

    /// Number of entries currently in `bucket`.
    #[inline]
    pub(crate) fn bucket_len(&self, bucket: BucketId) -> usize {
        self.buckets.get(bucket).entries.len()
    }

    /// The bucket holding exactly `weight`, if there is one. Walks the
    /// sequence, so it stays off the lookup path.
    pub(crate) fn bucket_for(&self, weight: u64) -> Option<BucketId> {
        self.buckets
            .iter(&self.order)
            .map(|(id, bucket)| (id, bucket.weight))
            .take_while(|&(_, w)| w <= weight)
            .find_map(|(id, w)| (w == weight).then_some(id))
    }

    /// The weight-1 bucket, created at the front if the lowest bucket does
    /// not already have weight 1.
    pub(crate) fn first_weight_bucket(&mut self) -> BucketId {
        if let Some(front) = self.order.front() {
            if self.buckets.get(front).weight == 1 {
                return front;
            }
        }
        tracing::trace!("creating weight bucket 1");
        self.buckets.push_front(&mut self.order, Bucket::new(1))
    }

    /// The bucket for `weight(bucket) + 1`, reusing the successor when it
    /// already carries that weight and inserting a new bucket right after
    /// `bucket` otherwise.
    pub(crate) fn next_weight_bucket(&mut self, bucket: BucketId) -> BucketId {
        let next_weight = self.weight(bucket) + 1;
        if let Some(next) = self.buckets.next(bucket) {
            if self.buckets.get(next).weight == next_weight {
                return next;
            }
            debug_assert!(self.buckets.get(next).weight > next_weight);
        }
        tracing::trace!(weight = next_weight, "creating weight bucket");
        let created = self.buckets.alloc(Bucket::new(next_weight));
        self.buckets.link_after(&mut self.order, bucket, created);
        created
    }

    /// The lowest-weight bucket.
    ///
    /// Calling this on an empty container is a bug in the caller: eviction
    /// only happens when the cache is full, and a full cache has buckets.
    pub(crate) fn least_weight_bucket(&self) -> BucketId {
        match self.order.front() {
            Some(front) => front,
            None => unreachable!("least_weight_bucket on an empty frequency list"),
        }
    }

    /// Drops `bucket` when its entry list is empty. Returns whether it did.
    pub(crate) fn remove_if_empty(&mut self, bucket: BucketId) -> bool {
        if !self.buckets.get(bucket).entries.is_empty() {
            return false;
        }
        self.buckets.unlink(&mut self.order, bucket);
        self.buckets.release(bucket);
        true
    }

    /// Inserts a new entry at the head of `bucket`.
    pub(crate) fn push_front(&mut self, bucket: BucketId, entry: Entry<K, V, M>) -> NodeId {
        let mut links = self.buckets.get(bucket).entries;
        let node = self.entries.push_front(&mut links, entry);
        self.buckets.get_mut(bucket).entries = links;
        node
    }

    /// Moves `node` from `from` to the head of `to`. Never allocates.
    ///
    /// `from` and `to` may be the same bucket, which simply refreshes the
    /// entry's recency.
    pub(crate) fn splice_to_front(&mut self, from: BucketId, to: BucketId, node: NodeId) {
        let mut src = self.buckets.get(from).entries;
        self.entries.unlink(&mut src, node);
        self.buckets.get_mut(from).entries = src;

        let mut dst = self.buckets.get(to).entries;
        self.entries.link_front(&mut dst, node);
        self.buckets.get_mut(to).entries = dst;
    }

    /// Least recently used entry of `bucket`.
    pub(crate) fn lru_entry(&self, bucket: BucketId) -> NodeId {
        match self.buckets.get(bucket).entries.back() {
            Some(node) => node,
            None => unreachable!("empty bucket with weight {}", self.weight(bucket)),
        }
    }

    /// Walks the buckets in ascending weight order.
    pub(crate) fn buckets(&self) -> impl Iterator<Item = (BucketId, u64)> + '_ {
        self.buckets
            .iter(&self.order)
            .map(|(id, bucket)| (id, bucket.weight))
    }

    /// Walks the entries of `bucket`, MRU first.
    pub(crate) fn bucket_entries(&self, bucket: BucketId) -> Iter<'_, Entry<K, V, M>> {
        self.entries.iter(&self.buckets.get(bucket).entries)
    }

    /// Checks that successor and predecessor links of the bucket sequence
    /// agree. Used by the cache invariant checks.
    pub(crate) fn sequence_is_consistent(&self) -> bool {
        let mut prev = None;
        for (id, _) in self.buckets.iter(&self.order) {
            if self.buckets.prev(id) != prev {
                return false;
            }
            prev = Some(id);
        }
        prev == self.order.back()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.buckets.clear();
        self.order = Links::new();
    }
}

/// Buckets keyed by sparse weights in an ordered map.
///
/// The weight itself is the bucket handle; there is no pointer identity to
/// go stale when buckets are created and dropped.
pub(crate) struct WeightMap<K, V, M = ()> {
    entries: Arena<Entry<K, V, M>>,
    buckets: BTreeMap<u64, Links>,
}

impl<K, V, M> WeightMap<K, V, M> {
    /// Creates a container sized for `capacity` resident entries.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        WeightMap {
            entries: Arena::with_capacity(capacity),
            buckets: BTreeMap::new(),
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub(crate) fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    #[inline]
    pub(crate) fn entry(&self, node: NodeId) -> &Entry<K, V, M> {
        self.entries.get(node)
    }

    #[inline]
    pub(crate) fn entry_mut(&mut self, node: NodeId) -> &mut Entry<K, V, M> {
        self.entries.get_mut(node)
    }

    /// Whether a bucket with exactly `weight` exists.
    #[inline]
    pub(crate) fn bucket_for(&self, weight: u64) -> Option<u64> {
        self.buckets.contains_key(&weight).then_some(weight)
    }

    /// The bucket for `weight`, created empty if absent.
    pub(crate) fn bucket_with_weight(&mut self, weight: u64) -> u64 {
        self.buckets.entry(weight).or_insert_with(|| {
            tracing::trace!(weight, "creating weight bucket");
            Links::new()
        });
        weight
    }

    /// The minimum-weight bucket. Must not be called on an empty map.
    pub(crate) fn least_weight_bucket(&self) -> u64 {
        match self.buckets.first_key_value() {
            Some((weight, _)) => *weight,
            None => unreachable!("least_weight_bucket on an empty weight map"),
        }
    }

    /// Greatest weight currently in use.
    pub(crate) fn greatest_weight(&self) -> Option<u64> {
        self.buckets.last_key_value().map(|(weight, _)| *weight)
    }

    /// Drops the bucket for `weight` when it holds no entries.
    pub(crate) fn remove_if_empty(&mut self, weight: u64) -> bool {
        if self.links(weight).is_empty() {
            self.buckets.remove(&weight);
            true
        } else {
            false
        }
    }

    /// Inserts a new entry at the head of the `weight` bucket, which must
    /// exist.
    pub(crate) fn push_front(&mut self, weight: u64, entry: Entry<K, V, M>) -> NodeId {
        let mut links = self.links(weight);
        let node = self.entries.push_front(&mut links, entry);
        self.store_links(weight, links);
        node
    }

    /// Moves `node` from bucket `from` to the head of bucket `to`.
    pub(crate) fn splice_to_front(&mut self, from: u64, to: u64, node: NodeId) {
        let mut src = self.links(from);
        self.entries.unlink(&mut src, node);
        self.store_links(from, src);

        let mut dst = self.links(to);
        self.entries.link_front(&mut dst, node);
        self.store_links(to, dst);
    }

    /// Least recently used entry of the `weight` bucket.
    pub(crate) fn lru_entry(&self, weight: u64) -> NodeId {
        match self.links(weight).back() {
            Some(node) => node,
            None => unreachable!("empty bucket with weight {weight}"),
        }
    }

    /// Walks `(weight, len)` pairs in ascending weight order.
    pub(crate) fn buckets(&self) -> impl Iterator<Item = (u64, usize)> + '_ {
        self.buckets.iter().map(|(weight, links)| (*weight, links.len()))
    }

    /// Walks the entries of the `weight` bucket, MRU first.
    pub(crate) fn bucket_entries(&self, weight: u64) -> Iter<'_, Entry<K, V, M>> {
        self.entries.iter(&self.links(weight))
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.buckets.clear();
    }

    fn links(&self, weight: u64) -> Links {
        match self.buckets.get(&weight) {
            Some(links) => *links,
            None => unreachable!("no bucket with weight {weight}"),
        }
    }

    fn store_links(&mut self, weight: u64, links: Links) {
        match self.buckets.get_mut(&weight) {
            Some(slot) => *slot = links,
            None => unreachable!("no bucket with weight {weight}"),
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use alloc::vec;
    use std::vec::Vec;

    fn weights<K, V>(list: &FrequencyList<K, V>) -> Vec<u64> {
        list.buckets().map(|(_, w)| w).collect()
    }

    fn keys<V>(list: &FrequencyList<u32, V>, bucket: BucketId) -> Vec<u32> {
        list.bucket_entries(bucket).map(|(_, e)| e.key).collect()
    }

    #[test]
    fn test_first_weight_bucket_is_created_once() {
        let mut list: FrequencyList<u32, ()> = FrequencyList::with_capacity(4);
        let a = list.first_weight_bucket();
        let b = list.first_weight_bucket();
        assert_eq!(a, b);
        assert_eq!(weights(&list), vec![1]);
    }

    #[test]
    fn test_next_weight_bucket_reuses_and_inserts() {
        let mut list: FrequencyList<u32, ()> = FrequencyList::with_capacity(4);
        let one = list.first_weight_bucket();
        let two = list.next_weight_bucket(one);
        assert_eq!(list.next_weight_bucket(one), two);
        let three = list.next_weight_bucket(two);
        assert_eq!(weights(&list), vec![1, 2, 3]);

        list.push_front(three, Entry::new(7, (), ()));
        assert!(list.remove_if_empty(two));
        assert_eq!(weights(&list), vec![1, 3]);

        // weight 2 is missing again, so it goes between 1 and 3
        let two_again = list.next_weight_bucket(one);
        assert_eq!(list.weight(two_again), 2);
        assert_eq!(weights(&list), vec![1, 2, 3]);
        assert!(list.sequence_is_consistent());
    }

    #[test]
    fn test_bucket_for_finds_exact_weight_only() {
        let mut list: FrequencyList<u32, ()> = FrequencyList::with_capacity(4);
        let one = list.first_weight_bucket();
        let two = list.next_weight_bucket(one);
        let three = list.next_weight_bucket(two);
        list.push_front(three, Entry::new(9, (), ()));
        list.push_front(one, Entry::new(8, (), ()));
        assert!(list.remove_if_empty(two));

        assert_eq!(list.bucket_for(1), Some(one));
        assert_eq!(list.bucket_for(2), None);
        assert_eq!(list.bucket_for(3), Some(three));
        assert_eq!(list.bucket_for(4), None);
    }

    #[test]
    fn test_first_weight_bucket_goes_in_front_of_heavier_buckets() {
        let mut list: FrequencyList<u32, ()> = FrequencyList::with_capacity(4);
        let one = list.first_weight_bucket();
        let two = list.next_weight_bucket(one);
        let node = list.push_front(one, Entry::new(1, (), ()));
        list.splice_to_front(one, two, node);
        assert!(list.remove_if_empty(one));
        assert_eq!(weights(&list), vec![2]);

        let fresh = list.first_weight_bucket();
        assert_eq!(list.least_weight_bucket(), fresh);
        assert_eq!(weights(&list), vec![1, 2]);
    }

    #[test]
    fn test_splice_keeps_mru_order_and_lru_tail() {
        let mut list: FrequencyList<u32, ()> = FrequencyList::with_capacity(4);
        let one = list.first_weight_bucket();
        let a = list.push_front(one, Entry::new(1, (), ()));
        list.push_front(one, Entry::new(2, (), ()));
        list.push_front(one, Entry::new(3, (), ()));
        assert_eq!(keys(&list, one), vec![3, 2, 1]);
        assert_eq!(list.lru_entry(one), a);

        let two = list.next_weight_bucket(one);
        list.splice_to_front(one, two, a);
        assert_eq!(keys(&list, one), vec![3, 2]);
        assert_eq!(keys(&list, two), vec![1]);
        assert!(!list.remove_if_empty(one));
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn test_splice_within_same_bucket_refreshes_recency() {
        let mut list: FrequencyList<u32, ()> = FrequencyList::with_capacity(2);
        let one = list.first_weight_bucket();
        let a = list.push_front(one, Entry::new(1, (), ()));
        list.push_front(one, Entry::new(2, (), ()));
        list.splice_to_front(one, one, a);
        assert_eq!(keys(&list, one), vec![1, 2]);
    }

    #[test]
    fn test_entry_replace_returns_previous_pair() {
        let mut entry = Entry::new("a", 1, ());
        assert_eq!(entry.replace("b", 2), ("a", 1));
        assert_eq!((entry.key, entry.value), ("b", 2));
    }

    #[test]
    fn test_weight_map_orders_sparse_weights() {
        let mut map: WeightMap<u32, (), ()> = WeightMap::with_capacity(4);
        map.bucket_with_weight(40);
        map.bucket_with_weight(3);
        map.bucket_with_weight(17);
        map.push_front(40, Entry::new(1, (), ()));
        let n = map.push_front(3, Entry::new(2, (), ()));
        map.push_front(17, Entry::new(3, (), ()));

        assert_eq!(map.least_weight_bucket(), 3);
        assert_eq!(map.greatest_weight(), Some(40));
        assert_eq!(map.bucket_for(17), Some(17));
        assert_eq!(map.bucket_for(18), None);

        map.bucket_with_weight(41);
        map.splice_to_front(3, 41, n);
        assert!(map.remove_if_empty(3));
        assert!(!map.remove_if_empty(41));
        assert_eq!(map.least_weight_bucket(), 17);
        assert_eq!(
            map.buckets().collect::<Vec<_>>(),
            vec![(17, 1), (40, 1), (41, 1)]
        );
        assert_eq!(map.entry(map.lru_entry(41)).key, 2);
    }

    #[test]
    fn test_weight_map_bucket_with_weight_is_idempotent() {
        let mut map: WeightMap<u32, (), ()> = WeightMap::with_capacity(2);
        map.bucket_with_weight(5);
        map.push_front(5, Entry::new(1, (), ()));
        map.bucket_with_weight(5);
        assert_eq!(map.bucket_count(), 1);
        assert_eq!(map.bucket_entries(5).count(), 1);
    }
}

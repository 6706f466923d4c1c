#![doc = include_str!("../README.md")]
//!
//! ---
//!
//! # Code Reference
//!
//! ## Which Policy?
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │  Is popularity stable over the lifetime of the cache?            │
//! │                                                                  │
//! │        Yes ──▶ ┌──────────┐      No ──▶ ┌──────────┐             │
//! │                │   LFU    │             │  LFUDA   │             │
//! │                └──────────┘             └──────────┘             │
//! │                                                                  │
//! │  How much better could any policy do on this trace?              │
//! │                                                                  │
//! │                ──▶ optimal_hits / optimal_report (offline)       │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Reference
//!
//! | Item | Description |
//! |------|-------------|
//! | [`LfuCache`] | Least Frequently Used, LRU among equals |
//! | [`LfudaCache`] | LFU with Dynamic Aging |
//! | [`optimal_hits`] | Belady/MIN hit ceiling for a trace |
//! | [`optimal_report`] | Belady/MIN hits, misses and evictions |
//!
//! ## Performance Characteristics
//!
//! | Policy | Hit | Miss | Allocation on hit |
//! |--------|-----|------|-------------------|
//! | LFU    | O(1) | O(1) | never |
//! | LFUDA  | O(log b) | O(log b) | only when a new weight bucket is needed |
//! | Belady | n/a | O(capacity) scan | offline |
//!
//! `b` is the number of distinct LFUDA weights in use.
//!
//! ## Checking Structure
//!
//! Both caches expose `check_invariants`, an O(n) walk that reports any
//! disagreement between the key index and the bucket lists:
//!
//! ```rust
//! use freqcache::LfudaCache;
//!
//! let mut cache = LfudaCache::new(8).unwrap();
//! for key in 0..32u32 {
//!     cache.lookup(key % 11, |k| Ok::<_, ()>(*k)).unwrap();
//! }
//! assert!(cache.check_invariants().is_ok());
//! ```
//!
//! ## Modules
//!
//! - [`lfu`]: Least Frequently Used cache
//! - [`lfuda`]: LFU with Dynamic Aging cache
//! - [`belady`]: offline optimal replacement oracle
//! - [`config`]: configuration structures for the caches
//! - [`metrics`]: counters and reporting
//! - [`error`]: the crate error type

#![no_std]

#[cfg(not(feature = "hashbrown"))]
extern crate std;

/// Per-entry metadata for the frequency-based caches.
pub mod meta;

/// Index-linked doubly linked lists over a slot arena.
///
/// **Note**: internal infrastructure. Handles are only meaningful for the
/// arena that issued them.
pub(crate) mod list;

/// Frequency bucket containers shared by the caches.
pub(crate) mod buckets;

/// Cache configuration structures.
pub mod config;

/// Error type for precondition and invariant failures.
pub mod error;

/// Least Frequently Used (LFU) cache implementation.
///
/// Evicts the entry with the lowest visit count, breaking ties by recency.
pub mod lfu;

/// Least Frequently Used with Dynamic Aging (LFUDA) cache implementation.
///
/// An LFU cache whose entry weights include a global age that rises on
/// every eviction.
pub mod lfuda;

/// Belady's optimal replacement oracle.
pub mod belady;

/// Cache metrics system.
///
/// Each cache tracks the core hit/miss counters plus algorithm-specific ones
/// and reports them through the [`metrics::CacheMetrics`] trait.
pub mod metrics;

pub use belady::{optimal_hits, optimal_report, OptimalReport};
pub use error::CacheError;
pub use lfu::LfuCache;
pub use lfuda::LfudaCache;
pub use meta::LfudaMeta;

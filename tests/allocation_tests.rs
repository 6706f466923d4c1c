//! Allocation accounting for the LFU hit path.
//!
//! Lives in its own test binary because it installs an instrumented global
//! allocator and must be the only test running while the region is open.

use freqcache::LfuCache;
use stats_alloc::{Region, StatsAlloc, INSTRUMENTED_SYSTEM};
use std::alloc::System;
use std::convert::Infallible;

#[global_allocator]
static GLOBAL: &StatsAlloc<System> = &INSTRUMENTED_SYSTEM;

fn identity(k: &u64) -> Result<u64, Infallible> {
    Ok(*k)
}

#[test]
fn test_lfu_hits_do_not_allocate() {
    const CAPACITY: u64 = 64;
    let mut cache = LfuCache::new(CAPACITY as usize).unwrap();
    for k in 0..CAPACITY {
        cache.lookup(k, identity).unwrap();
    }
    // one warm-up hit each so logging callsites are registered up front
    for k in 0..CAPACITY {
        cache.lookup(k, identity).unwrap();
    }

    let region = Region::new(GLOBAL);
    let mut checksum = 0;
    for round in 0..200 {
        // uneven promotion so buckets keep being created and dropped
        for k in 0..CAPACITY {
            if (k + round) % 3 != 0 {
                checksum += *cache.lookup(k, identity).unwrap();
            }
        }
    }
    let stats = region.change();

    assert!(checksum > 0);
    assert_eq!(stats.allocations, 0, "{stats:?}");
    assert_eq!(stats.reallocations, 0, "{stats:?}");
    assert_eq!(cache.get_misses(), CAPACITY);
}

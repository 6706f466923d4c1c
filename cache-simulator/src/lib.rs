//! Trace-driven simulator for the `freqcache` replacement policies.
//!
//! Reads or generates an access trace, replays it through LFU and LFUDA and
//! compares both against the Belady optimum on the same trace.

pub mod generator;
pub mod input;
pub mod models;
pub mod runner;
pub mod stats;

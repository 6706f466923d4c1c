//! Synthetic trace generation
//!
//! Produces classic-format traces with a popularity shift: the trace is cut
//! into phases, and each phase draws most of its requests from a different
//! window of "hot" keys. Keys that were hot in an early phase build up large
//! counts and then go cold, which is exactly the pattern that strands entries
//! in a plain LFU cache and that LFUDA's aging is meant to clear out.

use crate::input::Key;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Share of requests drawn from the current hot window.
const HOT_FRACTION: f64 = 0.8;

/// Keys written per line after the header.
const KEYS_PER_LINE: usize = 16;

/// Parameters for a shifting-popularity trace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftingTraceConfig {
    /// Total number of requests
    pub requests: usize,
    /// Size of the key universe; keys are `0..keys`
    pub keys: usize,
    /// Number of keys in each phase's hot window
    pub hot_set: usize,
    /// Number of popularity phases
    pub phases: usize,
    /// RNG seed; `None` draws one from the OS
    pub seed: Option<u64>,
    /// Capacity written into the header; defaults to `hot_set`
    pub capacity: Option<usize>,
}

impl Default for ShiftingTraceConfig {
    fn default() -> Self {
        Self {
            requests: 100_000,
            keys: 10_000,
            hot_set: 100,
            phases: 4,
            seed: None,
            capacity: None,
        }
    }
}

/// Errors raised while generating a trace.
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("hot set of {hot_set} does not fit in {keys} keys")]
    HotSetTooLarge { hot_set: usize, keys: usize },

    #[error("{phases} phases cannot be spread over {requests} requests")]
    TooManyPhases { phases: usize, requests: usize },

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Generator for shifting-popularity traces
#[derive(Debug)]
pub struct ShiftingTraceGenerator {
    config: ShiftingTraceConfig,
}

impl ShiftingTraceGenerator {
    /// Create a new generator, rejecting configurations that cannot produce
    /// a meaningful trace
    pub fn new(config: ShiftingTraceConfig) -> Result<Self, GeneratorError> {
        for (name, value) in [
            ("requests", config.requests),
            ("keys", config.keys),
            ("hot set", config.hot_set),
            ("phases", config.phases),
        ] {
            if value == 0 {
                return Err(GeneratorError::Zero(name));
            }
        }
        if config.capacity == Some(0) {
            return Err(GeneratorError::Zero("capacity"));
        }
        if config.hot_set > config.keys {
            return Err(GeneratorError::HotSetTooLarge {
                hot_set: config.hot_set,
                keys: config.keys,
            });
        }
        if config.phases > config.requests {
            return Err(GeneratorError::TooManyPhases {
                phases: config.phases,
                requests: config.requests,
            });
        }
        Ok(Self { config })
    }

    /// Capacity that goes into the trace header
    pub fn capacity(&self) -> usize {
        self.config.capacity.unwrap_or(self.config.hot_set)
    }

    /// Draw the request keys
    pub fn keys(&self) -> Vec<Key> {
        let config = &self.config;
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let phase_len = config.requests.div_ceil(config.phases);

        (0..config.requests)
            .map(|i| {
                let phase = i / phase_len;
                let key = if rng.gen_bool(HOT_FRACTION) {
                    let window_start = phase * config.hot_set;
                    (window_start + rng.gen_range(0..config.hot_set)) % config.keys
                } else {
                    rng.gen_range(0..config.keys)
                };
                key as Key
            })
            .collect()
    }

    /// Write a classic-format trace to `writer`
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let keys = self.keys();
        writeln!(writer, "{} {}", self.capacity(), keys.len())?;
        for line in keys.chunks(KEYS_PER_LINE) {
            let mut sep = "";
            for key in line {
                write!(writer, "{sep}{key}")?;
                sep = " ";
            }
            writeln!(writer)?;
        }
        writer.flush()
    }

    /// Generate the trace into the file at `path`
    pub fn generate(&self, path: &Path) -> Result<(), GeneratorError> {
        let io_err = |source| GeneratorError::Io {
            path: path.to_path_buf(),
            source,
        };
        let file = File::create(path).map_err(io_err)?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer).map_err(io_err)?;

        tracing::info!(
            path = %path.display(),
            requests = self.config.requests,
            phases = self.config.phases,
            capacity = self.capacity(),
            "trace written"
        );
        Ok(())
    }
}

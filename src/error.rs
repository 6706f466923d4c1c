//! Error types for the policy engine.
//!
//! Only precondition failures are reported through [`CacheError`]. A failing
//! fetch callback surfaces the caller's own error type unchanged, and broken
//! internal invariants are programming errors that assert rather than return.

extern crate alloc;

use alloc::string::String;

/// Errors returned by cache constructors, the Belady oracle, and the
/// invariant checkers.
///
/// # Examples
///
/// ```
/// use freqcache::{optimal_hits, CacheError, LfuCache};
///
/// assert_eq!(LfuCache::<u32, u32>::new(0).unwrap_err(), CacheError::ZeroCapacity);
/// assert_eq!(optimal_hits::<u32>(2, &[]), Err(CacheError::EmptyTrace));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CacheError {
    /// A cache or oracle was asked to hold zero entries.
    #[error("cache capacity must be greater than zero")]
    ZeroCapacity,

    /// The oracle was handed an empty access trace.
    #[error("access trace must not be empty")]
    EmptyTrace,

    /// An internal consistency check failed.
    #[error("cache invariant violated: {0}")]
    Invariant(String),
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use std::string::ToString;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            CacheError::ZeroCapacity.to_string(),
            "cache capacity must be greater than zero"
        );
        assert_eq!(
            CacheError::EmptyTrace.to_string(),
            "access trace must not be empty"
        );
        assert_eq!(
            CacheError::Invariant("bucket 3 is empty".into()).to_string(),
            "cache invariant violated: bucket 3 is empty"
        );
    }
}

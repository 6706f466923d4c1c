//! Per-entry metadata for the frequency-based caches.
//!
//! LFU needs no per-entry metadata: an entry's frequency is the weight of the
//! bucket it sits in. LFUDA weights mix the entry's own visit count with the
//! cache-wide age, so each entry remembers both halves.
//!
//! | Algorithm | Metadata Type | Size |
//! |-----------|---------------|------|
//! | LFU       | `()`          | 0 bytes |
//! | LFUDA     | `LfudaMeta`   | 16 bytes |

/// Metadata for LFUDA (LFU with Dynamic Aging) cache entries.
///
/// The entry's weight is `frequency + age`, where `age` is the value of the
/// cache's global age the last time the weight was recomputed (on insertion
/// and on every hit).
///
/// # Examples
///
/// ```
/// use freqcache::meta::LfudaMeta;
///
/// let mut meta = LfudaMeta::new(1, 10);
/// assert_eq!(meta.weight(), 11);
///
/// // A hit while the global age is 14.
/// meta.promote(14);
/// assert_eq!(meta.frequency, 2);
/// assert_eq!(meta.weight(), 16);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LfudaMeta {
    /// Number of visits since the entry was (re)inserted.
    pub frequency: u64,
    /// Global age captured when the weight was last recomputed.
    pub age: u64,
}

impl LfudaMeta {
    /// Creates metadata with the given frequency and age snapshot.
    #[inline]
    pub fn new(frequency: u64, age: u64) -> Self {
        Self { frequency, age }
    }

    /// Replacement weight of the entry. Saturates at `u64::MAX`.
    #[inline]
    pub fn weight(&self) -> u64 {
        self.frequency.saturating_add(self.age)
    }

    /// Records one more visit under `global_age` and returns the new weight.
    #[inline]
    pub fn promote(&mut self, global_age: u64) -> u64 {
        self.frequency = self.frequency.saturating_add(1);
        self.age = global_age;
        self.weight()
    }

    /// Resets the metadata for a slot reused by a freshly inserted key.
    #[inline]
    pub fn reset(&mut self, global_age: u64) -> u64 {
        self.frequency = 1;
        self.age = global_age;
        self.weight()
    }
}

//! Cache Entry Module
//!
//! A cached value stamped with its creation time. Validity is judged against
//! a TTL and an explicit `now`, so the caller decides which clock applies.

use serde::{Deserialize, Serialize};

// == Cache Entry ==
/// A cached value and when it was created.
///
/// Persisted as `{"data": ..., "timestamp": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    /// The cached value
    #[serde(rename = "data")]
    pub value: T,
    /// Creation timestamp (Unix milliseconds)
    #[serde(rename = "timestamp")]
    pub created_at: u64,
}

impl<T> CacheEntry<T> {
    // == Constructor ==
    pub fn new(value: T, created_at: u64) -> Self {
        Self { value, created_at }
    }

    // == Age ==
    /// Milliseconds since creation. A timestamp in the future counts as age 0.
    pub fn age_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.created_at)
    }

    /// Age in whole minutes, rounded, for log lines.
    pub fn age_minutes(&self, now_ms: u64) -> u64 {
        (self.age_ms(now_ms) + 30_000) / 60_000
    }

    // == Is Valid ==
    /// Valid while `now - created_at < ttl`.
    ///
    /// Boundary condition: at exactly `ttl` milliseconds of age the entry is
    /// already invalid.
    pub fn is_valid(&self, now_ms: u64, ttl_ms: u64) -> bool {
        self.age_ms(now_ms) < ttl_ms
    }

    // == Time To Live ==
    /// Remaining lifetime in milliseconds, 0 once expired.
    pub fn ttl_remaining_ms(&self, now_ms: u64, ttl_ms: u64) -> u64 {
        ttl_ms.saturating_sub(self.age_ms(now_ms))
    }

    /// Swaps the value while keeping the timestamp.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> CacheEntry<U> {
        CacheEntry {
            value: f(self.value),
            created_at: self.created_at,
        }
    }
}

//! Weather Cache Statistics Module
//!
//! Tracks where lookups were answered from: memory, persistent storage, or
//! the network.

use serde::Serialize;

// == Weather Stats ==
/// Weather cache performance counters.
#[derive(Debug, Clone, Default, Serialize)]
pub struct WeatherStats {
    /// Lookups answered by the in-memory tier
    pub memory_hits: u64,
    /// Lookups answered by persistent storage (then promoted)
    pub storage_hits: u64,
    /// Successful provider fetches
    pub fetches: u64,
    /// Provider fetches that failed or timed out
    pub failures: u64,
    /// Entries currently held in memory
    pub memory_entries: usize,
}

impl WeatherStats {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Share of lookups served without touching the network.
    ///
    /// Returns 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let hits = self.memory_hits + self.storage_hits;
        let total = hits + self.fetches + self.failures;
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }

    pub fn record_memory_hit(&mut self) {
        self.memory_hits += 1;
    }

    pub fn record_storage_hit(&mut self) {
        self.storage_hits += 1;
    }

    pub fn record_fetch(&mut self) {
        self.fetches += 1;
    }

    pub fn record_failure(&mut self) {
        self.failures += 1;
    }

    pub fn set_memory_entries(&mut self, count: usize) {
        self.memory_entries = count;
    }
}

//! Cache Statistics Module
//!
//! Tracks verdict cache hits, misses and writes.

use serde::Serialize;

// == Cache Stats ==
/// Verdict cache counters.
///
/// `hits`, `misses` and `sets` are cumulative; `entries_count` is the current
/// number of stored verdicts.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Lookups served from the cache
    pub hits: u64,
    /// Lookups that found nothing (absent, expired or unreadable)
    pub misses: u64,
    /// Successful writes
    pub sets: u64,
    /// Verdicts currently stored
    pub entries_count: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.total_requests();
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn total_requests(&self) -> u64 {
        self.hits.saturating_add(self.misses)
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_set(&mut self) {
        self.sets += 1;
    }

    pub fn set_entries_count(&mut self, count: usize) {
        self.entries_count = count;
    }
}

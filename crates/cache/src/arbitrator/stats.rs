//! Arbitrator counters

use serde::Serialize;

/// Counters kept by the workers, summed across shards
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Gets answered from memory
    pub hits: u64,
    /// Gets that had to consult disk
    pub misses: u64,
    /// Records loaded from disk into memory
    pub hydrations: u64,
    /// Accepted puts
    pub writes: u64,
    pub precondition_failures: u64,
    /// Storage failures surfaced to callers
    pub errors: u64,
    pub resident_entries: u64,
}

impl CacheStats {
    pub fn merge(&mut self, other: &CacheStats) {
        self.hits += other.hits;
        self.misses += other.misses;
        self.hydrations += other.hydrations;
        self.writes += other.writes;
        self.precondition_failures += other.precondition_failures;
        self.errors += other.errors;
        self.resident_entries += other.resident_entries;
    }

    /// Fraction of gets served from memory, 0.0 with no gets yet
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

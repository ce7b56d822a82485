//! Cache Statistics Module
//!
//! Tracks cache performance counters and the snapshot handed to callers.

use serde::Serialize;

// == Counters ==
/// Running hit/miss counters owned by a single cache instance.
///
/// Counters only ever grow; they live as long as the cache does.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Counters {
    pub hits: u64,
    pub misses: u64,
}

impl Counters {
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }
}

// == Cache Stats ==
/// Point-in-time view of a cache.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CacheStats {
    /// Number of entries currently stored (expired-but-unswept included)
    pub entries: usize,
    /// Number of successful retrievals
    pub hits: u64,
    /// Number of failed retrievals (key not found or expired)
    pub misses: u64,
    /// hits / (hits + misses), or 0.0 before any lookup
    pub hit_ratio: f64,
}

impl CacheStats {
    pub(crate) fn snapshot(entries: usize, counters: Counters) -> Self {
        Self {
            entries,
            hits: counters.hits,
            misses: counters.misses,
            hit_ratio: hit_ratio(counters.hits, counters.misses),
        }
    }

    /// Total number of lookups observed.
    pub fn lookups(&self) -> u64 {
        self.hits + self.misses
    }
}

// == Hit Ratio ==
/// Returns hits / (hits + misses), or 0.0 if no requests have been made.
fn hit_ratio(hits: u64, misses: u64) -> f64 {
    let total = hits + misses;
    if total == 0 {
        0.0
    } else {
        hits as f64 / total as f64
    }
}

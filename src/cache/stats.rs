//! Cache Statistics Module
//!
//! Tracks lookups per tier, misses, self-healed entries and evictions.

use serde::Serialize;

use crate::cache::Tier;

// == Cache Stats ==
/// Tracks cache activity since the manager was constructed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Lookups served by the hot tier
    pub memory_hits: u64,
    /// Lookups served by the durable tier
    pub durable_hits: u64,
    /// Lookups served by the session tier
    pub session_hits: u64,
    /// Lookups no tier could serve
    pub misses: u64,
    /// Expired, version-mismatched or malformed entries removed
    pub invalidations: u64,
    /// Entries removed by size management
    pub evictions: u64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total lookups served by any tier.
    pub fn hits(&self) -> u64 {
        self.memory_hits + self.durable_hits + self.session_hits
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits() + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits() as f64 / total as f64
        }
    }

    // == Recorders ==
    pub fn record_hit(&mut self, tier: Tier) {
        match tier {
            Tier::Memory => self.memory_hits += 1,
            Tier::Durable => self.durable_hits += 1,
            Tier::Session => self.session_hits += 1,
        }
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_invalidations(&mut self, count: usize) {
        self.invalidations += count as u64;
    }

    pub fn record_evictions(&mut self, count: usize) {
        self.evictions += count as u64;
    }
}

//! Cache status snapshot

use serde::Serialize;

use crate::cache::CacheStats;

/// Entry count of one tier and its bound, if it has one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TierStatus {
    /// Entries currently held under the cache namespace
    pub size: usize,
    /// Maximum entries retained, absent for unbounded tiers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_size: Option<usize>,
}

impl TierStatus {
    pub fn bounded(size: usize, max_size: usize) -> Self {
        Self {
            size,
            max_size: Some(max_size),
        }
    }

    pub fn unbounded(size: usize) -> Self {
        Self {
            size,
            max_size: None,
        }
    }
}

/// Point-in-time view of every tier plus the validity settings.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatus {
    /// Hot tier
    pub memory: TierStatus,
    /// Durable tier
    pub durable: TierStatus,
    /// Session tier
    pub session: TierStatus,
    /// Entry lifetime in milliseconds
    pub expire_duration_ms: u64,
    /// Schema version entries must carry
    pub version: String,
    /// Share of lookups served by any tier
    pub hit_rate: f64,
    /// Activity counters
    pub stats: CacheStats,
}

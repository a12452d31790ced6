//! Cache Module
//!
//! Tiered cache for rendered previews: an in-process hot tier in front of a
//! durable store and a session store, with expiry, schema versioning and
//! bounded eviction.

mod clock;
mod entry;
mod eviction;
mod hot;
mod key;
mod manager;
mod stats;


use std::fmt;

use serde::Serialize;

// Re-export public types
pub use clock::{current_timestamp_ms, Clock, ManualClock, SystemClock};
pub use entry::CacheEntry;
pub use hot::HotTier;
pub use key::{is_namespaced, CacheKey};
pub use manager::CacheManager;
pub use stats::CacheStats;

// == Tier ==
/// The level of the cache an entry lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// In-process hot tier
    Memory,
    /// Store surviving restarts
    Durable,
    /// Store scoped to the current session
    Session,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tier::Memory => "memory",
            Tier::Durable => "durable",
            Tier::Session => "session",
        };
        f.pad(name)
    }
}

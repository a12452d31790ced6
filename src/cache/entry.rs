//! Cache Entry Module
//!
//! Defines the record stored in every tier and its validity rules.

use serde::{Deserialize, Serialize};

// == Cache Entry ==
/// A cached payload plus the metadata needed to judge its validity.
///
/// Serialized as JSON in the storage tiers. A record missing any field fails
/// to deserialize and is treated as malformed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    /// The cached payload, usually a rendered HTML fragment
    pub data: T,
    /// Creation timestamp (Unix milliseconds), never updated
    pub timestamp: u64,
    /// Schema version current when the entry was written
    pub version: String,
    /// Original path the entry was cached under
    pub path: String,
}

impl<T> CacheEntry<T> {
    // == Constructor ==
    /// Creates a new entry stamped at `now_ms`.
    pub fn new(path: &str, data: T, version: &str, now_ms: u64) -> Self {
        Self {
            data,
            timestamp: now_ms,
            version: version.to_string(),
            path: path.to_string(),
        }
    }

    /// Milliseconds since the entry was written; 0 if the clock is behind it.
    pub fn age_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.timestamp)
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is expired once its age reaches `expire_ms`; an entry exactly
    /// `expire_ms` old is no longer served.
    pub fn is_expired(&self, now_ms: u64, expire_ms: u64) -> bool {
        self.age_ms(now_ms) >= expire_ms
    }

    // == Is Valid ==
    /// An entry is valid when it has a timestamp and version, the version
    /// matches `current_version`, and it has not expired.
    pub fn is_valid(&self, current_version: &str, now_ms: u64, expire_ms: u64) -> bool {
        if self.timestamp == 0 || self.version.is_empty() {
            return false;
        }
        self.version == current_version && !self.is_expired(now_ms, expire_ms)
    }
}

// == Entry Stamp ==
/// Minimal view of a stored record, enough to order it for eviction.
#[derive(Debug, Deserialize)]
pub(crate) struct EntryStamp {
    pub timestamp: u64,
}

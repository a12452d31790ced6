//! Preload and listing reports

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cache::Tier;

/// Outcome of checking a batch of paths against the cache.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PreloadReport {
    /// Paths with a valid entry in some tier
    pub cached: Vec<String>,
    /// Paths the caller still has to fetch and render
    pub missing: Vec<String>,
}

impl PreloadReport {
    /// True when nothing needs fetching.
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// One namespaced record found in a tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntrySummary {
    /// Tier holding the record
    pub tier: Tier,
    /// Storage key
    pub key: String,
    /// Original path, when the record parses
    pub path: Option<String>,
    /// Write time (Unix milliseconds), when the record parses
    pub timestamp: Option<u64>,
    /// Whether a lookup would serve this record right now
    pub valid: bool,
}

impl EntrySummary {
    /// Write time as a UTC date.
    pub fn written_at(&self) -> Option<DateTime<Utc>> {
        self.timestamp
            .and_then(|ms| i64::try_from(ms).ok())
            .and_then(DateTime::<Utc>::from_timestamp_millis)
    }
}

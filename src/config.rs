//! Configuration Module
//!
//! Handles loading and managing cache configuration from environment variables.

use std::env;
use std::time::Duration;

/// Schema tag written into every entry; entries carrying another tag are discarded.
pub const CACHE_VERSION: &str = "1.0";

/// Default namespace prefix for every key this cache owns.
pub const DEFAULT_PREFIX: &str = "file_browser_cache_";

/// Cache configuration parameters.
///
/// All values except the schema version can be configured via environment
/// variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Prefix isolating cache keys from unrelated data in the same store
    pub namespace_prefix: String,
    /// Current schema version tag
    pub version: String,
    /// Maximum number of entries held by the hot tier
    pub max_memory_entries: usize,
    /// Maximum number of namespaced entries per storage tier
    pub max_storage_entries: usize,
    /// Age at which an entry stops being valid
    pub expire_duration: Duration,
}

impl CacheConfig {
    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_PREFIX` - Namespace prefix (default: `file_browser_cache_`)
    /// - `CACHE_MAX_MEMORY_ENTRIES` - Hot tier bound (default: 50)
    /// - `CACHE_MAX_STORAGE_ENTRIES` - Per storage tier bound (default: 200)
    /// - `CACHE_EXPIRE_SECS` - Expiration in seconds (default: 1800)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            namespace_prefix: env::var("CACHE_PREFIX")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.namespace_prefix),
            version: defaults.version,
            max_memory_entries: env::var("CACHE_MAX_MEMORY_ENTRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_memory_entries),
            max_storage_entries: env::var("CACHE_MAX_STORAGE_ENTRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_storage_entries),
            expire_duration: env::var("CACHE_EXPIRE_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.expire_duration),
        }
    }

    /// Expiration duration in milliseconds, the unit entry timestamps use.
    pub fn expire_ms(&self) -> u64 {
        u64::try_from(self.expire_duration.as_millis()).unwrap_or(u64::MAX)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            namespace_prefix: DEFAULT_PREFIX.to_string(),
            version: CACHE_VERSION.to_string(),
            max_memory_entries: 50,
            max_storage_entries: 200,
            expire_duration: Duration::from_secs(30 * 60),
        }
    }
}

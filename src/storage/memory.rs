//! In-Memory Store
//!
//! Process-scoped key-value store. Serves as the session tier and as a
//! stand-in for browser storage in tests.

use std::collections::BTreeMap;

use crate::error::{Result, StorageError};
use crate::storage::{used_bytes, KeyValueStore};

// == Memory Store ==
/// Key-value store held in memory for the lifetime of the process.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    /// Stored items
    items: BTreeMap<String, String>,
    /// Optional byte quota over all keys and values
    quota_bytes: Option<usize>,
    /// When set, every operation fails
    unavailable: bool,
}

impl MemoryStore {
    // == Constructor ==
    /// Creates an empty store without a quota.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store rejecting writes beyond `quota_bytes`.
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            quota_bytes: Some(quota_bytes),
            ..Self::default()
        }
    }

    // == Availability ==
    /// Makes every subsequent operation fail (or succeed again).
    pub fn set_unavailable(&mut self, unavailable: bool) {
        self.unavailable = unavailable;
    }

    /// Changes the byte quota; `None` removes it.
    pub fn set_quota(&mut self, quota_bytes: Option<usize>) {
        self.quota_bytes = quota_bytes;
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable {
            Err(StorageError::Unavailable("memory store disabled".to_string()))
        } else {
            Ok(())
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        self.check_available()?;
        Ok(self.items.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        self.check_available()?;

        if let Some(quota) = self.quota_bytes {
            let others = used_bytes(self.items.iter().filter(|(k, _)| k.as_str() != key));
            let needed = others + key.len() + value.len();
            if needed > quota {
                return Err(StorageError::QuotaExceeded { needed, quota });
            }
        }

        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.check_available()?;
        self.items.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        self.check_available()?;
        Ok(self.items.keys().cloned().collect())
    }

    fn len(&self) -> Result<usize> {
        self.check_available()?;
        Ok(self.items.len())
    }
}

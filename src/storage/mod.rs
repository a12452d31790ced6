//! Storage Module
//!
//! Key-value stores backing the durable and session cache tiers.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::error::Result;

// == Key Value Store ==
/// String-keyed store holding serialized entries.
///
/// Stores may be shared with data that does not belong to the cache, so
/// callers must only touch keys they own.
pub trait KeyValueStore {
    /// Returns the value stored under `key`, if any.
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn write(&mut self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`. Removing an absent key succeeds.
    fn remove(&mut self, key: &str) -> Result<()>;

    /// Returns every key currently stored.
    fn keys(&self) -> Result<Vec<String>>;

    /// Returns the number of stored keys.
    fn len(&self) -> Result<usize> {
        Ok(self.keys()?.len())
    }
}

/// Total bytes a key space occupies, counted the way browser storage quotas are.
pub(crate) fn used_bytes<'a>(items: impl Iterator<Item = (&'a String, &'a String)>) -> usize {
    items.map(|(k, v)| k.len() + v.len()).sum()
}

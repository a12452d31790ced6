//! Storage Tier Maintenance
//!
//! Namespace-scoped sweeps over a key-value store: counting, purging invalid
//! records, clearing, and bounding the entry count by write timestamp.

use serde::de::DeserializeOwned;
use tracing::warn;

use crate::cache::key::is_namespaced;
use crate::cache::{entry::EntryStamp, CacheEntry};
use crate::error::Result;
use crate::storage::KeyValueStore;

/// Keys in `store` owned by the namespace `prefix`.
pub(crate) fn namespaced_keys<K>(store: &K, prefix: &str) -> Result<Vec<String>>
where
    K: KeyValueStore + ?Sized,
{
    Ok(store
        .keys()?
        .into_iter()
        .filter(|key| is_namespaced(key, prefix))
        .collect())
}

// == Purge Invalid ==
/// Removes every namespaced record that fails to parse or fails `is_valid`.
///
/// Keys are collected first and removed afterwards. A key that cannot be read
/// is left for a later sweep. Returns the number removed.
pub(crate) fn purge_invalid<K, T>(
    store: &mut K,
    prefix: &str,
    is_valid: impl Fn(&CacheEntry<T>) -> bool,
) -> Result<usize>
where
    K: KeyValueStore + ?Sized,
    T: DeserializeOwned,
{
    let mut doomed = Vec::new();
    for key in namespaced_keys(store, prefix)? {
        let raw = match store.read(&key) {
            Ok(raw) => raw,
            Err(err) => {
                warn!("Skipping cache record {}: {}", key, err);
                continue;
            }
        };
        let keep = raw
            .and_then(|raw| serde_json::from_str::<CacheEntry<T>>(&raw).ok())
            .is_some_and(|entry| is_valid(&entry));
        if !keep {
            doomed.push(key);
        }
    }

    Ok(remove_each(store, &doomed))
}

// == Remove Namespaced ==
/// Removes every namespaced key, leaving foreign keys untouched.
pub(crate) fn remove_namespaced<K>(store: &mut K, prefix: &str) -> Result<usize>
where
    K: KeyValueStore + ?Sized,
{
    let keys = namespaced_keys(store, prefix)?;
    Ok(remove_each(store, &keys))
}

/// Removes `keys` one by one, skipping failures. Returns the number removed.
fn remove_each<K>(store: &mut K, keys: &[String]) -> usize
where
    K: KeyValueStore + ?Sized,
{
    let mut removed = 0;
    for key in keys {
        match store.remove(key) {
            Ok(()) => removed += 1,
            Err(err) => warn!("Failed to remove cache record {}: {}", key, err),
        }
    }
    removed
}

// == Evict Oldest ==
/// Bounds the namespaced entry count to `max_entries`.
///
/// Records without a readable timestamp are dropped first. If the remainder
/// still exceeds the bound, the surplus with the oldest write timestamps is
/// removed. `newest` is the key just written: it sorts after every record
/// sharing its timestamp, so it is the last candidate for eviction. Returns
/// `(evicted, dropped_unreadable)`.
pub(crate) fn evict_oldest<K>(
    store: &mut K,
    prefix: &str,
    max_entries: usize,
    newest: Option<&str>,
) -> Result<(usize, usize)>
where
    K: KeyValueStore + ?Sized,
{
    let mut stamped: Vec<(u64, bool, String)> = Vec::new();
    let mut unreadable = Vec::new();

    for key in namespaced_keys(store, prefix)? {
        let raw = match store.read(&key) {
            Ok(raw) => raw,
            Err(err) => {
                warn!("Skipping cache record {}: {}", key, err);
                continue;
            }
        };
        match raw.and_then(|raw| serde_json::from_str::<EntryStamp>(&raw).ok()) {
            Some(stamp) => {
                let is_newest = newest == Some(key.as_str());
                stamped.push((stamp.timestamp, is_newest, key));
            }
            None => {
                warn!("Removing unreadable cache record {}", key);
                unreadable.push(key);
            }
        }
    }
    let dropped = remove_each(store, &unreadable);

    if stamped.len() <= max_entries {
        return Ok((0, dropped));
    }

    stamped.sort_by_key(|(timestamp, is_newest, _)| (*timestamp, *is_newest));
    let surplus_count = stamped.len() - max_entries;
    let surplus: Vec<String> = stamped
        .into_iter()
        .take(surplus_count)
        .map(|(_, _, key)| key)
        .collect();
    Ok((remove_each(store, &surplus), dropped))
}

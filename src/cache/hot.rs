//! Hot Tier Module
//!
//! In-process entry map with insertion-order eviction.

use std::collections::{HashMap, VecDeque};

use crate::cache::CacheEntry;

// == Hot Tier ==
/// In-process tier holding deserialized entries.
///
/// Keys are tracked in a VecDeque where:
/// - Front = earliest inserted
/// - Back = latest inserted
///
/// Reads never reorder keys; only inserts do.
#[derive(Debug)]
pub struct HotTier<T> {
    /// Entries by storage key
    entries: HashMap<String, CacheEntry<T>>,
    /// Keys in insertion order
    order: VecDeque<String>,
}

impl<T> Default for HotTier<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
        }
    }
}

impl<T> HotTier<T> {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&CacheEntry<T>> {
        self.entries.get(key)
    }

    // == Insert ==
    /// Stores an entry as the most recent insertion.
    ///
    /// Replacing an existing key moves it to the back of the eviction order.
    pub fn insert(&mut self, key: &str, entry: CacheEntry<T>) {
        if self.entries.insert(key.to_string(), entry).is_some() {
            self.order.retain(|k| k != key);
        }
        self.order.push_back(key.to_string());
    }

    // == Remove ==
    pub fn remove(&mut self, key: &str) -> Option<CacheEntry<T>> {
        let removed = self.entries.remove(key);
        if removed.is_some() {
            self.order.retain(|k| k != key);
        }
        removed
    }

    // == Evict Overflow ==
    /// Removes earliest-inserted entries until at most `max_entries` remain.
    ///
    /// Returns the evicted keys, oldest first.
    pub fn evict_overflow(&mut self, max_entries: usize) -> Vec<String> {
        let mut evicted = Vec::new();
        while self.entries.len() > max_entries {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            self.entries.remove(&oldest);
            evicted.push(oldest);
        }
        evicted
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries from earliest to latest insertion.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CacheEntry<T>)> {
        self.order
            .iter()
            .filter_map(|k| self.entries.get(k).map(|e| (k.as_str(), e)))
    }
}

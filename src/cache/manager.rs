//! Cache Manager Module
//!
//! Coordinates the hot, durable and session tiers: tiered lookup with
//! promotion, write-through with session fallback, self-healing of invalid
//! entries and per-tier size bounds.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cache::eviction;
use crate::cache::{CacheEntry, CacheKey, CacheStats, Clock, HotTier, SystemClock, Tier};
use crate::config::CacheConfig;
use crate::models::{CacheStatus, EntrySummary, PreloadReport, TierStatus};
use crate::storage::KeyValueStore;

const STORAGE_TIERS: [Tier; 2] = [Tier::Durable, Tier::Session];

// == Cache Manager ==
/// Tiered preview cache.
///
/// Storage failures never reach the caller: a failed read is a miss and a
/// failed durable write falls back to the session store. A missing entry is
/// always a safe answer.
pub struct CacheManager<D, S, T = String> {
    /// Namespace, version, bounds and lifetime
    config: CacheConfig,
    /// In-process tier
    hot: HotTier<T>,
    /// Store surviving restarts
    durable: D,
    /// Store scoped to the session
    session: S,
    /// Time source for stamping and expiry
    clock: Box<dyn Clock>,
    /// Activity counters
    stats: CacheStats,
}

impl<D, S, T> CacheManager<D, S, T>
where
    D: KeyValueStore,
    S: KeyValueStore,
    T: Serialize + DeserializeOwned + Clone,
{
    // == Constructor ==
    /// Creates a manager over the given stores using the wall clock.
    ///
    /// Invalid entries left in either store by earlier sessions are swept.
    pub fn new(config: CacheConfig, durable: D, session: S) -> Self {
        Self::with_clock(config, durable, session, SystemClock)
    }

    /// Creates a manager with an explicit time source.
    pub fn with_clock(
        config: CacheConfig,
        durable: D,
        session: S,
        clock: impl Clock + 'static,
    ) -> Self {
        let mut manager = Self {
            config,
            hot: HotTier::new(),
            durable,
            session,
            clock: Box::new(clock),
            stats: CacheStats::new(),
        };
        manager.clean_expired_cache();
        manager
    }

    // == Cache Key ==
    /// Storage key for `path` under this cache's namespace.
    pub fn cache_key(&self, path: &str) -> CacheKey {
        CacheKey::derive(&self.config.namespace_prefix, path)
    }

    fn is_valid<U>(&self, entry: &CacheEntry<U>, now_ms: u64) -> bool {
        entry.is_valid(&self.config.version, now_ms, self.config.expire_ms())
    }

    // == Get ==
    /// Looks `path` up in the hot, durable and session tiers, in that order.
    ///
    /// A hit in a slower tier is copied into the hot tier. Invalid entries met
    /// on the way are removed from their tier.
    pub fn get(&mut self, path: &str) -> Option<T> {
        let key = self.cache_key(path);
        let now = self.clock.now_ms();

        if let Some(entry) = self.hot.get(key.as_str()) {
            if self.is_valid(entry, now) {
                let data = entry.data.clone();
                debug!("Memory cache hit: {}", path);
                self.stats.record_hit(Tier::Memory);
                return Some(data);
            }
            self.hot.remove(key.as_str());
            self.stats.record_invalidations(1);
        }

        for tier in STORAGE_TIERS {
            if let Some(entry) = self.lookup_stored(tier, &key, now) {
                let data = entry.data.clone();
                self.hot.insert(key.as_str(), entry);
                self.manage_memory_cache_size();
                debug!("{} cache hit: {}", tier, path);
                self.stats.record_hit(tier);
                return Some(data);
            }
        }

        self.stats.record_miss();
        None
    }

    /// Reads and validates one storage tier, removing the record if it is unusable.
    fn lookup_stored(&mut self, tier: Tier, key: &CacheKey, now: u64) -> Option<CacheEntry<T>> {
        let raw = match self.store(tier)?.read(key.as_str()) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                warn!("Failed to read {} cache entry {}: {}", tier, key, err);
                return None;
            }
        };

        match serde_json::from_str::<CacheEntry<T>>(&raw) {
            Ok(entry) if self.is_valid(&entry, now) => return Some(entry),
            Ok(entry) if entry.version != self.config.version => debug!(
                "Discarding {} entry for {} (v{} vs v{})",
                tier, entry.path, entry.version, self.config.version
            ),
            Ok(entry) => debug!("Discarding expired {} entry for {}", tier, entry.path),
            Err(err) => warn!("Discarding malformed {} entry {}: {}", tier, key, err),
        }

        self.stats.record_invalidations(1);
        self.remove_stored(tier, key);
        None
    }

    // == Set ==
    /// Caches `data` for `path`.
    ///
    /// The entry always goes to the hot tier. With `persistent` it is also
    /// written to the durable store, falling back to the session store if that
    /// write fails; otherwise it goes straight to the session store. The copy
    /// in the tier not written is dropped so the two never disagree.
    pub fn set(&mut self, path: &str, data: T, persistent: bool) {
        let key = self.cache_key(path);
        let entry = CacheEntry::new(path, data, &self.config.version, self.clock.now_ms());
        let serialized = serde_json::to_string(&entry);

        self.hot.insert(key.as_str(), entry);
        self.manage_memory_cache_size();

        let serialized = match serialized {
            Ok(serialized) => serialized,
            Err(err) => {
                warn!("Failed to serialize cache entry for {}: {}", path, err);
                return;
            }
        };

        if persistent {
            match self.durable.write(key.as_str(), &serialized) {
                Ok(()) => {
                    debug!("Cached {} in durable storage", path);
                    self.remove_stored(Tier::Session, &key);
                    self.manage_storage_cache_size(Tier::Durable, &key);
                    return;
                }
                Err(err) => warn!(
                    "Durable write failed for {}, falling back to session storage: {}",
                    path, err
                ),
            }
        }

        match self.session.write(key.as_str(), &serialized) {
            Ok(()) => {
                debug!("Cached {} in session storage", path);
                self.remove_stored(Tier::Durable, &key);
                self.manage_storage_cache_size(Tier::Session, &key);
            }
            Err(err) => warn!("Failed to cache {} in session storage: {}", path, err),
        }
    }

    // == Delete ==
    /// Removes `path` from every tier. Deleting an absent path is a no-op.
    pub fn delete(&mut self, path: &str) {
        let key = self.cache_key(path);
        self.hot.remove(key.as_str());
        for tier in STORAGE_TIERS {
            self.remove_stored(tier, &key);
        }
    }

    // == Clear All ==
    /// Removes every entry this cache owns from all tiers.
    ///
    /// Keys outside the namespace are left alone.
    pub fn clear_all(&mut self) {
        let mut removed = self.hot.len();
        self.hot.clear();

        let prefix = &self.config.namespace_prefix;
        for (tier, result) in [
            (Tier::Durable, eviction::remove_namespaced(&mut self.durable, prefix)),
            (Tier::Session, eviction::remove_namespaced(&mut self.session, prefix)),
        ] {
            match result {
                Ok(count) => removed += count,
                Err(err) => warn!("Failed to clear {} cache: {}", tier, err),
            }
        }

        info!("Cleared all cache entries ({} removed)", removed);
    }

    // == Clean Expired ==
    /// Removes expired, version-mismatched and malformed entries from both
    /// storage tiers.
    ///
    /// Runs once at construction. Returns the number of entries removed.
    pub fn clean_expired_cache(&mut self) -> usize {
        let now = self.clock.now_ms();
        let version = self.config.version.as_str();
        let expire_ms = self.config.expire_ms();
        let prefix = self.config.namespace_prefix.as_str();
        let is_valid = |entry: &CacheEntry<T>| entry.is_valid(version, now, expire_ms);

        let mut total = 0;
        for (tier, result) in [
            (Tier::Durable, eviction::purge_invalid(&mut self.durable, prefix, is_valid)),
            (Tier::Session, eviction::purge_invalid(&mut self.session, prefix, is_valid)),
        ] {
            match result {
                Ok(0) => {}
                Ok(count) => {
                    info!("Removed {} invalid {} cache entries", count, tier);
                    total += count;
                }
                Err(err) => warn!("Failed to sweep {} cache: {}", tier, err),
            }
        }

        self.stats.record_invalidations(total);
        total
    }

    // == Size Management ==
    /// Evicts the earliest-inserted hot entries beyond the hot tier bound.
    fn manage_memory_cache_size(&mut self) {
        let evicted = self.hot.evict_overflow(self.config.max_memory_entries);
        if !evicted.is_empty() {
            debug!("Evicted {} memory cache entries", evicted.len());
            self.stats.record_evictions(evicted.len());
        }
    }

    /// Evicts the oldest-written entries beyond the storage bound of `tier`.
    ///
    /// `written` is the key just stored; it loses timestamp ties to older keys.
    fn manage_storage_cache_size(&mut self, tier: Tier, written: &CacheKey) {
        let prefix = &self.config.namespace_prefix;
        let max_entries = self.config.max_storage_entries;
        let newest = Some(written.as_str());
        let result = match tier {
            Tier::Durable => eviction::evict_oldest(&mut self.durable, prefix, max_entries, newest),
            Tier::Session => eviction::evict_oldest(&mut self.session, prefix, max_entries, newest),
            Tier::Memory => return self.manage_memory_cache_size(),
        };

        match result {
            Ok((evicted, dropped)) => {
                if evicted > 0 {
                    info!("Evicted {} old {} cache entries", evicted, tier);
                }
                self.stats.record_evictions(evicted);
                self.stats.record_invalidations(dropped);
            }
            Err(err) => warn!("Failed to manage {} cache size: {}", tier, err),
        }
    }

    // == Status ==
    /// Snapshot of tier sizes, bounds, lifetime and version. Read-only.
    pub fn status(&self) -> CacheStatus {
        CacheStatus {
            memory: TierStatus::bounded(self.hot.len(), self.config.max_memory_entries),
            durable: TierStatus::bounded(
                self.count_stored(Tier::Durable),
                self.config.max_storage_entries,
            ),
            session: TierStatus::unbounded(self.count_stored(Tier::Session)),
            expire_duration_ms: self.config.expire_ms(),
            version: self.config.version.clone(),
            hit_rate: self.stats.hit_rate(),
            stats: self.stats.clone(),
        }
    }

    fn count_stored(&self, tier: Tier) -> usize {
        self.store(tier)
            .and_then(|store| eviction::namespaced_keys(store, &self.config.namespace_prefix).ok())
            .map_or(0, |keys| keys.len())
    }

    // == Contains ==
    /// True when some tier holds a valid entry for `path`.
    ///
    /// Unlike [`get`](Self::get) this neither promotes nor removes anything.
    pub fn contains(&self, path: &str) -> bool {
        let key = self.cache_key(path);
        let now = self.clock.now_ms();

        if self.hot.get(key.as_str()).is_some_and(|e| self.is_valid(e, now)) {
            return true;
        }

        STORAGE_TIERS.into_iter().any(|tier| {
            self.store(tier)
                .and_then(|store| store.read(key.as_str()).ok().flatten())
                .and_then(|raw| serde_json::from_str::<CacheEntry<T>>(&raw).ok())
                .is_some_and(|entry| self.is_valid(&entry, now))
        })
    }

    // == Preload ==
    /// Splits `paths` into those already cached and those the caller must
    /// fetch. Leaves every tier untouched.
    pub fn preload_paths<I, P>(&self, paths: I) -> PreloadReport
    where
        I: IntoIterator<Item = P>,
        P: AsRef<str>,
    {
        let mut report = PreloadReport::default();
        for path in paths {
            let path = path.as_ref();
            if self.contains(path) {
                debug!("Preload path already cached: {}", path);
                report.cached.push(path.to_string());
            } else {
                debug!("Preload path needs fetching: {}", path);
                report.missing.push(path.to_string());
            }
        }
        info!(
            "Preload check: {} cached, {} missing",
            report.cached.len(),
            report.missing.len()
        );
        report
    }

    // == Entries ==
    /// Every namespaced record across all tiers, hot tier first in insertion
    /// order. Records that fail to parse are listed without path or timestamp.
    pub fn entries(&self) -> Vec<EntrySummary> {
        let now = self.clock.now_ms();
        let mut summaries: Vec<EntrySummary> = self
            .hot
            .iter()
            .map(|(key, entry)| EntrySummary {
                tier: Tier::Memory,
                key: key.to_string(),
                path: Some(entry.path.clone()),
                timestamp: Some(entry.timestamp),
                valid: self.is_valid(entry, now),
            })
            .collect();

        for tier in STORAGE_TIERS {
            let Some(store) = self.store(tier) else {
                continue;
            };
            let keys = match eviction::namespaced_keys(store, &self.config.namespace_prefix) {
                Ok(keys) => keys,
                Err(err) => {
                    warn!("Failed to list {} cache: {}", tier, err);
                    continue;
                }
            };
            for key in keys {
                let parsed = store
                    .read(&key)
                    .ok()
                    .flatten()
                    .and_then(|raw| serde_json::from_str::<CacheEntry<serde_json::Value>>(&raw).ok());
                summaries.push(EntrySummary {
                    tier,
                    path: parsed.as_ref().map(|e| e.path.clone()),
                    timestamp: parsed.as_ref().map(|e| e.timestamp),
                    valid: parsed.as_ref().is_some_and(|e| self.is_valid(e, now)),
                    key,
                });
            }
        }
        summaries
    }

    // == Accessors ==
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Original paths held by the hot tier, earliest inserted first.
    pub fn hot_paths(&self) -> Vec<String> {
        self.hot.iter().map(|(_, entry)| entry.path.clone()).collect()
    }

    pub fn durable(&self) -> &D {
        &self.durable
    }

    pub fn durable_mut(&mut self) -> &mut D {
        &mut self.durable
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut S {
        &mut self.session
    }

    // == Store Helpers ==
    fn store(&self, tier: Tier) -> Option<&dyn KeyValueStore> {
        match tier {
            Tier::Durable => Some(&self.durable),
            Tier::Session => Some(&self.session),
            Tier::Memory => None,
        }
    }

    fn store_mut(&mut self, tier: Tier) -> Option<&mut dyn KeyValueStore> {
        match tier {
            Tier::Durable => Some(&mut self.durable),
            Tier::Session => Some(&mut self.session),
            Tier::Memory => None,
        }
    }

    fn remove_stored(&mut self, tier: Tier, key: &CacheKey) {
        if let Some(store) = self.store_mut(tier) {
            if let Err(err) = store.remove(key.as_str()) {
                warn!("Failed to remove {} cache entry {}: {}", tier, key, err);
            }
        }
    }
}

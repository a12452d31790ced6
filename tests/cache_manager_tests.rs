//! Integration Tests for the Cache Manager
//!
//! Exercises tiered lookup, expiry, versioning, eviction and fallback through
//! the public API with in-memory stores and a manual clock.

use std::time::Duration;

use preview_cache::cache::CacheKey;
use preview_cache::{
    CacheConfig, CacheEntry, CacheManager, KeyValueStore, ManualClock, MemoryStore,
};

// == Helper Functions ==

const T0: u64 = 1_700_000_000_000;

type TestCache = CacheManager<MemoryStore, MemoryStore>;

fn config() -> CacheConfig {
    CacheConfig::default()
}

fn cache_with(config: CacheConfig, durable: MemoryStore, session: MemoryStore) -> (TestCache, ManualClock) {
    let clock = ManualClock::new(T0);
    let cache = CacheManager::with_clock(config, durable, session, clock.clone());
    (cache, clock)
}

fn new_cache() -> (TestCache, ManualClock) {
    cache_with(config(), MemoryStore::new(), MemoryStore::new())
}

fn key(path: &str) -> String {
    CacheKey::derive(&config().namespace_prefix, path).as_str().to_string()
}

fn raw_entry(path: &str, data: &str, version: &str, timestamp: u64) -> String {
    serde_json::to_string(&CacheEntry::new(path, data.to_string(), version, timestamp)).unwrap()
}

fn expire_ms() -> u64 {
    config().expire_ms()
}

// == Round Trip ==

#[test]
fn test_set_then_get_returns_data() {
    let (mut cache, _) = new_cache();

    cache.set("docs/guide.md", "<h1>Guide</h1>".to_string(), true);

    assert_eq!(cache.get("docs/guide.md"), Some("<h1>Guide</h1>".to_string()));
    assert!(cache.durable().read(&key("docs/guide.md")).unwrap().is_some());
    assert!(cache.session().read(&key("docs/guide.md")).unwrap().is_none());
}

#[test]
fn test_non_persistent_set_goes_to_session() {
    let (mut cache, _) = new_cache();

    cache.set("notes.txt", "<pre>hi</pre>".to_string(), false);

    assert!(cache.durable().read(&key("notes.txt")).unwrap().is_none());
    assert!(cache.session().read(&key("notes.txt")).unwrap().is_some());
    assert_eq!(cache.get("notes.txt"), Some("<pre>hi</pre>".to_string()));
}

#[test]
fn test_overwrite_moves_entry_between_tiers() {
    let (mut cache, _) = new_cache();

    cache.set("a.md", "v1".to_string(), true);
    cache.set("a.md", "v2".to_string(), false);

    assert!(cache.durable().read(&key("a.md")).unwrap().is_none());
    assert_eq!(cache.get("a.md"), Some("v2".to_string()));
}

#[test]
fn test_get_unknown_path_is_miss() {
    let (mut cache, _) = new_cache();

    assert_eq!(cache.get("missing.md"), None);
    assert_eq!(cache.stats().misses, 1);
}

// == Expiration ==

#[test]
fn test_expiration_boundary() {
    let (mut cache, clock) = new_cache();
    cache.set("docs/a.md", "<p>a</p>".to_string(), true);

    clock.set(T0 + expire_ms() - 1);
    assert_eq!(cache.get("docs/a.md"), Some("<p>a</p>".to_string()));

    clock.set(T0 + expire_ms() + 1);
    assert_eq!(cache.get("docs/a.md"), None);

    // Purged from every tier on the failed lookup
    let status = cache.status();
    assert_eq!(status.memory.size, 0);
    assert_eq!(status.durable.size, 0);
    assert_eq!(status.session.size, 0);
}

#[test]
fn test_expired_durable_entry_is_purged_on_get() {
    let (mut cache, clock) = new_cache();
    cache
        .durable_mut()
        .write(&key("old.md"), &raw_entry("old.md", "x", "1.0", T0))
        .unwrap();

    clock.advance(Duration::from_millis(expire_ms()));

    assert_eq!(cache.get("old.md"), None);
    assert!(cache.durable().read(&key("old.md")).unwrap().is_none());
    assert_eq!(cache.stats().invalidations, 1);
}

// == Version Invalidation ==

#[test]
fn test_version_mismatch_is_never_served() {
    let (mut cache, _) = new_cache();
    cache
        .durable_mut()
        .write(&key("a.md"), &raw_entry("a.md", "stale", "0.9", T0))
        .unwrap();
    cache
        .session_mut()
        .write(&key("a.md"), &raw_entry("a.md", "stale", "0.9", T0))
        .unwrap();

    assert_eq!(cache.get("a.md"), None);
    assert!(cache.durable().read(&key("a.md")).unwrap().is_none());
    assert!(cache.session().read(&key("a.md")).unwrap().is_none());
}

#[test]
fn test_construction_sweeps_invalid_entries() {
    let mut durable = MemoryStore::new();
    durable.write(&key("fresh.md"), &raw_entry("fresh.md", "ok", "1.0", T0)).unwrap();
    durable.write(&key("old-version.md"), &raw_entry("old-version.md", "x", "0.9", T0)).unwrap();
    durable
        .write(&key("expired.md"), &raw_entry("expired.md", "x", "1.0", T0 - expire_ms()))
        .unwrap();
    durable.write(&key("broken.md"), "{not json").unwrap();
    durable.write("pinnedItems", "{not json either").unwrap();

    let mut session = MemoryStore::new();
    session.write(&key("gone.md"), r#"{"data":"x","timestamp":1}"#).unwrap();

    let (cache, _) = cache_with(config(), durable, session);

    assert_eq!(
        cache.durable().keys().unwrap(),
        vec![key("fresh.md"), "pinnedItems".to_string()]
    );
    assert!(cache.session().keys().unwrap().is_empty());
    assert_eq!(cache.stats().invalidations, 4);
}

// == Size Bounds ==

#[test]
fn test_hot_tier_keeps_most_recent_insertions() {
    let (mut cache, clock) = new_cache();
    let max = cache.config().max_memory_entries;
    let extra = 7;

    let paths: Vec<String> = (0..max + extra).map(|i| format!("dir/file{i}.md")).collect();
    for path in &paths {
        clock.advance(Duration::from_millis(1));
        cache.set(path, format!("<p>{path}</p>"), true);
    }

    assert_eq!(cache.status().memory.size, max);
    assert_eq!(cache.hot_paths(), paths[extra..].to_vec());
    assert_eq!(cache.stats().evictions, extra as u64);
}

#[test]
fn test_hot_tier_reads_do_not_refresh_order() {
    let cfg = CacheConfig {
        max_memory_entries: 2,
        ..config()
    };
    let (mut cache, _) = cache_with(cfg, MemoryStore::new(), MemoryStore::new());

    cache.set("a", "A".to_string(), true);
    cache.set("b", "B".to_string(), true);
    assert!(cache.get("a").is_some());
    cache.set("c", "C".to_string(), true);

    assert_eq!(cache.hot_paths(), vec!["b".to_string(), "c".to_string()]);
}

#[test]
fn test_storage_tier_evicts_oldest_writes() {
    let cfg = CacheConfig {
        max_storage_entries: 3,
        ..config()
    };
    let (mut cache, clock) = cache_with(cfg, MemoryStore::new(), MemoryStore::new());
    cache.durable_mut().write("pinnedItems", "[]").unwrap();

    for name in ["e", "d", "c", "b", "a"] {
        clock.advance(Duration::from_millis(10));
        cache.set(name, name.to_uppercase(), true);
    }

    let mut keys = cache.durable().keys().unwrap();
    keys.sort();
    let mut expected = vec![key("a"), key("b"), key("c"), "pinnedItems".to_string()];
    expected.sort();
    assert_eq!(keys, expected);
    assert_eq!(cache.status().durable.size, 3);
}

#[test]
fn test_storage_eviction_ignores_reads() {
    let cfg = CacheConfig {
        max_memory_entries: 0,
        max_storage_entries: 2,
        ..config()
    };
    let (mut cache, clock) = cache_with(cfg, MemoryStore::new(), MemoryStore::new());

    cache.set("first", "1".to_string(), true);
    clock.advance(Duration::from_millis(10));
    cache.set("second", "2".to_string(), true);
    clock.advance(Duration::from_millis(10));

    // Reading does not refresh the write timestamp
    assert_eq!(cache.get("first"), Some("1".to_string()));
    cache.set("third", "3".to_string(), true);

    assert!(cache.durable().read(&key("first")).unwrap().is_none());
    assert!(cache.durable().read(&key("second")).unwrap().is_some());
    assert!(cache.durable().read(&key("third")).unwrap().is_some());
}

#[test]
fn test_storage_eviction_spares_latest_write_within_same_millisecond() {
    let cfg = CacheConfig {
        max_memory_entries: 0,
        max_storage_entries: 2,
        ..config()
    };
    // Clock never moves, so all three writes share a timestamp
    let (mut cache, _) = cache_with(cfg, MemoryStore::new(), MemoryStore::new());

    cache.set("m.md", "M".to_string(), true);
    cache.set("z.md", "Z".to_string(), true);
    cache.set("a.md", "A".to_string(), true);

    assert_eq!(cache.get("a.md"), Some("A".to_string()));
    assert_eq!(cache.status().durable.size, 2);
    assert!(cache.durable().read(&key("m.md")).unwrap().is_none());
}

// == Fallback ==

#[test]
fn test_durable_write_failure_falls_back_to_session() {
    let cfg = CacheConfig {
        max_memory_entries: 0,
        ..config()
    };
    let (mut cache, _) = cache_with(cfg, MemoryStore::with_quota(16), MemoryStore::new());

    cache.set("docs/large.md", "<p>too big for the quota</p>".to_string(), true);

    assert!(cache.durable().read(&key("docs/large.md")).unwrap().is_none());
    assert!(cache.session().read(&key("docs/large.md")).unwrap().is_some());
    // Hot tier holds nothing, so this is served by the session tier
    assert_eq!(
        cache.get("docs/large.md"),
        Some("<p>too big for the quota</p>".to_string())
    );
    assert_eq!(cache.stats().session_hits, 1);
}

#[test]
fn test_fallback_drops_stale_durable_copy() {
    let cfg = CacheConfig {
        max_memory_entries: 0,
        ..config()
    };
    let (mut cache, _) = cache_with(cfg, MemoryStore::new(), MemoryStore::new());

    cache.set("a.md", "old".to_string(), true);
    cache.durable_mut().set_quota(Some(1));
    cache.set("a.md", "new".to_string(), true);

    assert_eq!(cache.get("a.md"), Some("new".to_string()));
}

#[test]
fn test_unavailable_durable_store_is_a_miss() {
    let (mut cache, _) = new_cache();
    cache.set("s.md", "session".to_string(), false);
    cache.clear_all();
    cache
        .session_mut()
        .write(&key("s.md"), &raw_entry("s.md", "session", "1.0", T0))
        .unwrap();
    cache.durable_mut().set_unavailable(true);

    assert_eq!(cache.get("s.md"), Some("session".to_string()));
    assert_eq!(cache.status().durable.size, 0);

    cache.set("t.md", "T".to_string(), true);
    assert!(cache.session().read(&key("t.md")).unwrap().is_some());
}

#[test]
fn test_all_stores_failing_never_panics() {
    let mut durable = MemoryStore::new();
    durable.set_unavailable(true);
    let mut session = MemoryStore::new();
    session.set_unavailable(true);
    let (mut cache, _) = cache_with(config(), durable, session);

    cache.set("a.md", "A".to_string(), true);
    assert_eq!(cache.get("a.md"), Some("A".to_string()));
    cache.delete("a.md");
    cache.clear_all();
    assert_eq!(cache.get("a.md"), None);
}

// == Namespace Isolation ==

#[test]
fn test_clear_all_keeps_unrelated_keys() {
    let mut durable = MemoryStore::new();
    durable.write("pinnedItems", r#"["docs/a.md"]"#).unwrap();
    durable.write("theme", "dark").unwrap();
    let mut session = MemoryStore::new();
    session.write("scroll", "120").unwrap();
    let (mut cache, _) = cache_with(config(), durable, session);

    cache.set("a.md", "A".to_string(), true);
    cache.set("b.md", "B".to_string(), false);
    cache.clear_all();

    let status = cache.status();
    assert_eq!(status.memory.size, 0);
    assert_eq!(status.durable.size, 0);
    assert_eq!(status.session.size, 0);
    assert_eq!(
        cache.durable().keys().unwrap(),
        vec!["pinnedItems".to_string(), "theme".to_string()]
    );
    assert_eq!(cache.session().read("scroll").unwrap(), Some("120".to_string()));
}

// == Delete ==

#[test]
fn test_delete_is_idempotent() {
    let (mut cache, _) = new_cache();
    cache.set("a.md", "A".to_string(), true);
    cache
        .session_mut()
        .write(&key("a.md"), &raw_entry("a.md", "A", "1.0", T0))
        .unwrap();

    cache.delete("a.md");
    cache.delete("a.md");
    cache.delete("never-cached.md");

    assert!(!cache.contains("a.md"));
    assert!(cache.durable().read(&key("a.md")).unwrap().is_none());
    assert!(cache.session().read(&key("a.md")).unwrap().is_none());
    assert!(cache.hot_paths().is_empty());
}

// == Promotion ==

#[test]
fn test_durable_hit_is_promoted_to_hot_tier() {
    let (mut cache, _) = new_cache();
    cache
        .durable_mut()
        .write(&key("docs/p.md"), &raw_entry("docs/p.md", "<p>p</p>", "1.0", T0))
        .unwrap();
    assert!(cache.hot_paths().is_empty());

    assert_eq!(cache.get("docs/p.md"), Some("<p>p</p>".to_string()));
    assert_eq!(cache.hot_paths(), vec!["docs/p.md".to_string()]);

    // Second lookup is served from memory
    cache.durable_mut().remove(&key("docs/p.md")).unwrap();
    assert_eq!(cache.get("docs/p.md"), Some("<p>p</p>".to_string()));
    assert_eq!(cache.stats().durable_hits, 1);
    assert_eq!(cache.stats().memory_hits, 1);
}

// == Status and Preload ==

#[test]
fn test_status_snapshot() {
    let mut durable = MemoryStore::new();
    durable.write("unrelated", "1").unwrap();
    let (mut cache, _) = cache_with(config(), durable, MemoryStore::new());

    cache.set("a.md", "A".to_string(), true);
    cache.set("b.md", "B".to_string(), false);

    let status = cache.status();
    assert_eq!(status.memory.size, 2);
    assert_eq!(status.memory.max_size, Some(50));
    assert_eq!(status.durable.size, 1);
    assert_eq!(status.durable.max_size, Some(200));
    assert_eq!(status.session.size, 1);
    assert_eq!(status.session.max_size, None);
    assert_eq!(status.expire_duration_ms, 30 * 60 * 1000);
    assert_eq!(status.version, "1.0");
    assert_eq!(status.hit_rate, 0.0);

    let _ = cache.get("a.md");
    let _ = cache.get("missing.md");
    assert_eq!(cache.status().hit_rate, 0.5);
}

#[test]
fn test_preload_reports_without_mutating() {
    let (mut cache, clock) = new_cache();
    cache.set("cached.md", "C".to_string(), true);
    cache
        .durable_mut()
        .write(&key("stored.md"), &raw_entry("stored.md", "S", "1.0", T0))
        .unwrap();
    cache
        .durable_mut()
        .write(&key("stale.md"), &raw_entry("stale.md", "S", "0.1", T0))
        .unwrap();
    clock.advance(Duration::from_secs(1));

    let report = cache.preload_paths(["cached.md", "stored.md", "stale.md", "new.md"]);

    assert_eq!(report.cached, vec!["cached.md".to_string(), "stored.md".to_string()]);
    assert_eq!(report.missing, vec!["stale.md".to_string(), "new.md".to_string()]);
    assert!(!report.is_complete());

    // Nothing promoted, nothing purged
    assert_eq!(cache.hot_paths(), vec!["cached.md".to_string()]);
    assert!(cache.durable().read(&key("stale.md")).unwrap().is_some());
    assert_eq!(cache.stats().hits() + cache.stats().misses, 0);
}

#[test]
fn test_entries_lists_every_tier() {
    let (mut cache, _) = new_cache();
    cache.set("a.md", "A".to_string(), true);
    cache.session_mut().write(&key("bad.md"), "garbage").unwrap();

    let entries = cache.entries();
    assert_eq!(entries.len(), 3);
    assert!(entries.iter().any(|e| e.tier.to_string() == "memory" && e.valid));
    assert!(entries
        .iter()
        .any(|e| e.tier.to_string() == "durable" && e.path.as_deref() == Some("a.md")));
    assert!(entries
        .iter()
        .any(|e| e.tier.to_string() == "session" && !e.valid && e.path.is_none()));
}

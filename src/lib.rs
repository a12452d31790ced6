//! Preview Cache - tiered content cache for a static-site file browser
//!
//! Stores rendered file previews keyed by path across an in-process hot tier,
//! a durable store and a session store, with expiry, schema versioning and
//! bounded eviction.

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod storage;

pub use cache::{CacheEntry, CacheManager, Clock, ManualClock, SystemClock, Tier};
pub use config::CacheConfig;
pub use error::StorageError;
pub use storage::{FileStore, KeyValueStore, MemoryStore};

//! Snapshot and report models
//!
//! Serializable views of cache state returned by the manager and printed by
//! the command line interface.

pub mod reports;
pub mod status;

// Re-export commonly used types
pub use reports::{EntrySummary, PreloadReport};
pub use status::{CacheStatus, TierStatus};

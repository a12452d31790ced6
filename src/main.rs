//! Preview Cache command line tool
//!
//! Composition root: builds the durable file store, the session store and the
//! cache manager, then runs one command against them.

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use preview_cache::cli::{execute, Cli};
use preview_cache::{CacheConfig, CacheManager, FileStore, MemoryStore};

/// Main entry point for the preview cache tool.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging (stderr)
/// 2. Parse command line arguments
/// 3. Load cache configuration from environment variables
/// 4. Open the durable store and create the cache manager
/// 5. Run the requested command and print its output
fn main() -> Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "preview_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = CacheConfig::from_env();
    info!(
        "Configuration loaded: prefix={}, max_memory_entries={}, max_storage_entries={}, expire={}s",
        config.namespace_prefix,
        config.max_memory_entries,
        config.max_storage_entries,
        config.expire_duration.as_secs()
    );

    let mut durable = FileStore::open_or_recover(&cli.store)
        .with_context(|| format!("failed to open cache store {}", cli.store.display()))?;
    info!("Durable store: {}", durable.path().display());
    if let Some(quota) = cli.quota {
        durable = durable.with_quota(quota);
    }

    let mut cache: CacheManager<FileStore, MemoryStore> =
        CacheManager::new(config, durable, MemoryStore::new());

    let output = execute(&mut cache, &cli.command)?;
    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}

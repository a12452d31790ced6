//! Command execution
//!
//! Runs a parsed [`Command`] against a cache manager and renders the output.

use std::fs;

use anyhow::{bail, Context, Result};
use tracing::info;

use crate::cache::CacheManager;
use crate::cli::Command;
use crate::storage::KeyValueStore;

/// Runs `command` and returns the text to print.
pub fn execute<D, S>(cache: &mut CacheManager<D, S>, command: &Command) -> Result<String>
where
    D: KeyValueStore,
    S: KeyValueStore,
{
    match command {
        Command::Get { path } => match cache.get(path) {
            Some(content) => Ok(content),
            None => bail!("{path} is not cached"),
        },

        Command::Set {
            path,
            content,
            file,
            session,
        } => {
            let content = match (content, file) {
                (Some(content), _) => content.clone(),
                (None, Some(file)) => fs::read_to_string(file)
                    .with_context(|| format!("failed to read {}", file.display()))?,
                (None, None) => bail!("provide CONTENT or --file"),
            };
            cache.set(path, content, !session);
            info!("Cached {}", path);
            Ok(format!("Cached {path}"))
        }

        Command::Delete { path } => {
            cache.delete(path);
            Ok(format!("Deleted {path}"))
        }

        Command::Clear => {
            cache.clear_all();
            Ok("Cleared all cache entries".to_string())
        }

        Command::Status => {
            serde_json::to_string_pretty(&cache.status()).context("failed to render status")
        }

        Command::List => {
            let lines: Vec<String> = cache
                .entries()
                .into_iter()
                .map(|entry| {
                    let written = entry
                        .written_at()
                        .map_or_else(|| "-".to_string(), |at| at.to_rfc3339());
                    let state = if entry.valid { "valid" } else { "invalid" };
                    let path = entry.path.as_deref().unwrap_or(&entry.key);
                    format!("{:<8} {:<8} {:<26} {}", entry.tier, state, written, path)
                })
                .collect();
            Ok(lines.join("\n"))
        }

        Command::Preload { paths } => {
            let report = cache.preload_paths(paths);
            serde_json::to_string_pretty(&report).context("failed to render preload report")
        }
    }
}

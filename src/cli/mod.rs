//! Command Line Interface
//!
//! Argument definitions for the `preview_cache` binary and the command
//! execution against a [`CacheManager`](crate::cache::CacheManager).
//!
//! # Commands
//! - `get <PATH>` - Print the cached content for a path
//! - `set <PATH> [CONTENT] [--file F] [--session]` - Cache content for a path
//! - `delete <PATH>` - Remove a path from every tier
//! - `clear` - Remove every cache entry
//! - `status` - Print the status snapshot as JSON
//! - `list` - List namespaced records per tier
//! - `preload <PATH>...` - Report which paths are already cached

pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::execute;

/// Inspect and manage the file preview cache
#[derive(Parser, Debug)]
#[command(name = "preview_cache")]
#[command(about = "Tiered content cache for rendered file previews")]
#[command(version)]
pub struct Cli {
    /// File backing the durable tier
    #[arg(long, default_value = "preview-cache.json")]
    pub store: PathBuf,

    /// Byte quota for the durable tier; writes beyond it fall back to the session tier
    #[arg(long)]
    pub quota: Option<usize>,

    #[command(subcommand)]
    pub command: Command,
}

/// Cache operation to run.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print the cached content for a path
    Get { path: String },

    /// Cache content for a path
    Set {
        path: String,
        /// Content to cache
        content: Option<String>,
        /// Read the content from a file instead
        #[arg(long, conflicts_with = "content")]
        file: Option<PathBuf>,
        /// Keep the entry out of the durable tier
        #[arg(long)]
        session: bool,
    },

    /// Remove a path from every tier
    Delete { path: String },

    /// Remove every cache entry, leaving unrelated data alone
    Clear,

    /// Print the status snapshot as JSON
    Status,

    /// List namespaced records per tier
    List,

    /// Report which paths are already cached
    Preload {
        #[arg(required = true)]
        paths: Vec<String>,
    },
}

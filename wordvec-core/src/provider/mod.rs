//! Vector table providers
//!
//! Loaders that turn persisted word vectors into a [`VectorTable`]. Training
//! happens elsewhere; a provider only reads what a trainer wrote.

mod discovery;
mod snapshot;
mod text;

pub use discovery::{candidate_table_paths, find_table_path};
pub use snapshot::{load_snapshot, read_snapshot, save_snapshot, write_snapshot, TableSnapshot};
pub use text::{load_text, read_text, read_vocab_counts, save_text, write_text};

use crate::error::Result;
use crate::table::VectorTable;
use std::path::{Path, PathBuf};

/// File extension of binary table snapshots
pub const SNAPSHOT_EXTENSION: &str = "wvsnap";

/// Options applied while loading a table
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Minimum frequency count for inclusion (default: 1)
    pub min_count: u64,
    /// Lowercase tokens (default: true)
    pub lowercase: bool,
    /// Text tables start with a `<count> <dim>` line (default: true)
    pub has_header: bool,
    /// Optional `token count` file supplying frequency counts for text tables
    pub vocab_path: Option<PathBuf>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            min_count: 1,
            lowercase: true,
            has_header: true,
            vocab_path: None,
        }
    }
}

/// Source of an immutable vector table
pub trait TableProvider: Send + Sync {
    /// Build a fresh table
    fn load(&self) -> Result<VectorTable>;

    /// Human-readable description for logs
    fn describe(&self) -> String;
}

/// word2vec-style text table
#[derive(Debug, Clone)]
pub struct TextTableProvider {
    path: PathBuf,
    options: LoadOptions,
}

impl TextTableProvider {
    pub fn new(path: impl Into<PathBuf>, options: LoadOptions) -> Self {
        Self {
            path: path.into(),
            options,
        }
    }
}

impl TableProvider for TextTableProvider {
    fn load(&self) -> Result<VectorTable> {
        load_text(&self.path, &self.options)
    }

    fn describe(&self) -> String {
        format!("text table {}", self.path.display())
    }
}

/// Binary snapshot written by [`save_snapshot`]
#[derive(Debug, Clone)]
pub struct SnapshotProvider {
    path: PathBuf,
}

impl SnapshotProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TableProvider for SnapshotProvider {
    fn load(&self) -> Result<VectorTable> {
        load_snapshot(&self.path)
    }

    fn describe(&self) -> String {
        format!("snapshot {}", self.path.display())
    }
}

/// Whether a path names a binary snapshot
pub fn is_snapshot_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(SNAPSHOT_EXTENSION))
}

/// Pick the provider matching a file's extension
///
/// Snapshot options (min_count, case) were fixed when the snapshot was
/// written, so `options` only applies to text tables.
pub fn provider_for_path(path: &Path, options: LoadOptions) -> Box<dyn TableProvider> {
    if is_snapshot_path(path) {
        Box::new(SnapshotProvider::new(path))
    } else {
        Box::new(TextTableProvider::new(path, options))
    }
}

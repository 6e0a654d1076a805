//! Table configuration resolved from CLI flags and the environment.

use crate::error::ServerResult;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use wordvec_core::provider::{find_table_path, provider_for_path};
use wordvec_core::{LoadOptions, TableProvider};

/// Where the table lives and how to load it
#[derive(Debug, Clone)]
pub struct TableConfig {
    pub path: PathBuf,
    pub options: LoadOptions,
}

impl TableConfig {
    /// Resolve the table location, falling back to `WORDVEC_TABLE_PATH` and
    /// the default model directories when no path was given.
    pub fn resolve(explicit: Option<&Path>, options: LoadOptions) -> ServerResult<Self> {
        let path = find_table_path(explicit)?;
        tracing::debug!("Using table {}", path.display());
        Ok(Self { path, options })
    }

    /// Provider for the configured file, picked by extension
    pub fn provider(&self) -> Arc<dyn TableProvider> {
        Arc::from(provider_for_path(&self.path, self.options.clone()))
    }
}

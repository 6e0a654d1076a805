//! Query backend
//!
//! Owns the hot-swappable table and the provider that can rebuild it. Shared
//! by the request loop and the file watcher.

use crate::error::{ServerError, ServerResult};
use crate::rpc::protocol::ReloadResult;
use std::sync::Arc;
use tokio::sync::Mutex;
use wordvec_core::{QueryEngine, SharedTable, TableProvider};

/// Table state behind the CLI and the query server.
pub struct QueryBackend {
    /// Current table, swapped atomically on reload.
    table: Arc<SharedTable>,

    /// Where tables come from.
    provider: Arc<dyn TableProvider>,

    /// Serializes reloads so two triggers never load in parallel.
    reload_lock: Mutex<()>,
}

impl QueryBackend {
    /// Load the initial table from `provider`.
    pub async fn load(provider: Arc<dyn TableProvider>) -> ServerResult<Self> {
        let table = load_blocking(Arc::clone(&provider)).await?;
        Ok(Self::with_table(SharedTable::new(table), provider))
    }

    /// Wrap an already loaded table.
    pub fn with_table(table: SharedTable, provider: Arc<dyn TableProvider>) -> Self {
        Self {
            table: Arc::new(table),
            provider,
            reload_lock: Mutex::new(()),
        }
    }

    /// Engine over the current snapshot; one per request.
    pub fn engine(&self) -> QueryEngine {
        self.table.engine()
    }

    pub fn shared_table(&self) -> &Arc<SharedTable> {
        &self.table
    }

    /// Rebuild the table from the provider and swap it in.
    ///
    /// On failure the current table stays in place.
    pub async fn reload(&self) -> ServerResult<ReloadResult> {
        let _guard = self.reload_lock.lock().await;

        tracing::info!("Reloading {}", self.provider.describe());
        let table = load_blocking(Arc::clone(&self.provider))
            .await
            .map_err(|e| {
                tracing::warn!("Keeping current table, reload failed: {}", e);
                ServerError::Reload(e.to_string())
            })?;

        let vocabulary_size = table.len();
        let dimension = table.dimension();
        self.table.replace(table);

        Ok(ReloadResult {
            generation: self.table.generation(),
            vocabulary_size,
            dimension,
            source: self.provider.describe(),
        })
    }
}

/// Table loading does file IO and parsing; keep it off the async workers.
async fn load_blocking(
    provider: Arc<dyn TableProvider>,
) -> ServerResult<wordvec_core::VectorTable> {
    tokio::task::spawn_blocking(move || provider.load())
        .await
        .map_err(|e| ServerError::Reload(format!("loader task failed: {}", e)))?
        .map_err(ServerError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use wordvec_core::{VectorError, VectorTable};

    /// Provider that yields a different table on every call, failing on the third
    struct CountingProvider {
        calls: AtomicUsize,
    }

    impl TableProvider for CountingProvider {
        fn load(&self) -> wordvec_core::Result<VectorTable> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call == 2 {
                return Err(VectorError::not_found("vectors.txt"));
            }
            let mut builder = VectorTable::builder();
            for i in 0..=call {
                builder.push(format!("w{}", i), 1, vec![1.0, i as f32]);
            }
            builder.build()
        }

        fn describe(&self) -> String {
            "counting provider".to_string()
        }
    }

    #[tokio::test]
    async fn test_reload_swaps_and_failure_keeps_table() {
        let provider = Arc::new(CountingProvider {
            calls: AtomicUsize::new(0),
        });
        let backend = QueryBackend::load(provider).await.unwrap();
        assert_eq!(backend.engine().table().len(), 1);

        let held = backend.engine();
        let result = backend.reload().await.unwrap();
        assert_eq!(result.generation, 2);
        assert_eq!(result.vocabulary_size, 2);
        assert_eq!(backend.engine().table().len(), 2);
        // engines taken before the reload keep their snapshot
        assert_eq!(held.table().len(), 1);

        let err = backend.reload().await.unwrap_err();
        assert!(matches!(err, ServerError::Reload(_)));
        assert_eq!(backend.engine().table().len(), 2);
        assert_eq!(backend.shared_table().generation(), 2);
    }
}

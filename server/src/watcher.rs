//! Table file watcher for hot reload.

use crate::backend::QueryBackend;
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// Default debounce interval in milliseconds.
const DEFAULT_DEBOUNCE_MS: u64 = 300;

/// Watches the table file and reloads the backend when it changes.
pub struct TableWatcher {
    _watcher: RecommendedWatcher,
}

impl TableWatcher {
    /// Start watching `table_path`.
    ///
    /// The parent directory is watched rather than the file itself, since
    /// trainers usually replace a table by writing a new file and renaming it.
    pub fn new(table_path: &Path, backend: Arc<QueryBackend>) -> Result<Self, notify::Error> {
        let (tx, mut rx) = mpsc::channel::<Event>(100);

        let mut watcher = RecommendedWatcher::new(
            move |res: Result<Event, notify::Error>| {
                if let Ok(event) = res {
                    // Use blocking_send since this is called from a sync context
                    let _ = tx.blocking_send(event);
                }
            },
            Config::default(),
        )?;

        let target = table_path
            .canonicalize()
            .unwrap_or_else(|_| table_path.to_path_buf());
        let watch_dir = target
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        watcher.watch(&watch_dir, RecursiveMode::NonRecursive)?;

        tracing::info!("Watching {} for changes", target.display());

        tokio::spawn(async move {
            let debounce_duration = Duration::from_millis(DEFAULT_DEBOUNCE_MS);
            let mut pending: Option<Instant> = None;

            loop {
                tokio::select! {
                    event = rx.recv() => {
                        match event {
                            Some(event) => {
                                if is_relevant(&event, &target) {
                                    pending = Some(Instant::now());
                                }
                            }
                            None => break, // Channel closed
                        }
                    }
                    _ = tokio::time::sleep(Duration::from_millis(50)) => {
                        let ready = pending
                            .map(|since| since.elapsed() >= debounce_duration)
                            .unwrap_or(false);
                        if ready {
                            pending = None;
                            match backend.reload().await {
                                Ok(result) => tracing::info!(
                                    "Reloaded table: {} entries, generation {}",
                                    result.vocabulary_size,
                                    result.generation
                                ),
                                Err(e) => tracing::warn!("{}", e),
                            }
                        }
                    }
                }
            }
        });

        Ok(Self { _watcher: watcher })
    }
}

/// Create/modify/rename events that touch the table file.
fn is_relevant(event: &Event, target: &Path) -> bool {
    let kind_matches = matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_));
    kind_matches && event.paths.iter().any(|p| same_file(p, target))
}

fn same_file(path: &Path, target: &Path) -> bool {
    if path == target {
        return true;
    }
    match (path.canonicalize(), target.file_name()) {
        (Ok(canonical), _) => canonical == target,
        (Err(_), Some(name)) => path.file_name() == Some(name) && path.parent() == target.parent(),
        (Err(_), None) => false,
    }
}

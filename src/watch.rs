//! Config file watching.
//!
//! Watches the workspace root, `.vscode/` and `examples/` (each
//! non-recursively, when present) and reports debounced changes to any
//! file carrying an accepted config name.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use notify::{RecommendedWatcher, RecursiveMode};
use notify_debouncer_mini::{new_debouncer, DebounceEventResult, DebouncedEvent, Debouncer};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::config::locate::is_config_filename;
use crate::constants::{CONFIG_SEARCH_DIRS, WATCH_CHANNEL_CAPACITY, WATCH_DEBOUNCE_MS};

/// Receives changed config paths until dropped.
pub struct ConfigWatcher {
    _debouncer: Debouncer<RecommendedWatcher>,
    rx: mpsc::Receiver<PathBuf>,
}

impl ConfigWatcher {
    /// Starts watching the config directories under `root`.
    ///
    /// # Errors
    ///
    /// Fails if the platform watcher cannot be created or a directory that
    /// exists cannot be watched.
    pub fn start(root: &Path) -> Result<Self> {
        let (tx, rx) = mpsc::channel(WATCH_CHANNEL_CAPACITY);

        let mut debouncer = new_debouncer(
            Duration::from_millis(WATCH_DEBOUNCE_MS),
            move |res: DebounceEventResult| match res {
                Ok(events) => {
                    for path in events.iter().filter_map(config_event_path) {
                        // A full channel already has a refresh pending.
                        let _ = tx.try_send(path);
                    }
                }
                Err(e) => warn!("watch error: {}", e),
            },
        )
        .context("Failed to create file watcher")?;

        for dir in watch_dirs(root) {
            debouncer
                .watcher()
                .watch(&dir, RecursiveMode::NonRecursive)
                .with_context(|| format!("Failed to watch {}", dir.display()))?;
            debug!(dir = %dir.display(), "watching for config changes");
        }

        Ok(Self {
            _debouncer: debouncer,
            rx,
        })
    }

    /// Next changed config path; `None` once the watcher has stopped.
    pub async fn changed(&mut self) -> Option<PathBuf> {
        self.rx.recv().await
    }
}

/// Search directories under `root` that currently exist.
fn watch_dirs(root: &Path) -> Vec<PathBuf> {
    CONFIG_SEARCH_DIRS
        .iter()
        .map(|dir| if dir.is_empty() { root.to_path_buf() } else { root.join(dir) })
        .filter(|dir| dir.is_dir())
        .collect()
}

fn config_event_path(event: &DebouncedEvent) -> Option<PathBuf> {
    let name = event.path.file_name()?.to_str()?;
    is_config_filename(name).then(|| event.path.clone())
}

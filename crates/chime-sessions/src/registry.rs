//! Bookkeeping for which files are currently being tailed.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::{Mutex, Notify};

/// Registry of actively tailed paths.
///
/// Invariant: exactly one tailer per path. [`TailRegistry::begin`] is a
/// compare-and-insert, and the only code path that removes an entry is the
/// owning tailer's exit, so the key set always mirrors the set of live
/// tailer tasks.
///
/// Each entry holds the wake signal used to resume that path's tailer
/// after a write lands. [`Notify`] stores a single permit, so a wake
/// delivered while the tailer is mid-read is not lost.
#[derive(Debug, Default)]
pub struct TailRegistry {
    inner: Mutex<HashMap<PathBuf, Arc<Notify>>>,
}

impl TailRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `path` for a new tailer.
    ///
    /// Returns the wake signal the tailer must observe, or `None` when the
    /// path is already claimed.
    pub async fn begin(&self, path: &Path) -> Option<Arc<Notify>> {
        let mut inner = self.inner.lock().await;
        if inner.contains_key(path) {
            return None;
        }
        let wake = Arc::new(Notify::new());
        inner.insert(path.to_path_buf(), Arc::clone(&wake));
        Some(wake)
    }

    /// Release `path`. Called by the owning tailer as its final step.
    pub async fn finish(&self, path: &Path) {
        self.inner.lock().await.remove(path);
    }

    /// Wake the tailer for `path`, if one exists.
    pub async fn notify_write(&self, path: &Path) {
        let wake = self.inner.lock().await.get(path).cloned();
        if let Some(wake) = wake {
            wake.notify_one();
        }
    }

    /// Whether `path` currently has a live tailer.
    pub async fn is_tailing(&self, path: &Path) -> bool {
        self.inner.lock().await.contains_key(path)
    }

    /// Number of live tailers.
    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    /// Whether no tailers are live.
    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }
}

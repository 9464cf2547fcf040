//! Dynamic discovery of session log files.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chime_events::ChimeEvent;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher as _};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::registry::TailRegistry;
use crate::tailer::Tailer;

/// Errors from the session watcher.
#[derive(Debug, Error)]
pub enum WatchError {
    /// The filesystem watcher could not be created or pointed at the root.
    #[error("watch {path}: {source}")]
    Watch {
        /// Path the watch was being added for.
        path: PathBuf,
        /// Underlying watcher error.
        #[source]
        source: notify::Error,
    },
}

/// Watches a directory tree for session logs and keeps exactly one live
/// tailer per `.jsonl` file.
///
/// Two nesting levels are followed: `root/<project>/*.jsonl` (main session
/// logs) and `root/<project>/<session-id>/subagents/*.jsonl` (sub-agent
/// logs). Deeper paths are ignored.
///
/// Files found during the startup sweep are tailed from their current end;
/// files that appear afterwards are read from byte zero, since content may
/// land between creation and its notification.
pub struct SessionWatcher {
    root: PathBuf,
    events: mpsc::Sender<ChimeEvent>,
    registry: Arc<TailRegistry>,
    cancel: CancellationToken,
}

impl SessionWatcher {
    /// Create a watcher rooted at `root` that forwards classified events
    /// to `events`. All tasks observe `cancel`.
    pub fn new(
        root: impl Into<PathBuf>,
        events: mpsc::Sender<ChimeEvent>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            root: root.into(),
            events,
            registry: Arc::new(TailRegistry::new()),
            cancel,
        }
    }

    /// The registry tracking live tailers.
    #[must_use]
    pub fn registry(&self) -> Arc<TailRegistry> {
        Arc::clone(&self.registry)
    }

    /// Request shutdown. Idempotent and safe from any task; the watcher
    /// loop returns and every tailer exits at its next suspension point.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// Watch until shutdown.
    ///
    /// # Errors
    ///
    /// Fails only when the filesystem watcher cannot be created or the
    /// root itself cannot be watched. Everything after that — unreadable
    /// subdirectories, failed watch additions, watcher errors — is logged
    /// and skipped without aborting the loop.
    pub async fn run(&self) -> Result<(), WatchError> {
        let (fs_tx, mut fs_rx) = mpsc::unbounded_channel();
        let mut watcher =
            notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
                // The loop draining this channel may already be gone during
                // shutdown; a failed send is fine.
                let _ = fs_tx.send(res);
            })
            .map_err(|e| WatchError::Watch {
                path: self.root.clone(),
                source: e,
            })?;

        watcher
            .watch(&self.root, RecursiveMode::NonRecursive)
            .map_err(|e| WatchError::Watch {
                path: self.root.clone(),
                source: e,
            })?;

        self.sweep_existing(&mut watcher).await;

        info!(root = %self.root.display(), "watching session logs");

        loop {
            tokio::select! {
                () = self.cancel.cancelled() => return Ok(()),
                received = fs_rx.recv() => match received {
                    Some(Ok(event)) => self.handle_fs_event(&mut watcher, event).await,
                    Some(Err(e)) => warn!(error = %e, "filesystem watcher error"),
                    None => return Ok(()),
                },
            }
        }
    }

    /// Startup discovery. Existing files are tailed from their current end
    /// so history written before launch is never replayed.
    async fn sweep_existing(&self, watcher: &mut RecommendedWatcher) {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(root = %self.root.display(), error = %e, "cannot enumerate watch root");
                return;
            }
        };

        while let Ok(Some(entry)) = entries.next_entry().await {
            if entry.file_type().await.is_ok_and(|t| t.is_dir()) {
                self.watch_project_dir(watcher, &entry.path(), true).await;
            }
        }
    }

    async fn handle_fs_event(&self, watcher: &mut RecommendedWatcher, event: Event) {
        match event.kind {
            EventKind::Create(_) => {
                for path in event.paths {
                    self.handle_created(watcher, path).await;
                }
            }
            EventKind::Modify(_) => {
                for path in event.paths {
                    if is_jsonl(&path) {
                        // The file may have appeared without a create
                        // notification; start_tailing is a no-op when the
                        // path is already tracked.
                        self.start_tailing(path.clone(), false).await;
                        self.registry.notify_write(&path).await;
                    }
                }
            }
            _ => {}
        }
    }

    async fn handle_created(&self, watcher: &mut RecommendedWatcher, path: PathBuf) {
        if is_dir(&path).await {
            if path.parent() == Some(self.root.as_path()) {
                // New project directory directly under the root.
                self.watch_project_dir(watcher, &path, false).await;
            } else if path.file_name().is_some_and(|n| n == "subagents") {
                self.watch_subagent_dir(watcher, &path, false).await;
            } else {
                // Likely a session-id directory inside a project. Watch it
                // so a later subagents/ creation is noticed, and probe for
                // one that was created in the same mkdir batch.
                if let Err(e) = watcher.watch(&path, RecursiveMode::NonRecursive) {
                    debug!(path = %path.display(), error = %e, "cannot watch session dir");
                }
                let subagent_dir = path.join("subagents");
                if is_dir(&subagent_dir).await {
                    self.watch_subagent_dir(watcher, &subagent_dir, false).await;
                }
            }
        } else if is_jsonl(&path) {
            // Content may have landed between creation and this
            // notification, so read from the beginning.
            self.start_tailing(path, false).await;
        }
    }

    /// Watch a project directory, tail its current logs, and discover any
    /// nested subagent directories.
    async fn watch_project_dir(
        &self,
        watcher: &mut RecommendedWatcher,
        dir: &Path,
        seek_end: bool,
    ) {
        if let Err(e) = watcher.watch(dir, RecursiveMode::NonRecursive) {
            warn!(path = %dir.display(), error = %e, "cannot watch project dir");
            return;
        }

        self.tail_jsonl_files(dir, seek_end).await;
        self.discover_subagents(watcher, dir, seek_end).await;
    }

    /// Find `<session-id>/subagents/` nests inside a project directory.
    /// Session dirs are watched even when `subagents/` does not exist yet
    /// so its later creation is noticed.
    async fn discover_subagents(
        &self,
        watcher: &mut RecommendedWatcher,
        project_dir: &Path,
        seek_end: bool,
    ) {
        let Ok(mut entries) = tokio::fs::read_dir(project_dir).await else {
            return;
        };

        while let Ok(Some(entry)) = entries.next_entry().await {
            if !entry.file_type().await.is_ok_and(|t| t.is_dir()) {
                continue;
            }
            let session_dir = entry.path();
            if let Err(e) = watcher.watch(&session_dir, RecursiveMode::NonRecursive) {
                debug!(path = %session_dir.display(), error = %e, "cannot watch session dir");
            }

            let subagent_dir = session_dir.join("subagents");
            if is_dir(&subagent_dir).await {
                self.watch_subagent_dir(watcher, &subagent_dir, seek_end).await;
            }
        }
    }

    async fn watch_subagent_dir(
        &self,
        watcher: &mut RecommendedWatcher,
        dir: &Path,
        seek_end: bool,
    ) {
        if let Err(e) = watcher.watch(dir, RecursiveMode::NonRecursive) {
            warn!(path = %dir.display(), error = %e, "cannot watch subagents dir");
            return;
        }
        self.tail_jsonl_files(dir, seek_end).await;
    }

    async fn tail_jsonl_files(&self, dir: &Path, seek_end: bool) {
        let Ok(mut entries) = tokio::fs::read_dir(dir).await else {
            return;
        };

        while let Ok(Some(entry)) = entries.next_entry().await {
            let path = entry.path();
            if entry.file_type().await.is_ok_and(|t| t.is_file()) && is_jsonl(&path) {
                self.start_tailing(path, seek_end).await;
            }
        }
    }

    /// Begin tailing `path` unless a tailer already owns it.
    async fn start_tailing(&self, path: PathBuf, seek_end: bool) {
        let Some(wake) = self.registry.begin(&path).await else {
            return;
        };

        debug!(path = %path.display(), seek_end, "starting tailer");
        let tailer = Tailer {
            is_subagent: is_subagent_path(&path),
            path,
            seek_end,
            wake,
            registry: Arc::clone(&self.registry),
            events: self.events.clone(),
            cancel: self.cancel.clone(),
        };
        tokio::spawn(tailer.run());
    }
}

/// Whether `path` has the `.jsonl` extension.
fn is_jsonl(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("jsonl"))
}

/// Whether `path` sits under a `subagents` directory.
fn is_subagent_path(path: &Path) -> bool {
    path.components().any(|c| c.as_os_str() == "subagents")
}

/// Whether `path` currently exists as a directory.
async fn is_dir(path: &Path) -> bool {
    tokio::fs::metadata(path).await.is_ok_and(|m| m.is_dir())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_jsonl() {
        assert!(is_jsonl(Path::new("/a/b/session.jsonl")));
        assert!(is_jsonl(Path::new("/a/b/session.JSONL")));
        assert!(!is_jsonl(Path::new("/a/b/session.json")));
        assert!(!is_jsonl(Path::new("/a/b/jsonl")));
    }

    #[test]
    fn test_is_subagent_path() {
        assert!(is_subagent_path(Path::new("/r/p/s1/subagents/a.jsonl")));
        assert!(!is_subagent_path(Path::new("/r/p/s1.jsonl")));
        assert!(!is_subagent_path(Path::new("/r/p/subagents.jsonl")));
    }
}

//! # chime-sessions
//!
//! Watches a directory tree of Claude Code session logs (JSONL files) and
//! tails them, forwarding classified [`ChimeEvent`](chime_events::ChimeEvent)s
//! to a bounded channel.
//!
//! Layout expected under the watch root:
//!
//! ```text
//! root/
//!   <project>/
//!     <session-id>.jsonl
//!     <session-id>/
//!       subagents/
//!         agent-<id>.jsonl
//! ```
//!
//! [`SessionWatcher`] owns the filesystem watcher and spawns one
//! [`Tailer`](tailer) task per discovered file; the [`TailRegistry`]
//! guarantees there is never more than one tailer per path. Everything
//! observes a single shared [`CancellationToken`](tokio_util::sync::CancellationToken),
//! so shutdown is one idempotent call.

#![forbid(unsafe_code)]

mod registry;
mod tailer;
mod watcher;

pub use registry::TailRegistry;
pub use watcher::{SessionWatcher, WatchError};

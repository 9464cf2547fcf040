//! # chime-events
//!
//! Types and classification logic for Claude Code session log records.
//!
//! A session log is a JSONL file in which each line is a self-contained
//! record. [`classify`] maps one such line to a [`ChimeEvent`] — the single
//! record type broadcast to browser clients — or signals that the line
//! should be discarded.
//!
//! Classification is a pure function: no I/O, no clock, no logging. The
//! same bytes always produce the same outcome, which keeps the per-file
//! tailers free of shared state.
//!
//! ## Example
//!
//! ```rust
//! use chime_events::{classify, Category, Classification};
//!
//! let line = r#"{"type":"assistant","sessionId":"s1","cwd":"/u/proj",
//!     "timestamp":"T","message":{"content":[{"type":"tool_use",
//!     "name":"Edit","input":{"file_path":"main.rs"}}]}}"#;
//!
//! match classify(line).unwrap() {
//!     Classification::Event(ev) => {
//!         assert_eq!(ev.category, Category::Write);
//!         assert_eq!(ev.event, "Edit");
//!         assert_eq!(ev.detail, "main.rs");
//!         assert_eq!(ev.session, "proj");
//!     }
//!     Classification::Skip => unreachable!(),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod classify;
mod event;
mod raw;

pub use classify::{
    classify, session_name_from_cwd, Classification, ClassifyError, DETAIL_MAX_CHARS,
};
pub use event::{Category, ChimeEvent};

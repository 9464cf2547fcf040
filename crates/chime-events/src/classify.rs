//! Session log line classification.

use serde_json::Value;
use thiserror::Error;

use crate::event::{Category, ChimeEvent};
use crate::raw::{RawContent, RawMessage, RawProgressData, RawRecord};

/// Maximum length of an event's `detail` field, in Unicode scalar values.
pub const DETAIL_MAX_CHARS: usize = 80;

/// Record kinds that carry nothing worth sonifying.
const SKIPPED_TYPES: &[&str] = &["file-history-snapshot"];

/// Outcome of classifying a single log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// The line produced a broadcastable event.
    Event(ChimeEvent),
    /// The line is noise and should be discarded without logging.
    Skip,
}

/// Error returned for lines that are not structurally valid records.
#[derive(Debug, Error)]
pub enum ClassifyError {
    /// The line is not a valid JSON record envelope.
    #[error("malformed record: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Classify one session log line.
///
/// Returns [`Classification::Skip`] for known-uninteresting records
/// (`file-history-snapshot`, and progress records that merely relay
/// subagent activity). Unknown record kinds are not errors: they surface
/// as [`Category::Meta`] events named after the literal `type` value.
///
/// # Errors
///
/// Fails only when `line` is not a structurally valid record envelope.
pub fn classify(line: &str) -> Result<Classification, ClassifyError> {
    let raw: RawRecord = serde_json::from_str(line)?;

    if SKIPPED_TYPES.contains(&raw.kind.as_str()) {
        return Ok(Classification::Skip);
    }

    let mut ev = ChimeEvent {
        session: session_name_from_cwd(&raw.cwd),
        session_id: raw.session_id,
        category: Category::Meta,
        event: String::new(),
        detail: String::new(),
        timestamp: raw.timestamp,
        is_subagent: false,
    };

    match raw.kind.as_str() {
        "assistant" => classify_assistant(&mut ev, raw.message.as_ref()),
        "user" => classify_user(&mut ev, raw.message.as_ref()),
        "progress" => {
            // Progress records with a message are the main session relaying
            // subagent activity. Those are skipped because subagent logs are
            // tailed directly, which would otherwise double-count.
            if let Some(data) = &raw.data {
                if data.message.is_some() {
                    return Ok(Classification::Skip);
                }
                if !data.kind.is_empty() {
                    ev.detail = truncate(&data.kind, DETAIL_MAX_CHARS);
                }
            }
            ev.category = Category::Meta;
            ev.event = "progress".to_string();
        }
        "system" => {
            ev.category = Category::Meta;
            ev.event = "system".to_string();
        }
        unknown => {
            // Unknown top-level kinds surface as meta rather than silently
            // disappearing.
            ev.category = Category::Meta;
            ev.event = unknown.to_string();
        }
    }

    Ok(Classification::Event(ev))
}

/// Returns the last non-empty `/`-separated component of `cwd`.
///
/// The cwd recorded in session logs is always Unix-style regardless of the
/// host, so splitting is done on `/` rather than the platform separator.
/// An empty or all-slash cwd is returned verbatim.
#[must_use]
pub fn session_name_from_cwd(cwd: &str) -> String {
    let trimmed = cwd.trim_end_matches('/');
    if trimmed.is_empty() {
        return cwd.to_string();
    }
    trimmed.rsplit('/').next().unwrap_or(trimmed).to_string()
}

fn classify_assistant(ev: &mut ChimeEvent, msg: Option<&RawMessage>) {
    let Some(msg) = msg.filter(|m| !m.content.is_empty()) else {
        ev.category = Category::Ambient;
        ev.event = "assistant".to_string();
        return;
    };

    // A tool_use block anywhere in the content wins over thinking/text.
    if let Some(block) = msg.content.iter().find(|b| b.kind == "tool_use") {
        classify_tool_use(ev, block);
        return;
    }

    // No tool_use: the first block's type names the event (thinking, text,
    // or whatever else the record carries).
    ev.category = Category::Ambient;
    ev.event = msg.content[0].kind.clone();
}

fn classify_tool_use(ev: &mut ChimeEvent, block: &RawContent) {
    ev.event = block.name.clone();
    ev.category = tool_category(&block.name).unwrap_or(Category::Meta);

    if let Some(key) = tool_detail_key(&block.name) {
        if let Some(detail) = block.input.get(key).and_then(Value::as_str) {
            ev.detail = truncate(detail, DETAIL_MAX_CHARS);
        }
    }
}

fn classify_user(ev: &mut ChimeEvent, msg: Option<&RawMessage>) {
    // tool_result blocks take precedence over free-text input.
    if let Some(msg) = msg {
        if let Some(block) = msg.content.iter().find(|b| b.kind == "tool_result") {
            ev.event = "tool_result".to_string();
            ev.category = if block.is_error {
                Category::Error
            } else {
                Category::Success
            };
            return;
        }
    }

    // Plain user turn (human input).
    ev.category = Category::Warn;
    ev.event = "user_input".to_string();
}

/// Tool name to category table. Frozen at build time; unknown tools
/// classify as [`Category::Meta`].
fn tool_category(name: &str) -> Option<Category> {
    match name {
        "Read" | "Grep" | "Glob" => Some(Category::Read),
        "Edit" | "Write" | "NotebookEdit" => Some(Category::Write),
        "Bash" => Some(Category::Action),
        "WebFetch" | "WebSearch" => Some(Category::Network),
        "Task" | "EnterPlanMode" | "ExitPlanMode" | "Skill" | "TodoWrite" | "TaskCreate"
        | "TaskUpdate" => Some(Category::Meta),
        "AskUserQuestion" => Some(Category::Warn),
        _ => None,
    }
}

/// Tool name to the `input` key holding the most useful human detail.
fn tool_detail_key(name: &str) -> Option<&'static str> {
    match name {
        "Read" | "Edit" | "Write" => Some("file_path"),
        "NotebookEdit" => Some("notebook_path"),
        "Grep" | "Glob" => Some("pattern"),
        "Bash" => Some("command"),
        "WebFetch" => Some("url"),
        "WebSearch" => Some("query"),
        "Task" => Some("description"),
        _ => None,
    }
}

/// Returns `s` truncated to at most `max` Unicode scalar values.
fn truncate(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

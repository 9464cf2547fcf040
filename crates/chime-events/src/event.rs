//! The normalized event type and its category set.

use serde::{Deserialize, Serialize};

/// Sound category attached to every classified event.
///
/// The set is closed: the browser audio engine maps each category to a
/// voice, so unknown record kinds fold into [`Category::Meta`] instead of
/// growing the set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Thinking and plain text blocks.
    Ambient,
    /// Bash tool use.
    Action,
    /// Read, Grep, and Glob tool use.
    Read,
    /// Edit, Write, and NotebookEdit tool use.
    Write,
    /// WebFetch and WebSearch tool use.
    Network,
    /// `tool_result` blocks that succeeded.
    Success,
    /// AskUserQuestion and human input turns.
    Warn,
    /// `tool_result` blocks with `is_error` set.
    Error,
    /// Task management, lifecycle, progress, and unknown record kinds.
    Meta,
    /// Session start. Accepted on the wire and in pack manifests but not
    /// produced by the classifier.
    Init,
}

impl Category {
    /// The category's lowercase wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ambient => "ambient",
            Self::Action => "action",
            Self::Read => "read",
            Self::Write => "write",
            Self::Network => "network",
            Self::Success => "success",
            Self::Warn => "warn",
            Self::Error => "error",
            Self::Meta => "meta",
            Self::Init => "init",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized representation of a single session log line.
///
/// This is the sole payload delivered to subscribers; the field names below
/// are the wire schema the browser audio engine consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChimeEvent {
    /// Human-readable session label, derived from the record's `cwd`.
    pub session: String,
    /// Opaque session identifier copied from the record.
    pub session_id: String,
    /// Sound category.
    pub category: Category,
    /// Short name of the underlying record kind (tool name, `tool_result`,
    /// `user_input`, ...).
    pub event: String,
    /// Optional human detail (file path, command, query), at most
    /// [`DETAIL_MAX_CHARS`](crate::DETAIL_MAX_CHARS) characters. May be
    /// empty.
    pub detail: String,
    /// Timestamp string copied verbatim from the record.
    pub timestamp: String,
    /// Whether the record came from a log nested under a `subagents`
    /// directory. Set by the tailer, not the classifier.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_subagent: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_wire_names() {
        assert_eq!(
            serde_json::to_string(&Category::Ambient).unwrap(),
            "\"ambient\""
        );
        assert_eq!(
            serde_json::to_string(&Category::Network).unwrap(),
            "\"network\""
        );
        assert_eq!(serde_json::to_string(&Category::Init).unwrap(), "\"init\"");

        let parsed: Category = serde_json::from_str("\"error\"").unwrap();
        assert_eq!(parsed, Category::Error);
    }

    #[test]
    fn test_category_rejects_unknown_value() {
        assert!(serde_json::from_str::<Category>("\"loud\"").is_err());
    }

    #[test]
    fn test_category_display_matches_wire_name() {
        assert_eq!(Category::Warn.to_string(), "warn");
        assert_eq!(Category::Write.as_str(), "write");
    }

    #[test]
    fn test_event_serializes_with_wire_field_names() {
        let ev = ChimeEvent {
            session: "proj".into(),
            session_id: "s1".into(),
            category: Category::Write,
            event: "Edit".into(),
            detail: "main.rs".into(),
            timestamp: "2026-01-01T00:00:00Z".into(),
            is_subagent: true,
        };

        let json: serde_json::Value = serde_json::to_value(&ev).unwrap();
        assert_eq!(json["session"], "proj");
        assert_eq!(json["sessionId"], "s1");
        assert_eq!(json["category"], "write");
        assert_eq!(json["event"], "Edit");
        assert_eq!(json["detail"], "main.rs");
        assert_eq!(json["timestamp"], "2026-01-01T00:00:00Z");
        assert_eq!(json["isSubagent"], true);
    }

    #[test]
    fn test_subagent_flag_omitted_when_false() {
        let ev = ChimeEvent {
            session: "proj".into(),
            session_id: "s1".into(),
            category: Category::Meta,
            event: "system".into(),
            detail: String::new(),
            timestamp: "T".into(),
            is_subagent: false,
        };

        let json: serde_json::Value = serde_json::to_value(&ev).unwrap();
        assert!(json.get("isSubagent").is_none());
    }

    #[test]
    fn test_event_round_trips() {
        let ev = ChimeEvent {
            session: "proj".into(),
            session_id: "s1".into(),
            category: Category::Success,
            event: "tool_result".into(),
            detail: String::new(),
            timestamp: "T".into(),
            is_subagent: false,
        };

        let json = serde_json::to_string(&ev).unwrap();
        let back: ChimeEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ev);
    }
}

//! Raw session-log record shapes, used only during classification.
//!
//! Records are free-form; every sub-object here is optional and every
//! field is defaulted so that lookups into absent structure simply miss
//! instead of failing the whole line.

use serde::Deserialize;
use serde_json::Value;

/// Top-level envelope of every session log record.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawRecord {
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default, rename = "sessionId")]
    pub session_id: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub cwd: String,
    #[serde(default)]
    pub message: Option<RawMessage>,
    #[serde(default)]
    pub data: Option<RawProgressData>,
}

/// The `message` field present on assistant and user records.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawMessage {
    #[serde(default)]
    pub content: Vec<RawContent>,
}

/// A single element of a message content array.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawContent {
    #[serde(default, rename = "type")]
    pub kind: String,
    // tool_use fields
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub input: Value,
    // tool_result fields
    #[serde(default)]
    pub is_error: bool,
}

/// The `data` object inside progress records.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawProgressData {
    #[serde(default, rename = "type")]
    pub kind: String,
    /// Set when the parent session is relaying subagent activity.
    #[serde(default)]
    pub message: Option<Value>,
}

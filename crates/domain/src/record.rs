//! Persisted chat rows as stored by the (external) chat storage service.
//!
//! These rows are read-only input to the pipeline. Tool calls and results are
//! stored in side fields as serialized JSON; due to upstream quirks they may
//! arrive as a JSON string, an already-parsed array, or a malformed string,
//! so both fields are kept as raw [`serde_json::Value`] here and only
//! interpreted by the history reconstructor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// One persisted message row. Roles are only ever `user`, `assistant`, or
/// `system` at this layer; tool turns live inside an assistant row's
/// `tool_calls` / `tool_results` side fields, never as separate rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredMessage {
    pub id: String,
    pub session_id: String,
    pub role: StoredRole,
    #[serde(default)]
    pub content: String,
    /// Raw tool-call payload: array, JSON string, malformed string, or null.
    #[serde(default)]
    pub tool_calls: Option<Value>,
    /// Raw tool-result payload, same possible shapes as `tool_calls`.
    #[serde(default)]
    pub tool_results: Option<Value>,
    #[serde(default)]
    pub model: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoredRole {
    User,
    Assistant,
    System,
}

/// A single tool invocation as persisted inside an assistant row.
///
/// All fields default so that partially corrupt entries still deserialize;
/// downstream code treats an empty id as unpairable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoredToolCall {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub input: Value,
}

/// A single tool result as persisted inside an assistant row. Pairing key is
/// `call_id`; entries with an empty `call_id` are corrupt and get dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredToolResult {
    #[serde(default)]
    pub call_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub result: Value,
    #[serde(default = "default_true")]
    pub success: bool,
}

fn default_true() -> bool {
    true
}

impl StoredMessage {
    /// Parse a raw JSON row from the storage service.
    ///
    /// This is the only fallible entry point into the pipeline; every
    /// transformation downstream of it is total.
    pub fn from_row(row: Value) -> Result<Self> {
        Ok(serde_json::from_value(row)?)
    }

    fn new(session_id: impl Into<String>, role: StoredRole, content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            session_id: session_id.into(),
            role,
            content: content.into(),
            tool_calls: None,
            tool_results: None,
            model: None,
            created_at: Utc::now(),
        }
    }

    pub fn user(session_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(session_id, StoredRole::User, content)
    }

    pub fn assistant(session_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(session_id, StoredRole::Assistant, content)
    }

    pub fn system(session_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(session_id, StoredRole::System, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_row_parses_camel_case_fields() {
        let row = serde_json::json!({
            "id": "m1",
            "sessionId": "s1",
            "role": "assistant",
            "content": "done",
            "toolCalls": "[{\"id\":\"c1\",\"name\":\"search\",\"input\":{}}]",
            "toolResults": null,
            "model": "gpt-4o",
            "createdAt": "2026-01-15T10:30:00Z"
        });
        let msg = StoredMessage::from_row(row).unwrap();
        assert_eq!(msg.session_id, "s1");
        assert_eq!(msg.role, StoredRole::Assistant);
        assert!(matches!(msg.tool_calls, Some(Value::String(_))));
        assert_eq!(msg.model.as_deref(), Some("gpt-4o"));
    }

    #[test]
    fn from_row_accepts_already_parsed_tool_calls() {
        let row = serde_json::json!({
            "id": "m2",
            "sessionId": "s1",
            "role": "assistant",
            "content": "",
            "toolCalls": [{"id": "c1", "name": "search", "input": {"q": "x"}}],
            "createdAt": "2026-01-15T10:30:00Z"
        });
        let msg = StoredMessage::from_row(row).unwrap();
        assert!(matches!(msg.tool_calls, Some(Value::Array(_))));
    }

    #[test]
    fn from_row_rejects_missing_required_fields() {
        let row = serde_json::json!({"role": "user", "content": "hi"});
        assert!(StoredMessage::from_row(row).is_err());
    }

    #[test]
    fn stored_tool_result_defaults() {
        let r: StoredToolResult = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(r.call_id, "");
        assert!(r.success);
        assert!(r.result.is_null());
    }
}

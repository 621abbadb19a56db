//! Reconstructs unified message histories from persisted chat rows.
//!
//! Never fails: every malformed-input case degrades to a conservative
//! plain-text representation instead of partial structured output. The only
//! side effect is diagnostic logging, tagged with an optional caller prefix.

use serde_json::Value;
use tl_domain::message::{ContentPart, Message, MessageContent, Role};
use tl_domain::record::{StoredMessage, StoredRole, StoredToolCall, StoredToolResult};

/// Hard safety cap on tool interaction fan-out for a single record.
///
/// Bounds both the tool-call parts kept on the assistant message and the
/// tool-role messages emitted after it, so pathological or duplicated rows
/// cannot blow up the context sent downstream.
const MAX_TOOL_MESSAGES_PER_RECORD: usize = 50;

/// Convert an ordered list of persisted rows into unified messages.
///
/// `log_tag` is folded into diagnostic log lines so callers can attribute
/// them (e.g. to a session); it has no effect on the returned data.
pub fn reconstruct(records: &[StoredMessage], log_tag: Option<&str>) -> Vec<Message> {
    let tag = log_tag.unwrap_or("history");
    let mut out = Vec::with_capacity(records.len());
    for record in records {
        match record.role {
            StoredRole::User => out.push(Message::user(&record.content)),
            StoredRole::System => out.push(Message::system(&record.content)),
            StoredRole::Assistant => expand_assistant_record(record, tag, &mut out),
        }
    }
    out
}

// ── Assistant expansion ────────────────────────────────────────────

fn expand_assistant_record(record: &StoredMessage, tag: &str, out: &mut Vec<Message>) {
    let calls = coerce_entries::<StoredToolCall>(record.tool_calls.as_ref());
    let results = coerce_entries::<StoredToolResult>(record.tool_results.as_ref());

    let (calls, results) = match (calls, results) {
        (Some(c), Some(r)) => (c, r),
        _ => {
            tracing::warn!(
                tag = %tag,
                record_id = %record.id,
                "tool payload on assistant row is malformed; keeping plain text only"
            );
            out.push(Message::assistant(&record.content));
            return;
        }
    };

    if calls.is_empty() {
        // No tool use: stay byte-identical to pre-tool-support histories.
        out.push(Message::assistant(&record.content));
        return;
    }

    if calls.len() > MAX_TOOL_MESSAGES_PER_RECORD {
        tracing::warn!(
            tag = %tag,
            record_id = %record.id,
            total = calls.len(),
            kept = MAX_TOOL_MESSAGES_PER_RECORD,
            "tool call count exceeds per-record cap; truncating"
        );
    }
    let kept_calls = &calls[..calls.len().min(MAX_TOOL_MESSAGES_PER_RECORD)];

    let mut parts: Vec<ContentPart> = Vec::with_capacity(kept_calls.len() + 1);
    if !record.content.is_empty() {
        parts.push(ContentPart::Text { text: record.content.clone() });
    }
    for call in kept_calls {
        parts.push(ContentPart::ToolUse {
            id: call.id.clone(),
            name: call.name.clone(),
            input: call.input.clone(),
        });
    }

    if parts.is_empty() {
        out.push(Message::assistant(&record.content));
        return;
    }
    out.push(Message { role: Role::Assistant, content: MessageContent::Parts(parts) });

    // Tool messages follow in call order, not result order. Calls with no
    // matching result are in-flight/abandoned and produce nothing; results
    // with an empty call id are corrupt and get skipped outright.
    for call in kept_calls {
        if call.id.is_empty() {
            continue;
        }
        if let Some(result) = results.iter().find(|r| r.call_id == call.id) {
            out.push(Message::tool_result(
                &result.call_id,
                &result.name,
                stringify_result(&result.result),
                !result.success,
            ));
        }
    }
}

// ── Raw field coercion ─────────────────────────────────────────────

/// Interpret a stored side field that may be an array, a JSON string
/// encoding an array, or garbage.
///
/// Returns `Some(vec![])` for an absent/null field (no tool use),
/// `Some(entries)` when the payload decodes, and `None` when it is
/// malformed and the whole record must fall back to plain text.
fn coerce_entries<T: serde::de::DeserializeOwned>(raw: Option<&Value>) -> Option<Vec<T>> {
    let raw = match raw {
        None | Some(Value::Null) => return Some(Vec::new()),
        Some(v) => v,
    };
    let parsed: Value = match raw {
        Value::Array(_) => raw.clone(),
        Value::String(s) => serde_json::from_str(s).ok()?,
        _ => return None,
    };
    serde_json::from_value(parsed).ok()
}

/// Stored results are arbitrary JSON; string payloads pass through verbatim,
/// everything else is serialized.
fn stringify_result(result: &Value) -> String {
    match result {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

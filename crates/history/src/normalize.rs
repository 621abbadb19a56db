//! Model-switch-aware history normalization.
//!
//! When a session changes provider family mid-conversation, tool-call history
//! recorded under one family's semantics must be converted for the next. The
//! unified message shape is already provider-neutral, so conversion means
//! regenerating call ids into the target family's conventional format while
//! keeping pairing, tool names, inputs, and all text intact. Stripping to
//! plain text is a last resort, used only when the target family is unknown
//! or a caller must guarantee text-only output.

use std::collections::HashMap;

use tl_domain::family::{classify_model, ProviderFamily};
use tl_domain::message::{ContentPart, Message, MessageContent, Role};

/// Longest tool-result excerpt folded into a strip summary sentence.
const MAX_RESULT_SUMMARY_CHARS: usize = 400;

/// True when the history contains any tool interaction: an assistant
/// `tool_use` part or a tool-role message.
pub fn has_tool_calls(history: &[Message]) -> bool {
    history.iter().any(|msg| {
        if msg.role == Role::Tool {
            return true;
        }
        match &msg.content {
            MessageContent::Parts(parts) => parts
                .iter()
                .any(|p| matches!(p, ContentPart::ToolUse { .. })),
            MessageContent::Text(_) => false,
        }
    })
}

/// Prepare a history for the next turn on `target_model`.
///
/// Returns the input unchanged when no conversion is needed: either the
/// history carries no tool use at all, or the previous and target models
/// classify to the same provider family (the same encoder will serve both).
/// Otherwise tool-call structure is converted for the target family; an
/// unclassifiable target falls back to [`strip_tool_call_history`]. Total;
/// an unrecognized model name is never an error.
pub fn normalize(
    history: Vec<Message>,
    target_model: &str,
    previous_model: Option<&str>,
) -> Vec<Message> {
    if !has_tool_calls(&history) {
        return history;
    }

    let target = classify_model(target_model);
    if let Some(previous) = previous_model {
        let previous = classify_model(previous);
        if previous != ProviderFamily::Unknown && previous == target {
            return history;
        }
    }

    if target == ProviderFamily::Unknown {
        tracing::debug!(
            target_model = %target_model,
            "target family unknown; stripping tool history to plain text"
        );
        return strip_tool_call_history(&history);
    }

    convert_tool_history(history, target)
}

// ── Structural conversion ──────────────────────────────────────────

/// Rewrite call ids into `family`'s conventional format, preserving pairing.
///
/// Calls precede their results in a reconstructed history, so a single pass
/// with an id remap suffices. Result ids with no known mapping (orphans the
/// caller chose to keep) pass through untouched.
fn convert_tool_history(mut history: Vec<Message>, family: ProviderFamily) -> Vec<Message> {
    let mut remap: HashMap<String, String> = HashMap::new();

    for msg in &mut history {
        let MessageContent::Parts(parts) = &mut msg.content else {
            continue;
        };
        for part in parts {
            match part {
                ContentPart::ToolUse { id, .. } => {
                    let fresh = conventional_call_id(family);
                    if !id.is_empty() {
                        remap.insert(id.clone(), fresh.clone());
                    }
                    *id = fresh;
                }
                ContentPart::ToolResult { tool_use_id, .. } => {
                    if let Some(mapped) = remap.get(tool_use_id) {
                        *tool_use_id = mapped.clone();
                    }
                }
                _ => {}
            }
        }
    }
    history
}

/// A fresh call id in the format each backend itself emits.
fn conventional_call_id(family: ProviderFamily) -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    match family {
        ProviderFamily::Anthropic => format!("toolu_{suffix}"),
        _ => format!("call_{suffix}"),
    }
}

// ── Plain-text fallback ────────────────────────────────────────────

/// Flatten every tool interaction into descriptive assistant text.
///
/// Tool-call parts become a sentence naming the tool; the paired result (from
/// the tool-role messages that follow the assistant turn) is summarized as
/// trailing text, truncated to a bounded length. Tool-role messages disappear
/// as separate entries. System and user messages and overall message order
/// are untouched.
pub fn strip_tool_call_history(history: &[Message]) -> Vec<Message> {
    let mut out = Vec::with_capacity(history.len());
    let mut i = 0;
    while i < history.len() {
        let msg = &history[i];
        match msg.role {
            Role::System | Role::User => {
                out.push(msg.clone());
                i += 1;
            }
            // A tool message with no preceding assistant turn has nothing to
            // attach to; it simply disappears.
            Role::Tool => {
                i += 1;
            }
            Role::Assistant => {
                let mut end = i + 1;
                while end < history.len() && history[end].role == Role::Tool {
                    end += 1;
                }
                out.push(summarize_assistant(msg, &history[i + 1..end]));
                i = end;
            }
        }
    }
    out
}

fn summarize_assistant(msg: &Message, tool_messages: &[Message]) -> Message {
    let parts = match &msg.content {
        MessageContent::Text(t) => return Message::assistant(t.clone()),
        MessageContent::Parts(parts) => parts,
    };

    let mut pieces: Vec<String> = Vec::new();
    for part in parts {
        match part {
            ContentPart::Text { text } => pieces.push(text.clone()),
            ContentPart::ToolUse { id, name, .. } => {
                pieces.push(format!("[called tool \"{name}\"]"));
                if let Some((content, is_error)) = find_result(tool_messages, id) {
                    let summary = truncate_chars(content, MAX_RESULT_SUMMARY_CHARS);
                    let verb = if is_error { "failed" } else { "returned" };
                    pieces.push(format!("[tool \"{name}\" {verb}: {summary}]"));
                }
            }
            _ => {}
        }
    }
    Message::assistant(pieces.join("\n"))
}

fn find_result<'a>(tool_messages: &'a [Message], call_id: &str) -> Option<(&'a str, bool)> {
    tool_messages.iter().find_map(|msg| {
        let MessageContent::Parts(parts) = &msg.content else {
            return None;
        };
        parts.iter().find_map(|p| match p {
            ContentPart::ToolResult { tool_use_id, content, is_error, .. }
                if tool_use_id == call_id =>
            {
                Some((content.as_str(), *is_error))
            }
            _ => None,
        })
    })
}

fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut t: String = s.chars().take(max).collect();
        t.push_str("...");
        t
    }
}

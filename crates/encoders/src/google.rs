//! Google-family encoder.
//!
//! Targets the Gemini `generateContent` shape: `assistant` maps to wire role
//! `model`, tool results ride in `function`-role messages, tool calls and
//! results are `functionCall` / `functionResponse` parts, and declarations
//! are wrapped in a single `functionDeclarations` envelope. Gemini rejects
//! several standard JSON-Schema keys, so parameter schemas are cleaned
//! recursively before transmission.

use serde_json::Value;
use tl_domain::message::{ContentPart, Message, MessageContent, Role, ToolDefinition};

use crate::{join_system, EncodedChat, ProviderEncoder};

/// JSON-Schema keys Gemini rejects, stripped at every nesting depth.
const UNSUPPORTED_SCHEMA_KEYS: &[&str] = &["$schema", "additionalProperties"];

pub struct GoogleEncoder;

impl ProviderEncoder for GoogleEncoder {
    fn encode_messages(&self, messages: &[Message]) -> EncodedChat {
        let mut system_parts: Vec<String> = Vec::new();
        let mut wire: Vec<Value> = Vec::new();

        for msg in messages {
            match msg.role {
                Role::System => system_parts.push(msg.content.extract_all_text()),
                Role::User => wire.push(user_to_gemini(msg)),
                Role::Assistant => wire.push(assistant_to_gemini(msg)),
                Role::Tool => wire.push(tool_result_to_gemini(msg)),
            }
        }

        EncodedChat { messages: wire, system: join_system(system_parts) }
    }

    fn encode_tools(&self, tools: &[ToolDefinition]) -> Vec<Value> {
        let declarations: Vec<Value> = tools.iter().map(tool_to_gemini).collect();
        vec![serde_json::json!({
            "functionDeclarations": declarations,
        })]
    }
}

// ── Message serialization helpers ──────────────────────────────────

fn user_to_gemini(msg: &Message) -> Value {
    let parts = content_to_gemini_parts(&msg.content);
    serde_json::json!({
        "role": "user",
        "parts": parts,
    })
}

fn assistant_to_gemini(msg: &Message) -> Value {
    let mut parts: Vec<Value> = Vec::new();
    match &msg.content {
        MessageContent::Text(t) => {
            parts.push(serde_json::json!({"text": t}));
        }
        MessageContent::Parts(ps) => {
            for p in ps {
                match p {
                    ContentPart::Text { text } => {
                        parts.push(serde_json::json!({"text": text}));
                    }
                    ContentPart::ToolUse { id: _, name, input } => {
                        // Gemini carries no call ids on the wire; pairing is
                        // positional via the function name.
                        parts.push(serde_json::json!({
                            "functionCall": {
                                "name": name,
                                "args": input,
                            }
                        }));
                    }
                    _ => {}
                }
            }
        }
    }
    serde_json::json!({
        "role": "model",
        "parts": parts,
    })
}

fn tool_result_to_gemini(msg: &Message) -> Value {
    let mut parts: Vec<Value> = Vec::new();
    match &msg.content {
        MessageContent::Parts(ps) => {
            for p in ps {
                if let ContentPart::ToolResult { tool_use_id, tool_name, content, .. } = p {
                    let name = if tool_name.is_empty() { tool_use_id } else { tool_name };
                    parts.push(serde_json::json!({
                        "functionResponse": {
                            "name": name,
                            "response": {
                                "content": content,
                            }
                        }
                    }));
                }
            }
        }
        MessageContent::Text(t) => {
            parts.push(serde_json::json!({
                "functionResponse": {
                    "name": "unknown",
                    "response": {
                        "content": t,
                    }
                }
            }));
        }
    }
    serde_json::json!({
        "role": "function",
        "parts": parts,
    })
}

fn content_to_gemini_parts(content: &MessageContent) -> Vec<Value> {
    match content {
        MessageContent::Text(t) => vec![serde_json::json!({"text": t})],
        MessageContent::Parts(parts) => parts
            .iter()
            .filter_map(|p| match p {
                ContentPart::Text { text } => Some(serde_json::json!({"text": text})),
                ContentPart::Image { url, media_type } => {
                    let mt = media_type.as_deref().unwrap_or("image/png");
                    Some(serde_json::json!({
                        "inlineData": {
                            "mimeType": mt,
                            "data": url,
                        }
                    }))
                }
                _ => None,
            })
            .collect(),
    }
}

fn tool_to_gemini(tool: &ToolDefinition) -> Value {
    serde_json::json!({
        "name": tool.name,
        "description": tool.description,
        "parameters": clean_schema(&tool.parameters),
    })
}

// ── Schema cleaning ────────────────────────────────────────────────

/// Strip unsupported JSON-Schema keys at every depth, preserving everything
/// else (including nested `properties`, `items`, `anyOf`, ...) with the same
/// cleaning applied recursively.
fn clean_schema(schema: &Value) -> Value {
    match schema {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(key, _)| !UNSUPPORTED_SCHEMA_KEYS.contains(&key.as_str()))
                .map(|(key, value)| (key.clone(), clean_schema(value)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(clean_schema).collect()),
        other => other.clone(),
    }
}

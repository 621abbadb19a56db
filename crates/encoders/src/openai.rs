//! OpenAI-family encoder.
//!
//! Targets the chat completions contract shared by OpenAI, Azure OpenAI, and
//! the many compatible endpoints. Assistant tool calls become a `tool_calls`
//! array with JSON-stringified `arguments`; tool results become separate
//! `role: "tool"` messages keyed by `tool_call_id`.

use serde_json::Value;
use tl_domain::message::{ContentPart, Message, MessageContent, Role, ToolDefinition};

use crate::{join_system, EncodedChat, ProviderEncoder};

pub struct OpenAiEncoder;

impl ProviderEncoder for OpenAiEncoder {
    fn encode_messages(&self, messages: &[Message]) -> EncodedChat {
        let mut system_parts: Vec<String> = Vec::new();
        let mut wire: Vec<Value> = Vec::new();

        for msg in messages {
            match msg.role {
                Role::System => system_parts.push(msg.content.extract_all_text()),
                Role::Assistant => wire.push(assistant_to_openai(msg)),
                Role::Tool => wire.push(tool_result_to_openai(msg)),
                Role::User => wire.push(serde_json::json!({
                    "role": "user",
                    "content": msg.content.extract_all_text(),
                })),
            }
        }

        EncodedChat { messages: wire, system: join_system(system_parts) }
    }

    fn encode_tools(&self, tools: &[ToolDefinition]) -> Vec<Value> {
        tools.iter().map(tool_to_openai).collect()
    }
}

// ── Message serialization helpers ──────────────────────────────────

fn assistant_to_openai(msg: &Message) -> Value {
    let mut obj = serde_json::json!({"role": "assistant"});
    let mut text_parts: Vec<String> = Vec::new();
    let mut tool_calls: Vec<Value> = Vec::new();

    match &msg.content {
        MessageContent::Text(t) => {
            text_parts.push(t.clone());
        }
        MessageContent::Parts(parts) => {
            for part in parts {
                match part {
                    ContentPart::Text { text } => text_parts.push(text.clone()),
                    ContentPart::ToolUse { id, name, input } => {
                        tool_calls.push(serde_json::json!({
                            "id": id,
                            "type": "function",
                            "function": {
                                "name": name,
                                "arguments": input.to_string(),
                            }
                        }));
                    }
                    _ => {}
                }
            }
        }
    }

    if text_parts.is_empty() {
        obj["content"] = Value::Null;
    } else {
        obj["content"] = Value::String(text_parts.join("\n"));
    }
    if !tool_calls.is_empty() {
        obj["tool_calls"] = Value::Array(tool_calls);
    }
    obj
}

fn tool_result_to_openai(msg: &Message) -> Value {
    match &msg.content {
        MessageContent::Parts(parts) => {
            for part in parts {
                if let ContentPart::ToolResult { tool_use_id, content, .. } = part {
                    return serde_json::json!({
                        "role": "tool",
                        "tool_call_id": tool_use_id,
                        "content": content,
                    });
                }
            }
            serde_json::json!({"role": "tool", "tool_call_id": "", "content": ""})
        }
        MessageContent::Text(t) => serde_json::json!({
            "role": "tool",
            "tool_call_id": "",
            "content": t,
        }),
    }
}

fn tool_to_openai(tool: &ToolDefinition) -> Value {
    serde_json::json!({
        "type": "function",
        "function": {
            "name": tool.name,
            "description": tool.description,
            "parameters": tool.parameters,
        }
    })
}

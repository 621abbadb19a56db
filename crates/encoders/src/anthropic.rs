//! Anthropic-family encoder.
//!
//! Targets the Messages API structure: assistant content is an array of typed
//! blocks where tool calls are `tool_use` blocks carrying `input` as a JSON
//! object (never stringified), tool results travel as `user`-role messages
//! with `tool_result` blocks, and the system prompt goes in the top-level
//! `system` field rather than the message list.

use serde_json::Value;
use tl_domain::message::{ContentPart, Message, MessageContent, Role, ToolDefinition};

use crate::{join_system, EncodedChat, ProviderEncoder};

pub struct AnthropicEncoder;

impl ProviderEncoder for AnthropicEncoder {
    fn encode_messages(&self, messages: &[Message]) -> EncodedChat {
        let mut system_parts: Vec<String> = Vec::new();
        let mut wire: Vec<Value> = Vec::new();

        for msg in messages {
            match msg.role {
                Role::System => system_parts.push(msg.content.extract_all_text()),
                Role::User => wire.push(user_msg_to_anthropic(msg)),
                Role::Assistant => wire.push(assistant_msg_to_anthropic(msg)),
                Role::Tool => wire.push(tool_result_to_anthropic(msg)),
            }
        }

        EncodedChat { messages: wire, system: join_system(system_parts) }
    }

    fn encode_tools(&self, tools: &[ToolDefinition]) -> Vec<Value> {
        tools.iter().map(tool_to_anthropic).collect()
    }
}

// ── Message serialization helpers ──────────────────────────────────

fn user_msg_to_anthropic(msg: &Message) -> Value {
    match &msg.content {
        MessageContent::Text(t) => serde_json::json!({
            "role": "user",
            "content": t,
        }),
        MessageContent::Parts(parts) => {
            let content: Vec<Value> = parts
                .iter()
                .filter_map(|p| match p {
                    ContentPart::Text { text } => Some(serde_json::json!({
                        "type": "text",
                        "text": text,
                    })),
                    ContentPart::Image { url, media_type } => {
                        let mt = media_type.as_deref().unwrap_or("image/png");
                        Some(serde_json::json!({
                            "type": "image",
                            "source": {
                                "type": "base64",
                                "media_type": mt,
                                "data": url,
                            }
                        }))
                    }
                    _ => None,
                })
                .collect();
            serde_json::json!({
                "role": "user",
                "content": content,
            })
        }
    }
}

fn assistant_msg_to_anthropic(msg: &Message) -> Value {
    match &msg.content {
        MessageContent::Text(t) => serde_json::json!({
            "role": "assistant",
            "content": [{"type": "text", "text": t}],
        }),
        MessageContent::Parts(parts) => {
            let content: Vec<Value> = parts
                .iter()
                .filter_map(|p| match p {
                    ContentPart::Text { text } => Some(serde_json::json!({
                        "type": "text",
                        "text": text,
                    })),
                    ContentPart::ToolUse { id, name, input } => Some(serde_json::json!({
                        "type": "tool_use",
                        "id": id,
                        "name": name,
                        "input": input,
                    })),
                    _ => None,
                })
                .collect();
            serde_json::json!({
                "role": "assistant",
                "content": content,
            })
        }
    }
}

fn tool_result_to_anthropic(msg: &Message) -> Value {
    // Tool results are user messages with tool_result content blocks.
    let content: Vec<Value> = match &msg.content {
        MessageContent::Parts(parts) => parts
            .iter()
            .filter_map(|p| match p {
                ContentPart::ToolResult { tool_use_id, content, is_error, .. } => {
                    Some(serde_json::json!({
                        "type": "tool_result",
                        "tool_use_id": tool_use_id,
                        "content": content,
                        "is_error": is_error,
                    }))
                }
                _ => None,
            })
            .collect(),
        MessageContent::Text(t) => {
            vec![serde_json::json!({
                "type": "tool_result",
                "tool_use_id": "",
                "content": t,
            })]
        }
    };
    serde_json::json!({
        "role": "user",
        "content": content,
    })
}

fn tool_to_anthropic(tool: &ToolDefinition) -> Value {
    serde_json::json!({
        "name": tool.name,
        "description": tool.description,
        "input_schema": tool.parameters,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tool_use_input_stays_an_object() {
        let messages = vec![
            Message {
                role: Role::Assistant,
                content: MessageContent::Parts(vec![ContentPart::ToolUse {
                    id: "call_1".into(),
                    name: "search".into(),
                    input: json!({"query": "x"}),
                }]),
            },
            Message::tool_result("call_1", "search", "found it", false),
        ];
        let encoded = AnthropicEncoder.encode_messages(&messages);
        assert_eq!(encoded.messages.len(), 2);

        let block = &encoded.messages[0]["content"][0];
        assert_eq!(block["type"], json!("tool_use"));
        assert_eq!(block["input"], json!({"query": "x"}));

        let result_msg = &encoded.messages[1];
        assert_eq!(result_msg["role"], json!("user"));
        let result_block = &result_msg["content"][0];
        assert_eq!(result_block["type"], json!("tool_result"));
        assert_eq!(result_block["tool_use_id"], json!("call_1"));
        assert_eq!(result_block["content"], json!("found it"));
    }

    #[test]
    fn system_goes_to_side_channel_never_messages() {
        let messages = vec![
            Message::system("rules"),
            Message::system("more rules"),
            Message::user("hi"),
        ];
        let encoded = AnthropicEncoder.encode_messages(&messages);
        assert_eq!(encoded.system.as_deref(), Some("rules\n\nmore rules"));
        assert!(encoded
            .messages
            .iter()
            .all(|m| m["role"] != json!("system")));
    }

    #[test]
    fn failed_result_sets_is_error() {
        let encoded = AnthropicEncoder
            .encode_messages(&[Message::tool_result("c1", "shell", "boom", true)]);
        assert_eq!(encoded.messages[0]["content"][0]["is_error"], json!(true));
    }

    #[test]
    fn tools_use_input_schema_key() {
        let tools = vec![ToolDefinition {
            name: "search".into(),
            description: "".into(),
            parameters: json!({"type": "object"}),
        }];
        let encoded = AnthropicEncoder.encode_tools(&tools);
        assert_eq!(encoded[0]["input_schema"], json!({"type": "object"}));
    }
}

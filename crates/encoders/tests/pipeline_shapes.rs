//! Integration tests for the full persisted-row → wire-payload pipeline.
//!
//! These exercise reconstruct + normalize + encode across crates, using rows
//! shaped the way the chat storage service actually persists them (tool
//! calls/results as JSON-serialized strings on assistant rows). All tests
//! are pure and deterministic.

use serde_json::{json, Value};
use tl_domain::family::ProviderFamily;
use tl_domain::message::ToolDefinition;
use tl_domain::record::StoredMessage;
use tl_encoders::prepare;

fn tool_turn_rows() -> Vec<StoredMessage> {
    let mut assistant = StoredMessage::assistant("s1", "let me look");
    assistant.tool_calls = Some(Value::String(
        json!([{"id": "call_1", "name": "search", "input": {"query": "x"}}]).to_string(),
    ));
    assistant.tool_results = Some(Value::String(
        json!([{"callId": "call_1", "name": "search", "result": "found it", "success": true}])
            .to_string(),
    ));
    assistant.model = Some("gpt-4".into());

    vec![
        StoredMessage::system("s1", "be brief"),
        StoredMessage::user("s1", "find x"),
        assistant,
        StoredMessage::user("s1", "thanks"),
    ]
}

fn search_tool() -> ToolDefinition {
    ToolDefinition {
        name: "search".into(),
        description: "Search the index".into(),
        parameters: json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "type": "object",
            "additionalProperties": false,
            "properties": {"query": {"type": "string"}}
        }),
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Same-family turns
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[test]
fn openai_turn_keeps_ids_and_stringifies_arguments() {
    let prepared = prepare(&tool_turn_rows(), &[search_tool()], "gpt-4o", Some("gpt-4"), None);

    assert_eq!(prepared.family, ProviderFamily::OpenAi);
    assert_eq!(prepared.chat.system.as_deref(), Some("be brief"));
    // user, assistant, tool, user — system extracted.
    assert_eq!(prepared.chat.messages.len(), 4);

    let assistant = &prepared.chat.messages[1];
    assert_eq!(assistant["tool_calls"][0]["id"], json!("call_1"));
    assert_eq!(
        assistant["tool_calls"][0]["function"]["arguments"],
        json!(r#"{"query":"x"}"#)
    );
    assert_eq!(assistant["content"], json!("let me look"));

    let tool = &prepared.chat.messages[2];
    assert_eq!(tool["role"], json!("tool"));
    assert_eq!(tool["tool_call_id"], json!("call_1"));
    assert_eq!(tool["content"], json!("found it"));
}

#[test]
fn user_order_survives_every_family() {
    let rows: Vec<StoredMessage> = (0..5)
        .map(|i| StoredMessage::user("s1", format!("turn {i}")))
        .collect();

    for model in ["gpt-4o", "claude-sonnet-4", "gemini-2.0-flash"] {
        let prepared = prepare(&rows, &[], model, None, None);
        assert_eq!(prepared.chat.messages.len(), 5, "model {model}");
        for (i, msg) in prepared.chat.messages.iter().enumerate() {
            let text = msg
                .get("content")
                .and_then(Value::as_str)
                .map(str::to_owned)
                .unwrap_or_else(|| msg["parts"][0]["text"].as_str().unwrap_or("").to_owned());
            assert_eq!(text, format!("turn {i}"), "model {model}");
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Mid-session model switches
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[test]
fn switch_to_anthropic_converts_without_losing_the_tool_turn() {
    let prepared = prepare(
        &tool_turn_rows(),
        &[search_tool()],
        "claude-sonnet-4",
        Some("gpt-4"),
        Some("s1"),
    );

    assert_eq!(prepared.family, ProviderFamily::Anthropic);
    // Tool result rides as a user-role message, so: user, assistant, user, user.
    assert_eq!(prepared.chat.messages.len(), 4);

    let tool_use = &prepared.chat.messages[1]["content"][1];
    assert_eq!(tool_use["type"], json!("tool_use"));
    assert_eq!(tool_use["name"], json!("search"));
    assert_eq!(tool_use["input"], json!({"query": "x"}));
    let id = tool_use["id"].as_str().unwrap();
    assert!(id.starts_with("toolu_"), "converted id, got {id}");

    let result_block = &prepared.chat.messages[2]["content"][0];
    assert_eq!(result_block["type"], json!("tool_result"));
    assert_eq!(result_block["tool_use_id"].as_str().unwrap(), id);

    // Tool declarations re-encode for the new family.
    assert_eq!(prepared.tools[0]["name"], json!("search"));
    assert!(prepared.tools[0].get("input_schema").is_some());
}

#[test]
fn switch_to_google_converts_and_cleans_schemas() {
    let prepared = prepare(
        &tool_turn_rows(),
        &[search_tool()],
        "gemini-2.0-flash",
        Some("claude-sonnet-4"),
        None,
    );

    assert_eq!(prepared.family, ProviderFamily::Google);
    let model_msg = &prepared.chat.messages[1];
    assert_eq!(model_msg["role"], json!("model"));
    assert_eq!(model_msg["parts"][1]["functionCall"]["name"], json!("search"));

    let function_msg = &prepared.chat.messages[2];
    assert_eq!(function_msg["role"], json!("function"));
    assert_eq!(
        function_msg["parts"][0]["functionResponse"]["name"],
        json!("search")
    );

    let params = &prepared.tools[0]["functionDeclarations"][0]["parameters"];
    assert!(params.get("$schema").is_none());
    assert!(params.get("additionalProperties").is_none());
    assert_eq!(params["properties"]["query"], json!({"type": "string"}));
}

#[test]
fn unknown_target_model_strips_but_keeps_evidence() {
    let prepared = prepare(&tool_turn_rows(), &[], "mystery-model", Some("gpt-4"), None);

    // Unknown family encodes with the OpenAI default shape.
    assert_eq!(prepared.family, ProviderFamily::Unknown);
    let texts: Vec<&str> = prepared
        .chat
        .messages
        .iter()
        .filter_map(|m| m["content"].as_str())
        .collect();
    assert_eq!(texts.len(), prepared.chat.messages.len(), "all plain text");
    assert!(texts.iter().any(|t| t.contains("search")));
    assert!(texts.iter().any(|t| t.contains("found it")));
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Corrupt rows end to end
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[test]
fn corrupt_tool_payload_degrades_to_plain_text_payload() {
    let mut assistant = StoredMessage::assistant("s1", "best effort");
    assistant.tool_calls = Some(Value::String("not valid json{{{".into()));

    let rows = vec![StoredMessage::user("s1", "go"), assistant];
    let prepared = prepare(&rows, &[], "gpt-4o", Some("gpt-4"), Some("s1"));

    assert_eq!(prepared.chat.messages.len(), 2);
    let assistant_msg = &prepared.chat.messages[1];
    assert_eq!(assistant_msg["content"], json!("best effort"));
    assert!(assistant_msg.get("tool_calls").is_none());
}

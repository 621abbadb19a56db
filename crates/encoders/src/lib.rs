//! Provider wire-format encoders.
//!
//! One encoder per backend family (OpenAI-style, Anthropic-style,
//! Google-style). Each takes unified messages plus tool definitions and emits
//! the exact request shapes that family expects. All three pull system-role
//! messages out of the turn sequence and return them via the `system` side
//! channel, since every target backend uses an out-of-band system field.

pub mod anthropic;
pub mod google;
pub mod openai;
pub mod pipeline;

use serde_json::Value;
use tl_domain::family::{classify_model, ProviderFamily};
use tl_domain::message::{Message, ToolDefinition};

pub use anthropic::AnthropicEncoder;
pub use google::GoogleEncoder;
pub use openai::OpenAiEncoder;
pub use pipeline::{prepare, PreparedChat};

/// The encoded request body for one provider family.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedChat {
    /// Wire messages in conversation order, system turns excluded.
    pub messages: Vec<Value>,
    /// Joined system prompt, when the history carried system messages.
    pub system: Option<String>,
}

/// Contract every provider encoder implements.
///
/// Encoders are pure shape translators: they never validate tool names
/// against the declared tools and never fail. A tool-call part with a missing
/// name is encoded with whatever name is present.
pub trait ProviderEncoder: Send + Sync {
    fn encode_messages(&self, messages: &[Message]) -> EncodedChat;
    fn encode_tools(&self, tools: &[ToolDefinition]) -> Vec<Value>;
}

/// Select the encoder for a provider family.
///
/// Unknown families get the OpenAI encoder, the de-facto default wire format
/// for unrecognized endpoints.
pub fn encoder_for_family(family: ProviderFamily) -> &'static dyn ProviderEncoder {
    match family {
        ProviderFamily::Anthropic => &AnthropicEncoder,
        ProviderFamily::Google => &GoogleEncoder,
        ProviderFamily::OpenAi | ProviderFamily::Unknown => &OpenAiEncoder,
    }
}

/// Select the encoder for a model identifier.
pub fn encoder_for_model(model: &str) -> &'static dyn ProviderEncoder {
    encoder_for_family(classify_model(model))
}

/// Join extracted system texts into the side-channel field. Multiple system
/// messages concatenate with a blank line between them.
pub(crate) fn join_system(parts: Vec<String>) -> Option<String> {
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("\n\n"))
    }
}

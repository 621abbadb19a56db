//! End-to-end request preparation.
//!
//! Glues the three stages together for callers that hold raw persisted rows:
//! reconstruct to unified messages, normalize for the target model, then
//! encode with that model's family encoder. Pure in-memory transformation;
//! the actual HTTP call belongs to the provider streaming client.

use serde_json::Value;
use tl_domain::family::{classify_model, ProviderFamily};
use tl_domain::message::ToolDefinition;
use tl_domain::record::StoredMessage;
use tl_history::{normalize, reconstruct};

use crate::{encoder_for_family, EncodedChat};

/// Everything the provider client needs to issue the next turn.
#[derive(Debug, Clone)]
pub struct PreparedChat {
    /// Family the payload was encoded for.
    pub family: ProviderFamily,
    /// Encoded messages plus the extracted system prompt.
    pub chat: EncodedChat,
    /// Encoded tool declarations for the same family.
    pub tools: Vec<Value>,
}

/// Prepare the wire payload for a turn on `target_model`.
///
/// `previous_model` is the model that served the prior turn, used only to
/// decide whether cross-family conversion is needed. `log_tag` is threaded
/// to the reconstructor's diagnostics.
pub fn prepare(
    records: &[StoredMessage],
    tools: &[ToolDefinition],
    target_model: &str,
    previous_model: Option<&str>,
    log_tag: Option<&str>,
) -> PreparedChat {
    let history = reconstruct(records, log_tag);
    let history = normalize(history, target_model, previous_model);

    let family = classify_model(target_model);
    let encoder = encoder_for_family(family);
    tracing::debug!(
        target_model = %target_model,
        previous_model = previous_model.unwrap_or("-"),
        messages = history.len(),
        "prepared chat payload"
    );

    PreparedChat {
        family,
        chat: encoder.encode_messages(&history),
        tools: encoder.encode_tools(tools),
    }
}

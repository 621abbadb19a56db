//! Shared domain types for the conversation normalization core.
//!
//! Everything downstream of the storage boundary speaks the unified
//! [`message::Message`] shape; raw persisted rows ([`record::StoredMessage`])
//! only ever enter the pipeline through the history reconstructor.

pub mod error;
pub mod family;
pub mod message;
pub mod record;

//! History reconstruction and normalization.
//!
//! [`reconstruct`] turns persisted chat rows into unified messages, expanding
//! each assistant row's stored tool calls/results into the proper
//! assistant/tool message sequence. [`normalize`] then decides, based on a
//! model switch, whether tool-call structure must be converted for the target
//! provider family or can pass through unchanged.

pub mod normalize;
pub mod reconstruct;

pub use normalize::{has_tool_calls, normalize, strip_tool_call_history};
pub use reconstruct::reconstruct;

//! Barista agent: one conversation with one customer at a time.
//!
//! The hosting voice platform turns speech into text, lets its language
//! model pick order tools, and speaks back whatever the tools return. This
//! crate owns the per-conversation state behind those tools and reports
//! what happened as a stream of [`AgentEvent`]s.

use serde::{Deserialize, Serialize};

pub mod metrics;
pub mod prompt;
pub mod session;

pub use session::BaristaSession;

/// Events emitted while a session handles tool calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AgentEvent {
    /// A tool call is being made.
    #[serde(rename = "tool_call")]
    ToolCall {
        tool: String,
        params: serde_json::Value,
    },

    /// A tool call has completed.
    #[serde(rename = "tool_result")]
    ToolResult {
        tool: String,
        content: String,
        is_error: bool,
    },

    /// An order was saved and the session is ready for the next customer.
    #[serde(rename = "order_completed")]
    OrderCompleted { summary: String },

    /// An error occurred while handling a tool call.
    #[serde(rename = "error")]
    Error { kind: String, message: String },
}

/// Per-session counters, logged when the session shuts down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageSummary {
    pub tool_calls: u64,
    pub tool_errors: u64,
    pub orders_completed: u64,
}

use homescout_core::RoleKind;
use serde::Serialize;
use serde_json::Value;

/// Where the router is within a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "role", rename_all = "snake_case")]
pub enum TurnState {
    Idle,
    RoleActive(RoleKind),
    TurnComplete,
}

/// What a turn stream reports to the caller, in order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RouterEvent {
    /// A role took control.
    RoleChanged { role: String, kind: RoleKind },
    /// Streamed text from the active role. Observational only.
    TextDelta { role: String, text: String },
    ToolCall { role: String, name: String, args: Value },
    ToolResult { role: String, name: String, response: Value },
    Handoff { from: String, to: String },
    /// The coordinator produced the turn's final reply.
    TurnComplete { role: String, text: String, hops: usize },
}

impl RouterEvent {
    pub fn role(&self) -> &str {
        match self {
            RouterEvent::RoleChanged { role, .. }
            | RouterEvent::TextDelta { role, .. }
            | RouterEvent::ToolCall { role, .. }
            | RouterEvent::ToolResult { role, .. }
            | RouterEvent::TurnComplete { role, .. } => role,
            RouterEvent::Handoff { from, .. } => from,
        }
    }
}

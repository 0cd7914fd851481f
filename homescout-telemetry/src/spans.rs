//! Span helpers for common HomeScout operations.

use tracing::Span;

/// Span covering one user turn through the router.
pub fn turn_span(invocation_id: &str) -> Span {
    tracing::info_span!("turn", invocation.id = invocation_id)
}

/// Create a span for a single role invocation
///
/// # Example
/// ```
/// use homescout_telemetry::role_run_span;
/// let span = role_run_span("retrieval", "inv-123");
/// let _enter = span.enter();
/// ```
pub fn role_run_span(role_name: &str, invocation_id: &str) -> Span {
    tracing::info_span!("role.run", role.name = role_name, invocation.id = invocation_id)
}

/// Create a span for model API calls
pub fn model_call_span(model_name: &str) -> Span {
    tracing::info_span!("model.call", model.name = model_name)
}

/// Create a span for tool execution
pub fn tool_execute_span(tool_name: &str) -> Span {
    tracing::info_span!("tool.execute", tool.name = tool_name)
}

/// Create a span for embedding calls
pub fn embedding_span(provider: &str, inputs: usize) -> Span {
    tracing::debug_span!("embedding", embedding.provider = provider, embedding.inputs = inputs)
}

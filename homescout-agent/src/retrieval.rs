use std::sync::Arc;

use async_trait::async_trait;
use futures::stream;
use homescout_core::{
    Content, Event, EventStream, InvocationContext, MessageRole, Part, Result, Role, RoleKind,
    ScoutError, Tool,
};
use homescout_telemetry::debug;
use serde_json::{Value, json};

use crate::instructions::{NO_LISTINGS_FOUND, retrieval_instructions};
use crate::reply::say;

/// Tool output meaning the search matched nothing.
pub const EMPTY_RESULT_SENTINEL: &str = "NO_PROPERTIES_FOUND";

/// Answers property questions strictly from the listing search tool.
///
/// On its first activation in a turn it requests one search with the user's
/// latest message as the question. After the result arrives it reports the
/// listings, or [`NO_LISTINGS_FOUND`] on an empty result, and hands control
/// back to the coordinator.
pub struct RetrievalRole {
    name: String,
    description: String,
    instructions: String,
    tools: Vec<Arc<dyn Tool>>,
}

impl RetrievalRole {
    /// `search` must take a string `question` and return the matched listings
    /// or [`EMPTY_RESULT_SENTINEL`].
    pub fn new(search: Arc<dyn Tool>) -> Self {
        let instructions =
            retrieval_instructions(search.name(), RoleKind::Coordinator.default_name());
        Self {
            name: RoleKind::Retrieval.default_name().to_string(),
            description: "Finds property listings matching the user's request".to_string(),
            instructions,
            tools: vec![search],
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    fn search_tool(&self) -> Result<&Arc<dyn Tool>> {
        self.tools
            .first()
            .ok_or_else(|| ScoutError::Role(format!("{} has no search tool", self.name)))
    }

    /// Output of this turn's search, if it already ran.
    fn search_result(&self, ctx: &dyn InvocationContext, tool: &str) -> Option<String> {
        ctx.history()
            .current_turn()
            .iter()
            .rev()
            .filter(|m| m.role == MessageRole::Tool && m.author == self.name)
            .flat_map(|m| m.parts.iter())
            .find_map(|part| match part {
                Part::FunctionResponse { function_response, .. }
                    if function_response.name == tool =>
                {
                    Some(tool_output_text(&function_response.response))
                }
                _ => None,
            })
    }
}

fn tool_output_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[async_trait]
impl Role for RetrievalRole {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> RoleKind {
        RoleKind::Retrieval
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn instructions(&self) -> &str {
        &self.instructions
    }

    fn tools(&self) -> &[Arc<dyn Tool>] {
        &self.tools
    }

    async fn run(&self, ctx: Arc<dyn InvocationContext>) -> Result<EventStream> {
        let tool = self.search_tool()?;
        let invocation_id = ctx.invocation_id();

        let Some(output) = self.search_result(ctx.as_ref(), tool.name()) else {
            let question =
                ctx.history().latest_user_message().map(|m| m.text()).unwrap_or_default();
            debug!(tool = tool.name(), question = %question, "requesting listing search");
            let call = Part::function_call(
                tool.name(),
                json!({ "question": question }),
                Some(format!("call_{}", uuid::Uuid::new_v4().simple())),
            );
            let content = Content::new("model").with_part(call);
            let event = Event::message(invocation_id, &self.name, content);
            return Ok(Box::pin(stream::iter(vec![Ok(event)])));
        };

        let trimmed = output.trim();
        let text = if trimmed.is_empty() || trimmed == EMPTY_RESULT_SENTINEL {
            NO_LISTINGS_FOUND
        } else {
            output.as_str()
        };

        let mut events = say(invocation_id, &self.name, text);
        if let Some(coordinator) = ctx.target_for(RoleKind::Coordinator) {
            events.push(Ok(Event::handoff(invocation_id, &self.name, &coordinator.name)));
        }
        Ok(Box::pin(stream::iter(events)))
    }
}

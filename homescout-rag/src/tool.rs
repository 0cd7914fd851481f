use std::sync::Arc;

use async_trait::async_trait;
use homescout_core::{Result, ScoutError, Tool, ToolContext};
use homescout_telemetry::{info, tool_execute_span};
use serde_json::{Value, json};
use tracing::Instrument;

use crate::store::ListingStore;

/// Name the retrieval role advertises for listing search.
pub const SEARCH_LISTINGS_TOOL: &str = "search_listings";

/// Exposes [`ListingStore::search`] as a tool taking a `question`.
///
/// Returns the matched search documents joined by newlines, or the
/// `NO_PROPERTIES_FOUND` sentinel.
pub struct SearchListingsTool {
    store: Arc<ListingStore>,
    top_k: usize,
}

impl SearchListingsTool {
    pub fn new(store: Arc<ListingStore>) -> Self {
        let top_k = store.config().top_k;
        Self { store, top_k }
    }

    #[must_use]
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }
}

#[async_trait]
impl Tool for SearchListingsTool {
    fn name(&self) -> &str {
        SEARCH_LISTINGS_TOOL
    }

    fn description(&self) -> &str {
        "Searches the property listing database and returns the best matching listings."
    }

    fn parameters_schema(&self) -> Option<Value> {
        Some(json!({
            "type": "object",
            "properties": {
                "question": {
                    "type": "string",
                    "description": "The user's property question, in their own words"
                }
            },
            "required": ["question"]
        }))
    }

    async fn execute(&self, ctx: Arc<dyn ToolContext>, args: Value) -> Result<Value> {
        let question = args["question"]
            .as_str()
            .ok_or_else(|| ScoutError::Tool("question must be a string".to_string()))?;

        info!("Tool Call: '{}' (Args: [question = {}])", SEARCH_LISTINGS_TOOL, question);

        let outcome = self
            .store
            .search(question, self.top_k)
            .instrument(tool_execute_span(SEARCH_LISTINGS_TOOL))
            .await?;
        info!(
            role = ctx.role_name(),
            call_id = ctx.function_call_id(),
            hits = outcome.hits().len(),
            "listing search finished"
        );
        Ok(Value::String(outcome.to_tool_output()))
    }
}

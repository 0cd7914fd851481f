use crate::model::LlmResponse;
use crate::types::Content;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single output of a role invocation.
///
/// Partial events carry streamed text deltas and are observational only.
/// Non-partial events carry the message the role wants committed to history,
/// and may request a handoff through [`EventActions::transfer_to_role`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub invocation_id: String,
    pub author: String,
    #[serde(flatten)]
    pub llm_response: LlmResponse,
    pub actions: EventActions,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventActions {
    /// Name of the role that should take control next.
    pub transfer_to_role: Option<String>,
}

impl Event {
    pub fn new(invocation_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            invocation_id: invocation_id.into(),
            author: String::new(),
            llm_response: LlmResponse::default(),
            actions: EventActions::default(),
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    /// Final event carrying `content`.
    pub fn message(
        invocation_id: impl Into<String>,
        author: impl Into<String>,
        content: Content,
    ) -> Self {
        let mut event = Self::new(invocation_id).with_author(author);
        event.llm_response = LlmResponse::new(content);
        event
    }

    /// Partial event carrying a streamed text fragment.
    pub fn delta(
        invocation_id: impl Into<String>,
        author: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        let mut event = Self::new(invocation_id).with_author(author);
        event.llm_response = LlmResponse::partial_text(text);
        event
    }

    /// Final event that hands control to `target`.
    pub fn handoff(
        invocation_id: impl Into<String>,
        author: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        let mut event = Self::new(invocation_id).with_author(author);
        event.llm_response.turn_complete = true;
        event.actions.transfer_to_role = Some(target.into());
        event
    }

    pub fn content(&self) -> Option<&Content> {
        self.llm_response.content.as_ref()
    }

    pub fn set_content(&mut self, content: Content) {
        self.llm_response.content = Some(content);
    }

    pub fn is_partial(&self) -> bool {
        self.llm_response.partial
    }

    pub fn text(&self) -> String {
        self.content().map(Content::text).unwrap_or_default()
    }
}

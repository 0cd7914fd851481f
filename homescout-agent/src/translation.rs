use std::sync::Arc;

use async_trait::async_trait;
use futures::{StreamExt, stream};
use homescout_core::{
    Content, Event, EventStream, InvocationContext, Llm, LlmRequest, Result, Role, RoleKind,
    ScoutError,
};
use homescout_telemetry::debug;

use crate::instructions::{
    DEFAULT_TARGET_LANGUAGE, NO_LISTINGS_FOUND, NOTHING_TO_TRANSLATE, translation_instructions,
};
use crate::reply::{model_reply, say};

/// Translates the latest retrieval output into a fixed language.
///
/// Reads history only and calls no tools. Without any listings to work on it
/// answers [`NOTHING_TO_TRANSLATE`].
pub struct TranslationRole {
    name: String,
    description: String,
    source_role: String,
    language: String,
    instructions: String,
    model: Option<Arc<dyn Llm>>,
}

impl TranslationRole {
    pub fn new(model: Arc<dyn Llm>) -> Self {
        Self::with_model(Some(model))
    }

    /// A translation role with no model. It still reports when there is
    /// nothing to translate, but fails any real translation request.
    pub fn unavailable() -> Self {
        Self::with_model(None)
    }

    fn with_model(model: Option<Arc<dyn Llm>>) -> Self {
        let source_role = RoleKind::Retrieval.default_name().to_string();
        Self {
            name: RoleKind::Translation.default_name().to_string(),
            description: "Translates the latest property listings".to_string(),
            instructions: translation_instructions(&source_role, DEFAULT_TARGET_LANGUAGE),
            source_role,
            language: DEFAULT_TARGET_LANGUAGE.to_string(),
            model,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self.instructions = translation_instructions(&self.source_role, &self.language);
        self
    }

    /// Name of the role whose output gets translated.
    pub fn with_source_role(mut self, source_role: impl Into<String>) -> Self {
        self.source_role = source_role.into();
        self.instructions = translation_instructions(&self.source_role, &self.language);
        self
    }

    pub fn language(&self) -> &str {
        &self.language
    }
}

#[async_trait]
impl Role for TranslationRole {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> RoleKind {
        RoleKind::Translation
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn instructions(&self) -> &str {
        &self.instructions
    }

    async fn run(&self, ctx: Arc<dyn InvocationContext>) -> Result<EventStream> {
        let invocation_id = ctx.invocation_id().to_string();
        let handoff: Vec<Result<Event>> = ctx
            .target_for(RoleKind::Coordinator)
            .map(|coordinator| Ok(Event::handoff(&invocation_id, &self.name, &coordinator.name)))
            .into_iter()
            .collect();

        let listings = ctx
            .history()
            .latest_text_from(&self.source_role)
            .filter(|text| text.trim() != NO_LISTINGS_FOUND);
        let Some(listings) = listings else {
            debug!(source = %self.source_role, "no listings to translate");
            let mut events = say(&invocation_id, &self.name, NOTHING_TO_TRANSLATE);
            events.extend(handoff);
            return Ok(Box::pin(stream::iter(events)));
        };

        let model = self.model.clone().ok_or_else(|| {
            ScoutError::Role(format!("{} requires a chat model and none is configured", self.name))
        })?;

        debug!(language = %self.language, chars = listings.len(), "translating listings");
        let request = LlmRequest::new(model.name(), vec![Content::new("user").with_text(listings)])
            .with_instruction(self.instructions.clone());
        let reply = model_reply(model, request, invocation_id, self.name.clone());
        Ok(Box::pin(reply.chain(stream::iter(handoff))))
    }
}

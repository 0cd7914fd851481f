use std::sync::Arc;

use async_trait::async_trait;
use futures::stream;
use homescout_core::{
    Content, Event, EventStream, InvocationContext, Llm, LlmRequest, Message, MessageRole,
    Result, Role, RoleKind, ScoutError,
};
use homescout_telemetry::{debug, info};

use crate::instructions::{
    HELP_TEXT, NO_LISTINGS_FOUND, NOTHING_TO_TRANSLATE, coordinator_instructions,
};
use crate::intent::{Intent, IntentClassifier, KeywordClassifier};
use crate::reply::{model_reply, say, transcript};

/// Entry and exit point of every turn.
///
/// On a fresh user message the coordinator classifies the request and hands
/// off to the retrieval or translation role. Once a specialist has answered
/// within the turn, it presents that answer and ends the turn. It never calls
/// tools.
pub struct CoordinatorRole {
    name: String,
    description: String,
    instructions: String,
    classifier: Arc<dyn IntentClassifier>,
    responder: Option<Arc<dyn Llm>>,
}

impl CoordinatorRole {
    pub fn builder() -> CoordinatorRoleBuilder {
        CoordinatorRoleBuilder::default()
    }

    /// Latest specialist message of the current turn, with its role kind when
    /// known.
    fn specialist_output<'a>(
        &self,
        ctx: &'a dyn InvocationContext,
    ) -> Option<(&'a Message, Option<RoleKind>)> {
        ctx.history()
            .current_turn()
            .iter()
            .rev()
            .filter(|m| m.role == MessageRole::Assistant && m.author != self.name)
            .find(|m| !m.text().trim().is_empty())
            .map(|m| (m, ctx.kind_of(&m.author)))
    }

    fn present(
        &self,
        ctx: &dyn InvocationContext,
        message: &Message,
        kind: Option<RoleKind>,
    ) -> EventStream {
        let invocation_id = ctx.invocation_id().to_string();
        let text = message.text();
        let verbatim = text == NO_LISTINGS_FOUND
            || text == NOTHING_TO_TRANSLATE
            || kind == Some(RoleKind::Translation);

        match (&self.responder, verbatim) {
            (Some(model), false) => {
                debug!(source = %message.author, "summarizing specialist output");
                let question =
                    ctx.history().latest_user_message().map(Message::text).unwrap_or_default();
                let prompt = format!(
                    "User request: {question}\n\nOutput from {}:\n{text}\n\n\
                     Summarize and present this output to the user.",
                    message.author
                );
                let request =
                    LlmRequest::new(model.name(), vec![Content::new("user").with_text(prompt)])
                        .with_instruction(self.instructions.clone());
                Box::pin(model_reply(model.clone(), request, invocation_id, self.name.clone()))
            }
            _ => Box::pin(stream::iter(say(&invocation_id, &self.name, &text))),
        }
    }

    fn answer(&self, ctx: &dyn InvocationContext) -> EventStream {
        let invocation_id = ctx.invocation_id().to_string();
        match &self.responder {
            Some(model) => {
                let request = LlmRequest::new(model.name(), transcript(ctx.history().messages()))
                    .with_instruction(self.instructions.clone());
                Box::pin(model_reply(model.clone(), request, invocation_id, self.name.clone()))
            }
            None => Box::pin(stream::iter(say(&invocation_id, &self.name, HELP_TEXT))),
        }
    }

    fn hand_off(&self, ctx: &dyn InvocationContext, kind: RoleKind) -> Result<EventStream> {
        let target = ctx.target_for(kind).ok_or_else(|| {
            ScoutError::Role(format!("{} has no handoff target for the {kind} role", self.name))
        })?;
        info!(from = %self.name, to = %target.name, "handing off");
        let event = Event::handoff(ctx.invocation_id(), &self.name, &target.name);
        Ok(Box::pin(stream::iter(vec![Ok(event)])))
    }
}

#[async_trait]
impl Role for CoordinatorRole {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> RoleKind {
        RoleKind::Coordinator
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn instructions(&self) -> &str {
        &self.instructions
    }

    async fn run(&self, ctx: Arc<dyn InvocationContext>) -> Result<EventStream> {
        if let Some((message, kind)) = self.specialist_output(ctx.as_ref()) {
            return Ok(self.present(ctx.as_ref(), message, kind));
        }

        let intent = self.classifier.classify(ctx.history()).await?;
        debug!(intent = intent.label(), "coordinator decision");
        match intent {
            Intent::PropertySearch => self.hand_off(ctx.as_ref(), RoleKind::Retrieval),
            Intent::Translate => self.hand_off(ctx.as_ref(), RoleKind::Translation),
            Intent::General => Ok(self.answer(ctx.as_ref())),
        }
    }
}

pub struct CoordinatorRoleBuilder {
    name: String,
    description: String,
    instructions: Option<String>,
    classifier: Option<Arc<dyn IntentClassifier>>,
    responder: Option<Arc<dyn Llm>>,
}

impl Default for CoordinatorRoleBuilder {
    fn default() -> Self {
        Self {
            name: RoleKind::Coordinator.default_name().to_string(),
            description: "Routes each request and presents the final answer".to_string(),
            instructions: None,
            classifier: None,
            responder: None,
        }
    }
}

impl CoordinatorRoleBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    /// Defaults to [`KeywordClassifier`].
    pub fn classifier(mut self, classifier: Arc<dyn IntentClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    /// Model used to summarize specialist output and answer general questions.
    pub fn responder(mut self, model: Arc<dyn Llm>) -> Self {
        self.responder = Some(model);
        self
    }

    pub fn build(self) -> CoordinatorRole {
        let instructions = self.instructions.unwrap_or_else(|| {
            coordinator_instructions(
                RoleKind::Retrieval.default_name(),
                RoleKind::Translation.default_name(),
            )
        });
        CoordinatorRole {
            name: self.name,
            description: self.description,
            instructions,
            classifier: self.classifier.unwrap_or_else(|| Arc::new(KeywordClassifier::new())),
            responder: self.responder,
        }
    }
}

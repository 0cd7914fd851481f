#![allow(dead_code)]

use std::sync::Arc;

use futures::StreamExt;
use homescout_core::{
    ConversationHistory, Event, HandoffTarget, InvocationContext, Message, Part, Role, RoleKind,
};

pub struct TestContext {
    role_name: String,
    history: ConversationHistory,
    targets: Vec<HandoffTarget>,
}

impl TestContext {
    pub fn new(role_name: &str, history: ConversationHistory, targets: &[RoleKind]) -> Self {
        Self {
            role_name: role_name.to_string(),
            history,
            targets: targets
                .iter()
                .map(|kind| HandoffTarget { kind: *kind, name: kind.default_name().to_string() })
                .collect(),
        }
    }
}

impl InvocationContext for TestContext {
    fn invocation_id(&self) -> &str {
        "test-inv"
    }

    fn role_name(&self) -> &str {
        &self.role_name
    }

    fn history(&self) -> &ConversationHistory {
        &self.history
    }

    fn handoff_targets(&self) -> &[HandoffTarget] {
        &self.targets
    }
}

pub fn history(messages: Vec<Message>) -> ConversationHistory {
    let mut history = ConversationHistory::new();
    for message in messages {
        history.append(message);
    }
    history
}

pub fn said(author: &str, text: &str) -> Message {
    Message::assistant(author, vec![Part::text_part(text)])
}

/// Run `role` against `history` with the given handoff targets and collect
/// every event it yields.
pub async fn run_role(
    role: &dyn Role,
    history: ConversationHistory,
    targets: &[RoleKind],
) -> Vec<Event> {
    let ctx: Arc<dyn InvocationContext> = Arc::new(TestContext::new(role.name(), history, targets));
    let stream = role.run(ctx).await.unwrap();
    stream.map(|event| event.unwrap()).collect().await
}

/// Text of the non-partial events, concatenated.
pub fn committed_text(events: &[Event]) -> String {
    events.iter().filter(|e| !e.is_partial()).map(Event::text).collect()
}

pub fn streamed_text(events: &[Event]) -> String {
    events.iter().filter(|e| e.is_partial()).map(Event::text).collect()
}

pub fn handoff(events: &[Event]) -> Option<String> {
    events.iter().find_map(|e| e.actions.transfer_to_role.clone())
}

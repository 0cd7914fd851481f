use homescout_core::{ConversationHistory, HandoffTarget, InvocationContext, ToolContext};

/// Context for one hop. Roles see a snapshot of the history taken before the
/// hop started; nothing they do is visible to them until the router commits it.
pub(crate) struct HopContext {
    invocation_id: String,
    role_name: String,
    history: ConversationHistory,
    targets: Vec<HandoffTarget>,
}

impl HopContext {
    pub(crate) fn new(
        invocation_id: impl Into<String>,
        role_name: impl Into<String>,
        history: ConversationHistory,
        targets: Vec<HandoffTarget>,
    ) -> Self {
        Self {
            invocation_id: invocation_id.into(),
            role_name: role_name.into(),
            history,
            targets,
        }
    }
}

impl InvocationContext for HopContext {
    fn invocation_id(&self) -> &str {
        &self.invocation_id
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

pub(crate) struct CallContext {
    invocation_id: String,
    function_call_id: String,
    role_name: String,
}

impl CallContext {
    pub(crate) fn new(invocation_id: &str, function_call_id: &str, role_name: &str) -> Self {
        Self {
            invocation_id: invocation_id.to_string(),
            function_call_id: function_call_id.to_string(),
            role_name: role_name.to_string(),
        }
    }
}

impl ToolContext for CallContext {
    fn invocation_id(&self) -> &str {
        &self.invocation_id
    }

    fn function_call_id(&self) -> &str {
        &self.function_call_id
    }

    fn role_name(&self) -> &str {
        &self.role_name
    }
}

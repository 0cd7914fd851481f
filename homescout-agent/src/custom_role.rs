use homescout_core::{EventStream, InvocationContext, Result, Role, RoleKind, ScoutError, Tool};
use async_trait::async_trait;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

type RunHandler = Box<
    dyn Fn(Arc<dyn InvocationContext>) -> Pin<Box<dyn Future<Output = Result<EventStream>> + Send>>
        + Send
        + Sync,
>;

/// A role whose behavior is a closure. Useful for scripted roles in tests
/// and for one-off specialists.
pub struct CustomRole {
    name: String,
    kind: RoleKind,
    description: String,
    instructions: String,
    tools: Vec<Arc<dyn Tool>>,
    handler: RunHandler,
}

impl CustomRole {
    pub fn builder(name: impl Into<String>, kind: RoleKind) -> CustomRoleBuilder {
        CustomRoleBuilder::new(name, kind)
    }
}

#[async_trait]
impl Role for CustomRole {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> RoleKind {
        self.kind
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
        (self.handler)(ctx).await
    }
}

pub struct CustomRoleBuilder {
    name: String,
    kind: RoleKind,
    description: String,
    instructions: String,
    tools: Vec<Arc<dyn Tool>>,
    handler: Option<RunHandler>,
}

impl CustomRoleBuilder {
    pub fn new(name: impl Into<String>, kind: RoleKind) -> Self {
        Self {
            name: name.into(),
            kind,
            description: String::new(),
            instructions: String::new(),
            tools: Vec::new(),
            handler: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    pub fn tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.push(tool);
        self
    }

    pub fn handler<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(Arc<dyn InvocationContext>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<EventStream>> + Send + 'static,
    {
        self.handler = Some(Box::new(move |ctx| Box::pin(handler(ctx))));
        self
    }

    pub fn build(self) -> Result<CustomRole> {
        let handler = self.handler.ok_or_else(|| {
            ScoutError::Role(format!("CustomRole '{}' requires a handler", self.name))
        })?;

        let mut seen = std::collections::HashSet::new();
        for tool in &self.tools {
            if !seen.insert(tool.name()) {
                return Err(ScoutError::Role(format!("Duplicate tool name: {}", tool.name())));
            }
        }

        Ok(CustomRole {
            name: self.name,
            kind: self.kind,
            description: self.description,
            instructions: self.instructions,
            tools: self.tools,
            handler,
        })
    }
}

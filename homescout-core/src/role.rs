use crate::{ConversationHistory, Result, event::Event, tool::Tool};
use async_trait::async_trait;
use futures::stream::Stream;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::pin::Pin;
use std::sync::Arc;

pub type EventStream = Pin<Box<dyn Stream<Item = Result<Event>> + Send>>;

/// The closed set of role variants a conversation is routed between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleKind {
    Coordinator,
    Retrieval,
    Translation,
}

impl RoleKind {
    pub const ALL: [RoleKind; 3] =
        [RoleKind::Coordinator, RoleKind::Retrieval, RoleKind::Translation];

    /// Name used when a role is built without an explicit one.
    pub fn default_name(&self) -> &'static str {
        match self {
            RoleKind::Coordinator => "coordinator",
            RoleKind::Retrieval => "retrieval",
            RoleKind::Translation => "translation",
        }
    }

    pub fn is_coordinator(&self) -> bool {
        matches!(self, RoleKind::Coordinator)
    }
}

impl fmt::Display for RoleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.default_name())
    }
}

/// A role the active role may transfer control to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandoffTarget {
    pub kind: RoleKind,
    pub name: String,
}

#[async_trait]
pub trait Role: Send + Sync {
    fn name(&self) -> &str;
    fn kind(&self) -> RoleKind;
    fn description(&self) -> &str;
    fn instructions(&self) -> &str;
    fn tools(&self) -> &[Arc<dyn Tool>] {
        &[]
    }

    async fn run(&self, ctx: Arc<dyn InvocationContext>) -> Result<EventStream>;
}

/// Read-only view handed to a role for one invocation.
pub trait InvocationContext: Send + Sync {
    fn invocation_id(&self) -> &str;
    fn role_name(&self) -> &str;
    fn history(&self) -> &ConversationHistory;
    fn handoff_targets(&self) -> &[HandoffTarget];

    fn target_for(&self, kind: RoleKind) -> Option<&HandoffTarget> {
        self.handoff_targets().iter().find(|t| t.kind == kind)
    }

    /// Kind of the role called `name`, if it is one of the handoff targets.
    fn kind_of(&self, name: &str) -> Option<RoleKind> {
        self.handoff_targets().iter().find(|t| t.name == name).map(|t| t.kind)
    }
}

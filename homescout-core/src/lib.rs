//! # homescout-core
//!
//! Core traits and types shared by every HomeScout crate.
//!
//! - [`Role`] - a named behavior unit the router dispatches to
//! - [`Tool`] - a callable capability exposed by a role
//! - [`Llm`] - a chat model backend
//! - [`ConversationHistory`] - the append-only log shared by all roles
//! - [`Event`] - what a role streams back while it runs
//! - [`ScoutError`] / [`Result`] - unified error handling
//!
//! ```rust,ignore
//! #[async_trait]
//! pub trait Role: Send + Sync {
//!     fn name(&self) -> &str;
//!     fn kind(&self) -> RoleKind;
//!     async fn run(&self, ctx: Arc<dyn InvocationContext>) -> Result<EventStream>;
//! }
//! ```

pub mod error;
pub mod event;
pub mod message;
pub mod model;
pub mod role;
pub mod tool;
pub mod types;

pub use error::{Result, ScoutError};
pub use event::{Event, EventActions};
pub use message::{ConversationHistory, Message, MessageRole, USER_AUTHOR};
pub use model::{
    FinishReason, GenerateContentConfig, Llm, LlmRequest, LlmResponse, LlmResponseStream,
    UsageMetadata,
};
pub use role::{EventStream, HandoffTarget, InvocationContext, Role, RoleKind};
pub use tool::{Tool, ToolContext};
pub use types::{Content, FunctionResponseData, Part};

//! # homescout-agent
//!
//! The roles a HomeScout conversation is routed between.
//!
//! - [`CoordinatorRole`] - entry and exit of every turn; routes by [`Intent`]
//! - [`RetrievalRole`] - answers from the listing search tool only
//! - [`TranslationRole`] - translates the latest retrieval output
//! - [`CustomRole`] - a role driven by a closure
//!
//! Roles never touch shared history. They read the snapshot in their
//! [`InvocationContext`](homescout_core::InvocationContext) and stream
//! [`Event`](homescout_core::Event)s back to the router.

mod coordinator;
mod custom_role;
pub mod instructions;
pub mod intent;
mod reply;
mod retrieval;
mod translation;

pub use coordinator::{CoordinatorRole, CoordinatorRoleBuilder};
pub use custom_role::{CustomRole, CustomRoleBuilder};
pub use instructions::{HELP_TEXT, NO_LISTINGS_FOUND, NOTHING_TO_TRANSLATE};
pub use intent::{Intent, IntentClassifier, KeywordClassifier, LlmIntentClassifier};
pub use retrieval::{EMPTY_RESULT_SENTINEL, RetrievalRole};
pub use translation::TranslationRole;

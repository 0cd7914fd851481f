//! # homescout-model
//!
//! Chat model backends for HomeScout roles.
//!
//! - [`OpenAIClient`] speaks the chat-completions protocol to OpenAI or an
//!   Azure OpenAI deployment (feature `openai`, on by default)
//! - [`MockLlm`] replays scripted responses in tests
//! - [`retry`] holds the backoff policy shared with the embedding clients

pub mod mock;
#[cfg(feature = "openai")]
pub mod openai;
pub mod retry;

pub use mock::MockLlm;
#[cfg(feature = "openai")]
pub use openai::{AzureConfig, OpenAIClient, OpenAIConfig};
pub use retry::{AttemptError, RetryConfig, execute_attempts, is_retryable_status_code};

//! OpenAI chat-completions provider, usable against api.openai.com or an
//! Azure OpenAI deployment.
//!
//! ```rust,ignore
//! use homescout_model::openai::{AzureConfig, OpenAIClient};
//!
//! let config = AzureConfig::new(
//!     "https://my-resource.openai.azure.com",
//!     "my-api-key",
//!     "gpt-4o",
//! );
//! let client = OpenAIClient::azure(config)?;
//! ```

mod client;
mod config;
pub(crate) mod convert;

pub use client::OpenAIClient;
pub use config::{AzureConfig, DEFAULT_AZURE_API_VERSION, OpenAIConfig};

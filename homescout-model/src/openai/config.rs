//! Configuration types for OpenAI providers.

use serde::{Deserialize, Serialize};

pub const DEFAULT_AZURE_API_VERSION: &str = "2024-10-21";

/// Configuration for the public OpenAI API or a compatible server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIConfig {
    pub api_key: String,
    /// Model name (e.g., "gpt-4o-mini").
    pub model: String,
    /// Custom base URL for OpenAI-compatible APIs. Defaults to `https://api.openai.com/v1`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl OpenAIConfig {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self { api_key: api_key.into(), model: model.into(), base_url: None }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }
}

/// Configuration for an Azure OpenAI deployment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AzureConfig {
    /// Resource endpoint (e.g., `https://my-resource.openai.azure.com`).
    pub endpoint: String,
    pub api_key: String,
    /// Deployment name of the chat model.
    pub deployment: String,
    pub api_version: String,
}

impl AzureConfig {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        deployment: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            deployment: deployment.into(),
            api_version: DEFAULT_AZURE_API_VERSION.to_string(),
        }
    }

    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    /// URL of an operation (`chat/completions`, `embeddings`) on this deployment.
    pub fn operation_url(&self, operation: &str) -> String {
        format!(
            "{}/openai/deployments/{}/{}?api-version={}",
            self.endpoint.trim_end_matches('/'),
            self.deployment,
            operation,
            self.api_version
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_azure_operation_url() {
        let config = AzureConfig::new("https://res.openai.azure.com/", "key", "gpt-4o");
        assert_eq!(
            config.operation_url("chat/completions"),
            "https://res.openai.azure.com/openai/deployments/gpt-4o/chat/completions?api-version=2024-10-21"
        );
    }

    #[test]
    fn test_api_version_override() {
        let config = AzureConfig::new("https://res", "key", "emb").with_api_version("2024-02-01");
        assert!(config.operation_url("embeddings").ends_with("embeddings?api-version=2024-02-01"));
    }
}

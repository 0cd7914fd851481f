//! Azure OpenAI embeddings over REST.

use async_trait::async_trait;
use homescout_core::ScoutError;
use homescout_model::{AttemptError, AzureConfig, RetryConfig, execute_attempts};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};

const PROVIDER: &str = "azure-openai";

/// Output size of `text-embedding-3-small` and `text-embedding-ada-002`.
pub const DEFAULT_EMBEDDING_DIMENSIONS: usize = 1536;

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

/// [`EmbeddingProvider`] calling an Azure OpenAI embedding deployment.
///
/// Transient failures (408, 429, 5xx, timeouts) are retried with backoff.
pub struct AzureOpenAIEmbeddingProvider {
    client: Client,
    url: String,
    api_key: String,
    dimensions: usize,
    request_dimensions: bool,
    retry_config: RetryConfig,
}

impl AzureOpenAIEmbeddingProvider {
    pub fn new(config: AzureConfig) -> Result<Self> {
        let client = Client::builder().build().map_err(|e| RagError::Embedding {
            provider: PROVIDER.to_string(),
            message: format!("failed to create HTTP client: {e}"),
        })?;
        Ok(Self {
            client,
            url: config.operation_url("embeddings"),
            api_key: config.api_key,
            dimensions: DEFAULT_EMBEDDING_DIMENSIONS,
            request_dimensions: false,
            retry_config: RetryConfig::default(),
        })
    }

    /// Ask the deployment for shortened vectors. Only `text-embedding-3-*`
    /// models support this.
    #[must_use]
    pub fn with_dimensions(mut self, dimensions: usize) -> Self {
        self.dimensions = dimensions;
        self.request_dimensions = true;
        self
    }

    #[must_use]
    pub fn with_retry_config(mut self, retry_config: RetryConfig) -> Self {
        self.retry_config = retry_config;
        self
    }

    async fn request(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut body = json!({ "input": inputs });
        if self.request_dimensions {
            body["dimensions"] = json!(self.dimensions);
        }

        let (client, url, api_key, body) = (&self.client, &self.url, &self.api_key, &body);
        let parsed: EmbeddingResponse = execute_attempts(&self.retry_config, move || async move {
            let response = client.post(url).header("api-key", api_key).json(body).send().await.map_err(
                |e| {
                    let error = ScoutError::Embedding(format!("request failed: {e}"));
                    if e.is_timeout() || e.is_connect() {
                        AttemptError::retryable(error)
                    } else {
                        AttemptError::fatal(error)
                    }
                },
            )?;

            let status = response.status();
            if !status.is_success() {
                let text = response.text().await.unwrap_or_default();
                return Err(AttemptError::from_status(
                    status.as_u16(),
                    ScoutError::Embedding(format!("status={status}: {text}")),
                ));
            }
            response.json::<EmbeddingResponse>().await.map_err(|e| {
                AttemptError::fatal(ScoutError::Embedding(format!("invalid response body: {e}")))
            })
        })
        .await
        .map_err(|e| RagError::Embedding { provider: PROVIDER.to_string(), message: e.to_string() })?;

        let mut data = parsed.data;
        data.sort_by_key(|d| d.index);
        if data.len() != inputs.len() {
            return Err(RagError::Embedding {
                provider: PROVIDER.to_string(),
                message: format!("expected {} embeddings, received {}", inputs.len(), data.len()),
            });
        }
        Ok(data.into_iter().map(|d| d.embedding).collect())
    }
}

#[async_trait]
impl EmbeddingProvider for AzureOpenAIEmbeddingProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.request(&[text.to_string()]).await?;
        vectors.pop().ok_or_else(|| RagError::Embedding {
            provider: PROVIDER.to_string(),
            message: "empty embedding response".to_string(),
        })
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.request(texts).await
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

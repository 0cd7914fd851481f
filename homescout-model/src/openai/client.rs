//! Chat-completions client for OpenAI and Azure OpenAI.

use super::config::{AzureConfig, OpenAIConfig};
use super::convert::{self, ToolCallAccumulator};
use crate::retry::{AttemptError, RetryConfig, execute_attempts};
use async_stream::try_stream;
use async_trait::async_trait;
use futures::StreamExt;
use homescout_core::{FinishReason, Llm, LlmRequest, LlmResponseStream, ScoutError};
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use tracing::Instrument;

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Clone)]
enum Auth {
    Bearer(String),
    ApiKeyHeader(String),
}

/// Chat model reached over the chat-completions REST protocol.
///
/// Streaming responses are parsed from SSE `data:` lines. Text deltas are
/// yielded as partial responses; tool call fragments are accumulated and
/// emitted together with the final response.
pub struct OpenAIClient {
    client: Client,
    url: String,
    auth: Auth,
    model: String,
    retry_config: RetryConfig,
}

impl OpenAIClient {
    pub fn new(config: OpenAIConfig) -> Result<Self, ScoutError> {
        let base = config.base_url.as_deref().unwrap_or(OPENAI_BASE_URL).trim_end_matches('/');
        Ok(Self {
            client: build_http_client()?,
            url: format!("{base}/chat/completions"),
            auth: Auth::Bearer(config.api_key),
            model: config.model,
            retry_config: RetryConfig::default(),
        })
    }

    /// Client for an Azure OpenAI chat deployment.
    pub fn azure(config: AzureConfig) -> Result<Self, ScoutError> {
        Ok(Self {
            client: build_http_client()?,
            url: config.operation_url("chat/completions"),
            auth: Auth::ApiKeyHeader(config.api_key),
            model: config.deployment,
            retry_config: RetryConfig::default(),
        })
    }

    #[must_use]
    pub fn with_retry_config(mut self, retry_config: RetryConfig) -> Self {
        self.retry_config = retry_config;
        self
    }

    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry_config
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

fn build_http_client() -> Result<Client, ScoutError> {
    Client::builder()
        .build()
        .map_err(|e| ScoutError::Model(format!("Failed to create HTTP client: {e}")))
}

/// Splits an SSE byte stream into lines. Bytes are buffered until a full
/// line is available, so multi-byte characters split across network chunks
/// decode intact.
#[derive(Debug, Default)]
struct SseLines {
    buffer: Vec<u8>,
}

impl SseLines {
    fn extend(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// The next complete line, trimmed, or `None` until more bytes arrive.
    fn next_line(&mut self) -> Result<Option<String>, ScoutError> {
        let Some(end) = self.buffer.iter().position(|&b| b == b'\n') else {
            return Ok(None);
        };
        let line: Vec<u8> = self.buffer.drain(..=end).collect();
        let line = std::str::from_utf8(&line)
            .map_err(|e| ScoutError::Model(format!("chat stream is not valid UTF-8: {e}")))?;
        Ok(Some(line.trim().to_string()))
    }
}

fn authorize(builder: RequestBuilder, auth: &Auth) -> RequestBuilder {
    match auth {
        Auth::Bearer(key) => builder.bearer_auth(key),
        Auth::ApiKeyHeader(key) => builder.header("api-key", key),
    }
}

#[async_trait]
impl Llm for OpenAIClient {
    fn name(&self) -> &str {
        &self.model
    }

    async fn generate_content(
        &self,
        request: LlmRequest,
        stream: bool,
    ) -> Result<LlmResponseStream, ScoutError> {
        let client = self.client.clone();
        let url = self.url.clone();
        let auth = self.auth.clone();
        let model = self.model.clone();
        let retry_config = self.retry_config.clone();

        let body = convert::build_request_body(
            &model,
            &request.contents,
            &request.tools,
            request.config.as_ref(),
            stream,
        );

        let response_stream = try_stream! {
            homescout_telemetry::debug!(model = %model, stream, "sending chat request");
            let response = execute_attempts(&retry_config, || {
                let request = authorize(client.post(&url), &auth).json(&body);
                let model = model.clone();
                async move {
                    let resp = request.send().await.map_err(|e| {
                        let error = ScoutError::Model(format!("chat request for {model} failed: {e}"));
                        if e.is_timeout() || e.is_connect() {
                            AttemptError::retryable(error)
                        } else {
                            AttemptError::fatal(error)
                        }
                    })?;

                    let status = resp.status();
                    if !status.is_success() {
                        let error_text = resp.text().await.unwrap_or_default();
                        return Err(AttemptError::from_status(
                            status.as_u16(),
                            ScoutError::Model(format!(
                                "chat request for {model} failed, status={status}: {error_text}"
                            )),
                        ));
                    }
                    Ok(resp)
                }
            })
            .instrument(homescout_telemetry::model_call_span(&model))
            .await?;

            if stream {
                let mut byte_stream = response.bytes_stream();
                let mut lines = SseLines::default();
                let mut tool_calls = ToolCallAccumulator::new();
                let mut finished = false;

                while let Some(chunk) = byte_stream.next().await {
                    let chunk = chunk.map_err(|e| ScoutError::Model(format!("chat stream error: {e}")))?;
                    lines.extend(&chunk);

                    while let Some(line) = lines.next_line()? {
                        let Some(data) = line.strip_prefix("data:").map(str::trim) else {
                            continue;
                        };
                        if data.is_empty() || data == "[DONE]" {
                            continue;
                        }

                        let chunk_json: Value = match serde_json::from_str(data) {
                            Ok(value) => value,
                            Err(e) => {
                                tracing::warn!(error = %e, data, "skipping unparseable SSE chunk");
                                continue;
                            }
                        };

                        convert::accumulate_tool_calls(&chunk_json, &mut tool_calls);
                        let parsed = convert::parse_sse_chunk(&chunk_json);
                        if let Some(delta) = parsed.delta {
                            yield delta;
                        }
                        if parsed.finish_reason.is_some() {
                            finished = true;
                            let calls = convert::drain_tool_calls(&mut tool_calls);
                            yield convert::final_response(parsed.finish_reason, calls);
                        }
                    }
                }

                // Some servers close the stream without a finish_reason chunk.
                let calls = convert::drain_tool_calls(&mut tool_calls);
                if !finished || !calls.is_empty() {
                    yield convert::final_response(Some(FinishReason::Stop), calls);
                }
            } else {
                let response_json: Value = response
                    .json()
                    .await
                    .map_err(|e| ScoutError::Model(format!("chat response parse failed: {e}")))?;
                yield convert::parse_response(&response_json);
            }
        };

        Ok(Box::pin(response_stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_wait_for_the_rest_of_a_split_character() {
        let bytes = "data: {\"text\":\"Año\"}\n".as_bytes();
        let split = bytes.iter().position(|&b| b == 0xC3).unwrap() + 1;

        let mut lines = SseLines::default();
        lines.extend(&bytes[..split]);
        assert_eq!(lines.next_line().unwrap(), None);

        lines.extend(&bytes[split..]);
        assert_eq!(lines.next_line().unwrap().as_deref(), Some("data: {\"text\":\"Año\"}"));
        assert_eq!(lines.next_line().unwrap(), None);
    }

    #[test]
    fn lines_keep_a_trailing_partial_line() {
        let mut lines = SseLines::default();
        lines.extend(b"data: one\r\ndata: tw");
        assert_eq!(lines.next_line().unwrap().as_deref(), Some("data: one"));
        assert_eq!(lines.next_line().unwrap(), None);
        lines.extend(b"o\n");
        assert_eq!(lines.next_line().unwrap().as_deref(), Some("data: two"));
    }
}

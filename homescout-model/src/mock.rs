use homescout_core::{Content, Llm, LlmRequest, LlmResponse, LlmResponseStream, Result, ScoutError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

enum Script {
    Responses(Vec<LlmResponse>),
    Fail(String),
}

/// Scripted model. Each call to `generate_content` consumes the next script.
pub struct MockLlm {
    name: String,
    scripts: Mutex<VecDeque<Script>>,
    requests: Mutex<Vec<LlmRequest>>,
}

impl MockLlm {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scripts: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a call that returns a single response.
    pub fn with_response(self, response: LlmResponse) -> Self {
        self.push(Script::Responses(vec![response]))
    }

    /// Queue a call that yields `responses` in order.
    pub fn with_responses(self, responses: Vec<LlmResponse>) -> Self {
        self.push(Script::Responses(responses))
    }

    /// Queue a call that returns `text` as one complete response.
    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.with_response(LlmResponse::new(Content::new("model").with_text(text)))
    }

    /// Queue a call that streams `chunks` as partial responses followed by a
    /// content-less final response, the way SSE providers finish.
    pub fn with_streamed_text(self, chunks: &[&str]) -> Self {
        let mut responses: Vec<LlmResponse> =
            chunks.iter().map(|chunk| LlmResponse::partial_text(*chunk)).collect();
        responses.push(LlmResponse { turn_complete: true, ..Default::default() });
        self.push(Script::Responses(responses))
    }

    /// Queue a call that fails with a model error.
    pub fn with_error(self, message: impl Into<String>) -> Self {
        self.push(Script::Fail(message.into()))
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn remaining(&self) -> usize {
        self.scripts.lock().map(|s| s.len()).unwrap_or_default()
    }

    fn push(self, script: Script) -> Self {
        if let Ok(mut scripts) = self.scripts.lock() {
            scripts.push_back(script);
        }
        self
    }
}

#[async_trait]
impl Llm for MockLlm {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate_content(&self, req: LlmRequest, _stream: bool) -> Result<LlmResponseStream> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(req);
        }
        let script = self
            .scripts
            .lock()
            .map_err(|_| ScoutError::Model("mock script lock poisoned".to_string()))?
            .pop_front();

        match script {
            Some(Script::Responses(responses)) => {
                let stream = async_stream::stream! {
                    for response in responses {
                        yield Ok(response);
                    }
                };
                Ok(Box::pin(stream))
            }
            Some(Script::Fail(message)) => Err(ScoutError::Model(message)),
            None => Err(ScoutError::Model(format!(
                "mock model '{}' has no scripted response left",
                self.name
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn test_mock_llm_replays_scripts_in_order() {
        let mock = MockLlm::new("test").with_text("first").with_streamed_text(&["se", "cond"]);

        let mut stream = mock.generate_content(LlmRequest::new("m", vec![]), false).await.unwrap();
        let response = stream.next().await.unwrap().unwrap();
        assert_eq!(response.content.unwrap().text(), "first");

        let stream = mock.generate_content(LlmRequest::new("m", vec![]), true).await.unwrap();
        let chunks: Vec<_> = stream.collect().await;
        assert_eq!(chunks.len(), 3);
        assert!(chunks[2].as_ref().unwrap().turn_complete);

        assert_eq!(mock.requests().len(), 2);
        assert_eq!(mock.remaining(), 0);
    }

    #[tokio::test]
    async fn test_mock_llm_errors_when_exhausted() {
        let mock = MockLlm::new("empty");
        let result = mock.generate_content(LlmRequest::new("m", vec![]), false).await;
        assert!(matches!(result, Err(ScoutError::Model(_))));
    }

    #[tokio::test]
    async fn test_mock_llm_scripted_failure() {
        let mock = MockLlm::new("failing").with_error("HTTP 500");
        let result = mock.generate_content(LlmRequest::new("m", vec![]), false).await;
        assert!(matches!(result, Err(ScoutError::Model(msg)) if msg == "HTTP 500"));
    }
}

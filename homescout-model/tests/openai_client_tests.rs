use futures::StreamExt;
use homescout_core::{Content, Llm, LlmRequest, Part, ScoutError};
use homescout_model::{AzureConfig, OpenAIClient, OpenAIConfig, RetryConfig};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn instant_retry() -> RetryConfig {
    RetryConfig::default().with_initial_delay(Duration::ZERO).with_max_delay(Duration::ZERO)
}

fn user_request(text: &str) -> LlmRequest {
    LlmRequest::new("gpt-4o", vec![Content::new("user").with_text(text)])
}

#[tokio::test]
async fn azure_client_parses_non_streaming_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/openai/deployments/gpt-4o/chat/completions"))
        .and(query_param("api-version", "2024-10-21"))
        .and(header("api-key", "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "Hola"}, "finish_reason": "stop"}]
        })))
        .mount(&server)
        .await;

    let client = OpenAIClient::azure(AzureConfig::new(server.uri(), "secret", "gpt-4o")).unwrap();
    let mut stream = client.generate_content(user_request("hello"), false).await.unwrap();
    let response = stream.next().await.unwrap().unwrap();

    assert!(response.turn_complete);
    assert_eq!(response.content.unwrap().text(), "Hola");
}

#[tokio::test]
async fn openai_client_streams_text_and_tool_calls() {
    let server = MockServer::start().await;
    let sse = [
        r#"data: {"choices":[{"delta":{"content":"Let me "},"finish_reason":null}]}"#,
        r#"data: {"choices":[{"delta":{"content":"check."},"finish_reason":null}]}"#,
        r#"data: {"choices":[{"delta":{"tool_calls":[{"index":0,"id":"call_1","function":{"name":"search_listings","arguments":"{\"question\""}}]},"finish_reason":null}]}"#,
        r#"data: {"choices":[{"delta":{"tool_calls":[{"index":0,"function":{"arguments":":\"flats\"}"}}]},"finish_reason":null}]}"#,
        r#"data: {"choices":[{"delta":{},"finish_reason":"tool_calls"}]}"#,
        "data: [DONE]",
        "",
    ]
    .join("\n\n");

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(sse, "text/event-stream"))
        .mount(&server)
        .await;

    let config = OpenAIConfig::new("sk-test", "gpt-4o-mini").with_base_url(format!("{}/v1", server.uri()));
    let client = OpenAIClient::new(config).unwrap();
    let responses: Vec<_> = client
        .generate_content(user_request("find flats"), true)
        .await
        .unwrap()
        .collect()
        .await;

    let responses: Vec<_> = responses.into_iter().map(Result::unwrap).collect();
    assert_eq!(responses.len(), 3);
    assert!(responses[0].partial);
    let streamed: String = responses.iter().filter_map(|r| r.content.as_ref()).map(Content::text).collect();
    assert_eq!(streamed, "Let me check.");

    let last = responses.last().unwrap();
    assert!(last.turn_complete);
    let parts = &last.content.as_ref().unwrap().parts;
    assert!(matches!(
        &parts[0],
        Part::FunctionCall { name, args, id } if name == "search_listings" && args["question"] == "flats" && id.as_deref() == Some("call_1")
    ));
}

#[tokio::test]
async fn client_retries_rate_limited_requests() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limit"))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"content": "ok"}, "finish_reason": "stop"}]
        })))
        .mount(&server)
        .await;

    let client = OpenAIClient::azure(AzureConfig::new(server.uri(), "k", "gpt-4o"))
        .unwrap()
        .with_retry_config(instant_retry());
    let mut stream = client.generate_content(user_request("hi"), false).await.unwrap();
    let response = stream.next().await.unwrap().unwrap();

    assert_eq!(response.content.unwrap().text(), "ok");
}

#[tokio::test]
async fn client_surfaces_non_retryable_failures() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad request"))
        .expect(1)
        .mount(&server)
        .await;

    let client = OpenAIClient::azure(AzureConfig::new(server.uri(), "k", "gpt-4o"))
        .unwrap()
        .with_retry_config(instant_retry());
    let mut stream = client.generate_content(user_request("hi"), false).await.unwrap();
    let error = stream.next().await.unwrap().unwrap_err();

    assert!(matches!(error, ScoutError::Model(msg) if msg.contains("400")));
}

/// Serves one streaming response, writing `body` in two parts split at
/// byte `split` with a pause in between.
async fn serve_split_sse(body: String, split: usize) -> String {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();

        let mut request = Vec::new();
        let mut buf = [0u8; 4096];
        let body_len = loop {
            let n = socket.read(&mut buf).await.unwrap();
            request.extend_from_slice(&buf[..n]);
            if let Some(end) = request.windows(4).position(|w| w == b"\r\n\r\n") {
                let head = String::from_utf8_lossy(&request[..end]).to_ascii_lowercase();
                let length = head
                    .lines()
                    .find_map(|l| l.strip_prefix("content-length:"))
                    .map(|v| v.trim().parse::<usize>().unwrap())
                    .unwrap_or(0);
                break end + 4 + length;
            }
        };
        while request.len() < body_len {
            let n = socket.read(&mut buf).await.unwrap();
            request.extend_from_slice(&buf[..n]);
        }

        let head = "HTTP/1.1 200 OK\r\ncontent-type: text/event-stream\r\nconnection: close\r\n\r\n";
        let bytes = body.as_bytes();
        socket.write_all(head.as_bytes()).await.unwrap();
        socket.write_all(&bytes[..split]).await.unwrap();
        socket.flush().await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        socket.write_all(&bytes[split..]).await.unwrap();
        socket.shutdown().await.unwrap();
    });
    format!("http://{addr}/v1")
}

#[tokio::test]
async fn streamed_text_survives_a_character_split_across_reads() {
    let body = [
        r#"data: {"choices":[{"delta":{"content":"Año"},"finish_reason":null}]}"#,
        r#"data: {"choices":[{"delta":{},"finish_reason":"stop"}]}"#,
        "data: [DONE]",
        "",
    ]
    .join("\n\n");
    // Between the two bytes of 'ñ'.
    let split = body.find('ñ').unwrap() + 1;
    let base_url = serve_split_sse(body, split).await;

    let client = OpenAIClient::new(OpenAIConfig::new("sk-test", "gpt-4o-mini").with_base_url(base_url))
        .unwrap()
        .with_retry_config(RetryConfig::disabled());
    let responses: Vec<_> = client
        .generate_content(user_request("hola"), true)
        .await
        .unwrap()
        .collect()
        .await;

    let streamed: String = responses
        .into_iter()
        .map(Result::unwrap)
        .filter(|r| r.partial)
        .filter_map(|r| r.content)
        .map(|c| c.text())
        .collect();
    assert_eq!(streamed, "Año");
}

#[tokio::test]
async fn text_on_the_finishing_chunk_is_streamed() {
    let server = MockServer::start().await;
    let sse = [
        r#"data: {"choices":[{"delta":{"content":"Hola "},"finish_reason":null}]}"#,
        r#"data: {"choices":[{"delta":{"content":"mundo"},"finish_reason":"stop"}]}"#,
        "data: [DONE]",
        "",
    ]
    .join("\n\n");
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(sse, "text/event-stream"))
        .mount(&server)
        .await;

    let config = OpenAIConfig::new("sk-test", "gpt-4o-mini").with_base_url(format!("{}/v1", server.uri()));
    let responses: Vec<_> = OpenAIClient::new(config)
        .unwrap()
        .generate_content(user_request("hola"), true)
        .await
        .unwrap()
        .collect()
        .await;
    let responses: Vec<_> = responses.into_iter().map(Result::unwrap).collect();

    let streamed: String =
        responses.iter().filter(|r| r.partial).filter_map(|r| r.content.as_ref()).map(Content::text).collect();
    assert_eq!(streamed, "Hola mundo");
    let last = responses.last().unwrap();
    assert!(last.turn_complete);
    assert!(last.content.is_none());
}

#[tokio::test]
async fn client_does_not_retry_a_bad_request_that_mentions_a_server_code() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_string("requested 8500 tokens, limit is 8192"))
        .expect(1)
        .mount(&server)
        .await;

    let client = OpenAIClient::azure(AzureConfig::new(server.uri(), "k", "gpt-4o"))
        .unwrap()
        .with_retry_config(instant_retry());
    let mut stream = client.generate_content(user_request("hi"), false).await.unwrap();
    let error = stream.next().await.unwrap().unwrap_err();

    assert!(matches!(error, ScoutError::Model(msg) if msg.contains("8500")));
}

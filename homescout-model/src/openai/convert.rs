//! Conversions between HomeScout types and the chat-completions wire format.

use homescout_core::{Content, FinishReason, GenerateContentConfig, LlmResponse, Part, UsageMetadata};
use serde_json::{Value, json};
use std::collections::{BTreeMap, HashMap};

/// Tool call fragments collected across SSE chunks, keyed by call index.
pub(crate) type ToolCallAccumulator = BTreeMap<u64, PendingToolCall>;

#[derive(Debug, Default, Clone)]
pub(crate) struct PendingToolCall {
    pub id: String,
    pub name: String,
    pub arguments: String,
}

pub(crate) fn build_request_body(
    model: &str,
    contents: &[Content],
    tools: &HashMap<String, Value>,
    config: Option<&GenerateContentConfig>,
    stream: bool,
) -> Value {
    let messages: Vec<Value> = contents.iter().flat_map(content_to_messages).collect();

    let mut body = json!({
        "model": model,
        "messages": messages,
        "stream": stream,
    });

    if !tools.is_empty() {
        // Sorted so identical requests serialize identically.
        let mut names: Vec<&String> = tools.keys().collect();
        names.sort();
        let tool_array: Vec<Value> = names
            .into_iter()
            .map(|name| {
                let decl = &tools[name];
                json!({
                    "type": "function",
                    "function": {
                        "name": name,
                        "description": decl.get("description").and_then(Value::as_str).unwrap_or_default(),
                        "parameters": decl.get("parameters").cloned()
                            .unwrap_or_else(|| json!({"type": "object", "properties": {}})),
                    }
                })
            })
            .collect();
        body["tools"] = Value::Array(tool_array);
    }

    if let Some(cfg) = config {
        if let Some(temp) = cfg.temperature {
            body["temperature"] = json!(temp);
        }
        if let Some(top_p) = cfg.top_p {
            body["top_p"] = json!(top_p);
        }
        if let Some(max_tokens) = cfg.max_output_tokens {
            body["max_tokens"] = json!(max_tokens);
        }
    }

    body
}

/// A function-role content becomes one `tool` message per response part.
fn content_to_messages(content: &Content) -> Vec<Value> {
    match content.role.as_str() {
        "model" | "assistant" => {
            let mut msg = json!({ "role": "assistant" });
            let text = content.text();
            let tool_calls = extract_tool_calls(&content.parts);
            if !text.is_empty() {
                msg["content"] = Value::String(text);
            } else if tool_calls.is_empty() {
                msg["content"] = Value::String(String::new());
            }
            if !tool_calls.is_empty() {
                msg["tool_calls"] = Value::Array(tool_calls);
            }
            vec![msg]
        }
        "function" | "tool" => content
            .parts
            .iter()
            .filter_map(|part| match part {
                Part::FunctionResponse { function_response, id } => Some(json!({
                    "role": "tool",
                    "tool_call_id": id.clone().unwrap_or_else(|| format!("call_{}", function_response.name)),
                    "content": response_text(&function_response.response),
                })),
                _ => None,
            })
            .collect(),
        "system" => vec![json!({ "role": "system", "content": content.text() })],
        _ => vec![json!({ "role": "user", "content": content.text() })],
    }
}

/// String tool results are sent as-is rather than JSON-quoted.
fn response_text(response: &Value) -> String {
    match response {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn extract_tool_calls(parts: &[Part]) -> Vec<Value> {
    parts
        .iter()
        .filter_map(|part| match part {
            Part::FunctionCall { name, args, id } => Some(json!({
                "id": id.clone().unwrap_or_else(|| format!("call_{name}")),
                "type": "function",
                "function": {
                    "name": name,
                    "arguments": args.to_string(),
                }
            })),
            _ => None,
        })
        .collect()
}

fn parse_arguments(raw: &str) -> Value {
    if raw.trim().is_empty() {
        return json!({});
    }
    serde_json::from_str(raw).unwrap_or_else(|_| json!({ "raw": raw }))
}

/// Parse a non-streaming chat-completions response.
pub(crate) fn parse_response(body: &Value) -> LlmResponse {
    let choice = body.get("choices").and_then(|c| c.get(0));

    let content = choice.and_then(|choice| choice.get("message")).and_then(|message| {
        let mut parts = Vec::new();
        if let Some(text) = message.get("content").and_then(Value::as_str) {
            if !text.is_empty() {
                parts.push(Part::text_part(text));
            }
        }
        for tc in message.get("tool_calls").and_then(Value::as_array).into_iter().flatten() {
            let Some(func) = tc.get("function") else { continue };
            let name = func.get("name").and_then(Value::as_str).unwrap_or_default();
            let args = parse_arguments(func.get("arguments").and_then(Value::as_str).unwrap_or(""));
            let id = tc.get("id").and_then(Value::as_str).map(String::from);
            parts.push(Part::function_call(name, args, id));
        }
        if parts.is_empty() { None } else { Some(Content { role: "model".to_string(), parts }) }
    });

    let usage_metadata = body.get("usage").map(|u| UsageMetadata {
        prompt_token_count: token_count(u, "prompt_tokens"),
        candidates_token_count: token_count(u, "completion_tokens"),
        total_token_count: token_count(u, "total_tokens"),
    });

    LlmResponse {
        content,
        usage_metadata,
        finish_reason: choice.and_then(finish_reason_of),
        partial: false,
        turn_complete: true,
    }
}

fn token_count(usage: &Value, key: &str) -> i32 {
    usage.get(key).and_then(Value::as_i64).unwrap_or(0) as i32
}

fn finish_reason_of(choice: &Value) -> Option<FinishReason> {
    choice.get("finish_reason").and_then(Value::as_str).map(map_finish_reason)
}

/// One parsed SSE chunk: its text delta, if any, and its finish reason.
#[derive(Debug, Default)]
pub(crate) struct SseChunk {
    pub delta: Option<LlmResponse>,
    pub finish_reason: Option<FinishReason>,
}

/// Parse one SSE chunk. Text is always surfaced as a partial response, even
/// on the chunk that carries the finish reason. Tool call fragments go
/// through [`accumulate_tool_calls`].
pub(crate) fn parse_sse_chunk(chunk: &Value) -> SseChunk {
    let choice = chunk.get("choices").and_then(|c| c.get(0));
    let delta = choice
        .and_then(|choice| choice.get("delta"))
        .and_then(|delta| delta.get("content"))
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
        .map(LlmResponse::partial_text);

    SseChunk { delta, finish_reason: choice.and_then(finish_reason_of) }
}

/// The closing response of a stream, carrying any accumulated tool calls.
pub(crate) fn final_response(finish_reason: Option<FinishReason>, calls: Vec<Part>) -> LlmResponse {
    let content = (!calls.is_empty()).then(|| {
        let mut content = Content::new("model");
        content.parts = calls;
        content
    });
    LlmResponse { content, usage_metadata: None, finish_reason, partial: false, turn_complete: true }
}

pub(crate) fn accumulate_tool_calls(chunk: &Value, accumulator: &mut ToolCallAccumulator) {
    let Some(tool_calls) = chunk
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|choice| choice.get("delta"))
        .and_then(|delta| delta.get("tool_calls"))
        .and_then(Value::as_array)
    else {
        return;
    };

    for tc in tool_calls {
        let index = tc.get("index").and_then(Value::as_u64).unwrap_or(0);
        let entry = accumulator.entry(index).or_default();
        if let Some(id) = tc.get("id").and_then(Value::as_str).filter(|id| !id.is_empty()) {
            entry.id = id.to_string();
        }
        if let Some(func) = tc.get("function") {
            if let Some(name) = func.get("name").and_then(Value::as_str).filter(|n| !n.is_empty()) {
                entry.name = name.to_string();
            }
            if let Some(args) = func.get("arguments").and_then(Value::as_str) {
                entry.arguments.push_str(args);
            }
        }
    }
}

/// Drain accumulated tool calls into function call parts, in index order.
pub(crate) fn drain_tool_calls(accumulator: &mut ToolCallAccumulator) -> Vec<Part> {
    std::mem::take(accumulator)
        .into_values()
        .map(|call| {
            let id = if call.id.is_empty() { None } else { Some(call.id) };
            Part::function_call(call.name, parse_arguments(&call.arguments), id)
        })
        .collect()
}

fn map_finish_reason(reason: &str) -> FinishReason {
    match reason {
        "stop" => FinishReason::Stop,
        "tool_calls" | "function_call" => FinishReason::ToolCalls,
        "length" => FinishReason::MaxTokens,
        "content_filter" => FinishReason::Safety,
        _ => FinishReason::Other,
    }
}

//! Event helpers shared by the roles.

use std::sync::Arc;

use async_stream::stream;
use futures::{Stream, StreamExt};
use homescout_core::{Content, Event, Llm, LlmRequest, Message, MessageRole, Result};

/// A complete reply: one delta for the console, then the message to commit.
pub(crate) fn say(invocation_id: &str, author: &str, text: &str) -> Vec<Result<Event>> {
    vec![
        Ok(Event::delta(invocation_id, author, text)),
        Ok(Event::message(invocation_id, author, Content::new("model").with_text(text))),
    ]
}

/// Stream a model reply as deltas, then commit the full text as one message.
///
/// Providers that do not stream send a single complete response; its text is
/// forwarded as one delta. A non-partial response after streamed text is
/// either the full reply again or a closing fragment, and only the new text
/// is kept.
pub(crate) fn model_reply(
    model: Arc<dyn Llm>,
    request: LlmRequest,
    invocation_id: String,
    author: String,
) -> impl Stream<Item = Result<Event>> + Send {
    stream! {
        let mut responses = match model.generate_content(request, true).await {
            Ok(responses) => responses,
            Err(e) => {
                yield Err(e);
                return;
            }
        };

        let mut text = String::new();
        while let Some(response) = responses.next().await {
            let response = match response {
                Ok(response) => response,
                Err(e) => {
                    yield Err(e);
                    return;
                }
            };
            let chunk = response.content.as_ref().map(Content::text).unwrap_or_default();
            if chunk.is_empty() {
                continue;
            }
            let delta = if response.partial {
                text.push_str(&chunk);
                chunk
            } else if let Some(rest) = chunk.strip_prefix(text.as_str()) {
                // A complete response repeating what was streamed so far.
                let rest = rest.to_string();
                text = chunk;
                rest
            } else {
                text.push_str(&chunk);
                chunk
            };
            if !delta.is_empty() {
                yield Ok(Event::delta(&invocation_id, &author, delta));
            }
        }

        yield Ok(Event::message(&invocation_id, &author, Content::new("model").with_text(text)));
    }
}

/// User and assistant text of the conversation, without tool traffic.
pub(crate) fn transcript(messages: &[Message]) -> Vec<Content> {
    messages
        .iter()
        .filter(|m| m.role != MessageRole::Tool)
        .filter_map(|m| {
            let text = m.text();
            (!text.trim().is_empty())
                .then(|| Content::new(m.role.content_role()).with_text(text))
        })
        .collect()
}

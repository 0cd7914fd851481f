//! Conversation history shared by every role in a session.
//!
//! The history is an append-only log. Roles read it through an
//! [`InvocationContext`](crate::InvocationContext) snapshot; only the router
//! appends to it.

use crate::types::{Content, Part, collect_text};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Author recorded on messages typed by the person at the console.
pub const USER_AUTHOR: &str = "user";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    Tool,
}

impl MessageRole {
    /// Provider-facing role name used when the message becomes [`Content`].
    pub fn content_role(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "model",
            MessageRole::Tool => "function",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub role: MessageRole,
    /// Role name that produced the message, or [`USER_AUTHOR`].
    pub author: String,
    pub parts: Vec<Part>,
}

impl Message {
    pub fn new(role: MessageRole, author: impl Into<String>, parts: Vec<Part>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            role,
            author: author.into(),
            parts,
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(MessageRole::User, USER_AUTHOR, vec![Part::text_part(text)])
    }

    pub fn assistant(author: impl Into<String>, parts: Vec<Part>) -> Self {
        Self::new(MessageRole::Assistant, author, parts)
    }

    pub fn tool(author: impl Into<String>, parts: Vec<Part>) -> Self {
        Self::new(MessageRole::Tool, author, parts)
    }

    pub fn text(&self) -> String {
        collect_text(&self.parts)
    }

    /// `(name, args, call id)` for every function call part.
    pub fn function_calls(&self) -> impl Iterator<Item = (&str, &Value, Option<&str>)> {
        self.parts.iter().filter_map(|part| match part {
            Part::FunctionCall { name, args, id } => Some((name.as_str(), args, id.as_deref())),
            _ => None,
        })
    }

    pub fn to_content(&self) -> Content {
        Content { role: self.role.content_role().to_string(), parts: self.parts.clone() }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationHistory {
    messages: Vec<Message>,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }

    pub fn latest_user_message(&self) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.role == MessageRole::User)
    }

    /// Messages of the turn in progress, starting at the latest user message.
    pub fn current_turn(&self) -> &[Message] {
        let start = self
            .messages
            .iter()
            .rposition(|m| m.role == MessageRole::User)
            .unwrap_or(self.messages.len());
        &self.messages[start..]
    }

    /// Text of the most recent assistant message by `author` that carries any text.
    pub fn latest_text_from(&self, author: &str) -> Option<String> {
        self.messages
            .iter()
            .rev()
            .filter(|m| m.role == MessageRole::Assistant && m.author == author)
            .map(Message::text)
            .find(|text| !text.trim().is_empty())
    }

    pub fn to_contents(&self) -> Vec<Content> {
        self.messages.iter().map(Message::to_content).collect()
    }
}

impl<'a> IntoIterator for &'a ConversationHistory {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_history() -> ConversationHistory {
        let mut history = ConversationHistory::new();
        history.append(Message::user("find flats"));
        history.append(Message::assistant("retrieval", vec![Part::text_part("Flat A")]));
        history.append(Message::user("translate that"));
        history.append(Message::assistant("translation", vec![Part::text_part("Piso A")]));
        history
    }

    #[test]
    fn test_current_turn_starts_at_latest_user_message() {
        let history = sample_history();
        let turn = history.current_turn();
        assert_eq!(turn.len(), 2);
        assert_eq!(turn[0].text(), "translate that");
    }

    #[test]
    fn test_current_turn_empty_history() {
        let history = ConversationHistory::new();
        assert!(history.current_turn().is_empty());
        assert!(history.latest_user_message().is_none());
    }

    #[test]
    fn test_latest_text_from_skips_empty_messages() {
        let mut history = sample_history();
        history.append(Message::assistant(
            "retrieval",
            vec![Part::function_call("search_listings", json!({}), None)],
        ));
        assert_eq!(history.latest_text_from("retrieval").as_deref(), Some("Flat A"));
        assert_eq!(history.latest_text_from("coordinator"), None);
    }

    #[test]
    fn test_message_to_content_maps_roles() {
        let msg = Message::tool("retrieval", vec![Part::function_response("t", json!("ok"), None)]);
        assert_eq!(msg.to_content().role, "function");
        assert_eq!(Message::user("hi").to_content().role, "user");
        assert_eq!(Message::assistant("a", vec![]).to_content().role, "model");
    }

    #[test]
    fn test_function_calls_iterator() {
        let msg = Message::assistant(
            "retrieval",
            vec![
                Part::text_part("checking"),
                Part::function_call("search_listings", json!({"question": "x"}), Some("c1".into())),
            ],
        );
        let calls: Vec<_> = msg.function_calls().collect();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "search_listings");
        assert_eq!(calls[0].2, Some("c1"));
    }
}

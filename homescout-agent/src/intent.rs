//! Deciding what the user's latest message asks for.

use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use homescout_core::{Content, ConversationHistory, Llm, LlmRequest, Result};
use homescout_telemetry::debug;

/// What the coordinator should do with a new user message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    PropertySearch,
    Translate,
    General,
}

impl Intent {
    pub const ALL: [Intent; 3] = [Intent::PropertySearch, Intent::Translate, Intent::General];

    pub fn label(&self) -> &'static str {
        match self {
            Intent::PropertySearch => "property_search",
            Intent::Translate => "translate",
            Intent::General => "general",
        }
    }

    /// Parse a label. Anything unrecognised is [`Intent::General`].
    pub fn from_label(label: &str) -> Self {
        let normalized = label
            .trim()
            .trim_matches(|c: char| !c.is_alphanumeric() && c != '_')
            .to_lowercase();
        Intent::ALL.into_iter().find(|intent| intent.label() == normalized).unwrap_or(Intent::General)
    }
}

#[async_trait]
pub trait IntentClassifier: Send + Sync {
    async fn classify(&self, history: &ConversationHistory) -> Result<Intent>;
}

fn latest_user_text(history: &ConversationHistory) -> Option<String> {
    history.latest_user_message().map(|m| m.text())
}

/// Rule-based classifier over the latest user message.
///
/// A search request comes first: any search verb ("find", "show", ...) makes
/// the message a property search, even when it also names a language. Without
/// a search verb, translate keywords win over the remaining search keywords,
/// so "translate the flats" routes to translation. Single-word keywords match
/// whole words; keywords containing spaces match as phrases.
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    search_verbs: Vec<String>,
    translate_keywords: Vec<String>,
    search_keywords: Vec<String>,
}

const SEARCH_VERBS: &[&str] = &["find", "search", "show", "looking for"];

const TRANSLATE_KEYWORDS: &[&str] =
    &["translate", "translation", "translated", "in spanish", "en español", "traducir"];

const SEARCH_KEYWORDS: &[&str] = &[
    "list", "property", "properties", "listing",
    "listings", "house", "houses", "home", "homes", "flat", "flats", "apartment", "apartments",
    "unit", "units", "bedroom", "bedrooms", "room", "rooms", "rent", "buy", "sale", "school",
    "schools", "agent", "address", "bathroom", "garden",
];

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self {
            search_verbs: SEARCH_VERBS.iter().map(|k| k.to_string()).collect(),
            translate_keywords: TRANSLATE_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            search_keywords: SEARCH_KEYWORDS.iter().map(|k| k.to_string()).collect(),
        }
    }
}

impl KeywordClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_translate_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.translate_keywords.push(keyword.into().to_lowercase());
        self
    }

    pub fn with_search_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.search_keywords.push(keyword.into().to_lowercase());
        self
    }

    /// Classify a single message.
    pub fn classify_text(&self, text: &str) -> Intent {
        let normalized = text.to_lowercase();
        let words: Vec<&str> =
            normalized.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty()).collect();
        let matches = |keyword: &String| {
            if keyword.contains(' ') {
                normalized.contains(keyword.as_str())
            } else {
                words.contains(&keyword.as_str())
            }
        };

        if self.search_verbs.iter().any(matches) {
            Intent::PropertySearch
        } else if self.translate_keywords.iter().any(matches) {
            Intent::Translate
        } else if self.search_keywords.iter().any(matches) {
            Intent::PropertySearch
        } else {
            Intent::General
        }
    }
}

#[async_trait]
impl IntentClassifier for KeywordClassifier {
    async fn classify(&self, history: &ConversationHistory) -> Result<Intent> {
        Ok(latest_user_text(history).map(|text| self.classify_text(&text)).unwrap_or(Intent::General))
    }
}

const CLASSIFIER_INSTRUCTION: &str = "Classify the user's latest message for a real-estate assistant. \
Answer 'property_search' if it asks to find, list, or describe property listings. \
Answer 'translate' if it asks to translate previous results. \
Answer 'general' for anything else. \
Respond with ONLY the label.";

/// Model-backed classifier. The model answers with one label; anything else
/// counts as [`Intent::General`].
pub struct LlmIntentClassifier {
    model: Arc<dyn Llm>,
    instruction: String,
}

impl LlmIntentClassifier {
    pub fn new(model: Arc<dyn Llm>) -> Self {
        Self { model, instruction: CLASSIFIER_INSTRUCTION.to_string() }
    }

    pub fn with_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.instruction = instruction.into();
        self
    }
}

#[async_trait]
impl IntentClassifier for LlmIntentClassifier {
    async fn classify(&self, history: &ConversationHistory) -> Result<Intent> {
        let Some(user_text) = latest_user_text(history) else {
            return Ok(Intent::General);
        };

        let request = LlmRequest::new(
            self.model.name(),
            vec![Content::new("user").with_text(format!("User input: {user_text}"))],
        )
        .with_instruction(self.instruction.clone());

        let mut responses = self.model.generate_content(request, false).await?;
        let mut label = String::new();
        while let Some(response) = responses.next().await {
            if let Some(content) = response?.content {
                label.push_str(&content.text());
            }
        }

        let intent = Intent::from_label(&label);
        debug!(label = %label.trim(), intent = intent.label(), "classified user message");
        Ok(intent)
    }
}

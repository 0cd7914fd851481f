use crate::error::{RagError, Result};

/// Default number of listings returned per search.
pub const DEFAULT_TOP_K: usize = 10;

/// Retrieval settings for a [`ListingStore`](crate::ListingStore).
#[derive(Debug, Clone, PartialEq)]
pub struct RagConfig {
    /// Vector collection holding listing embeddings.
    pub collection: String,
    pub top_k: usize,
    /// Matches scoring below this are dropped.
    pub similarity_threshold: f32,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self { collection: "listings".to_string(), top_k: DEFAULT_TOP_K, similarity_threshold: 0.0 }
    }
}

impl RagConfig {
    pub fn builder() -> RagConfigBuilder {
        RagConfigBuilder::default()
    }
}

#[derive(Debug, Default)]
pub struct RagConfigBuilder {
    config: RagConfig,
}

impl RagConfigBuilder {
    pub fn collection(mut self, collection: impl Into<String>) -> Self {
        self.config.collection = collection.into();
        self
    }

    pub fn top_k(mut self, top_k: usize) -> Self {
        self.config.top_k = top_k;
        self
    }

    pub fn similarity_threshold(mut self, threshold: f32) -> Self {
        self.config.similarity_threshold = threshold;
        self
    }

    pub fn build(self) -> Result<RagConfig> {
        let config = self.config;
        if config.collection.trim().is_empty() {
            return Err(RagError::Config("collection name must not be empty".to_string()));
        }
        if config.top_k == 0 {
            return Err(RagError::Config("top_k must be at least 1".to_string()));
        }
        if !(-1.0..=1.0).contains(&config.similarity_threshold) {
            return Err(RagError::Config(format!(
                "similarity_threshold must be within [-1, 1], got {}",
                config.similarity_threshold
            )));
        }
        Ok(config)
    }
}

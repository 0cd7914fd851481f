//! Nearest-neighbor index abstraction.

use crate::error::Result;
use async_trait::async_trait;

/// A text with its embedding, addressed by id within a collection.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorEntry {
    pub id: String,
    pub text: String,
    pub embedding: Vec<f32>,
}

/// An entry returned by a search, with its similarity to the query.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredEntry {
    pub id: String,
    pub text: String,
    pub score: f32,
}

/// An opaque nearest-neighbor service.
///
/// Upserting an existing id replaces that entry. Search results are ranked
/// by descending score.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Create a collection. Creating one that already exists is a no-op.
    async fn create_collection(&self, name: &str, dimensions: usize) -> Result<()>;

    async fn delete_collection(&self, name: &str) -> Result<()>;

    async fn upsert(&self, collection: &str, entries: &[VectorEntry]) -> Result<()>;

    async fn delete(&self, collection: &str, ids: &[&str]) -> Result<()>;

    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<ScoredEntry>>;
}

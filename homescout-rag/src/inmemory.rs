use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::embedding::cosine_similarity;
use crate::error::{RagError, Result};
use crate::vectorstore::{ScoredEntry, VectorEntry, VectorStore};

const BACKEND: &str = "in-memory";

struct Collection {
    dimensions: usize,
    entries: Vec<VectorEntry>,
}

/// Process-local [`VectorStore`] ranking by cosine similarity.
///
/// Entries keep insertion order, so equal scores rank oldest first.
#[derive(Default)]
pub struct InMemoryVectorStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn missing(name: &str) -> RagError {
        RagError::VectorStore {
            backend: BACKEND.to_string(),
            message: format!("collection '{name}' not found"),
        }
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn create_collection(&self, name: &str, dimensions: usize) -> Result<()> {
        let mut collections = self.collections.write().await;
        collections
            .entry(name.to_string())
            .or_insert_with(|| Collection { dimensions, entries: Vec::new() });
        debug!(collection = name, dimensions, "created in-memory collection");
        Ok(())
    }

    async fn delete_collection(&self, name: &str) -> Result<()> {
        self.collections.write().await.remove(name);
        Ok(())
    }

    async fn upsert(&self, collection: &str, entries: &[VectorEntry]) -> Result<()> {
        let mut collections = self.collections.write().await;
        let target = collections.get_mut(collection).ok_or_else(|| Self::missing(collection))?;

        if let Some(bad) = entries.iter().find(|e| e.embedding.len() != target.dimensions) {
            return Err(RagError::VectorStore {
                backend: BACKEND.to_string(),
                message: format!(
                    "entry '{}' has {} dimensions, collection '{collection}' expects {}",
                    bad.id,
                    bad.embedding.len(),
                    target.dimensions
                ),
            });
        }

        for entry in entries {
            match target.entries.iter_mut().find(|existing| existing.id == entry.id) {
                Some(existing) => *existing = entry.clone(),
                None => target.entries.push(entry.clone()),
            }
        }
        debug!(collection, count = entries.len(), "upserted entries");
        Ok(())
    }

    async fn delete(&self, collection: &str, ids: &[&str]) -> Result<()> {
        let mut collections = self.collections.write().await;
        let target = collections.get_mut(collection).ok_or_else(|| Self::missing(collection))?;
        target.entries.retain(|entry| !ids.contains(&entry.id.as_str()));
        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<ScoredEntry>> {
        let collections = self.collections.read().await;
        let target = collections.get(collection).ok_or_else(|| Self::missing(collection))?;

        let mut scored: Vec<ScoredEntry> = target
            .entries
            .iter()
            .map(|entry| ScoredEntry {
                id: entry.id.clone(),
                text: entry.text.clone(),
                score: cosine_similarity(embedding, &entry.embedding),
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);
        Ok(scored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, embedding: Vec<f32>) -> VectorEntry {
        VectorEntry { id: id.to_string(), text: format!("text {id}"), embedding }
    }

    #[tokio::test]
    async fn search_ranks_by_cosine() {
        let store = InMemoryVectorStore::new();
        store.create_collection("docs", 2).await.unwrap();
        store
            .upsert(
                "docs",
                &[entry("x", vec![1.0, 0.0]), entry("y", vec![0.0, 1.0]), entry("xy", vec![0.7, 0.7])],
            )
            .await
            .unwrap();

        let results = store.search("docs", &[1.0, 0.1], 2).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, "x");
        assert_eq!(results[1].id, "xy");
        assert!(results[0].score >= results[1].score);
    }

    #[tokio::test]
    async fn upsert_replaces_same_id() {
        let store = InMemoryVectorStore::new();
        store.create_collection("docs", 2).await.unwrap();
        store.upsert("docs", &[entry("a", vec![1.0, 0.0])]).await.unwrap();
        store.upsert("docs", &[entry("a", vec![0.0, 1.0])]).await.unwrap();

        let results = store.search("docs", &[0.0, 1.0], 10).await.unwrap();
        assert_eq!(results.len(), 1);
        assert!((results[0].score - 1.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn delete_removes_entries() {
        let store = InMemoryVectorStore::new();
        store.create_collection("docs", 2).await.unwrap();
        store.upsert("docs", &[entry("a", vec![1.0, 0.0]), entry("b", vec![0.0, 1.0])]).await.unwrap();
        store.delete("docs", &["a"]).await.unwrap();

        let results = store.search("docs", &[1.0, 0.0], 10).await.unwrap();
        assert_eq!(results.iter().map(|r| r.id.as_str()).collect::<Vec<_>>(), vec!["b"]);
    }

    #[tokio::test]
    async fn rejects_wrong_dimensions_and_unknown_collections() {
        let store = InMemoryVectorStore::new();
        store.create_collection("docs", 3).await.unwrap();

        let err = store.upsert("docs", &[entry("a", vec![1.0])]).await.unwrap_err();
        assert!(matches!(err, RagError::VectorStore { .. }));

        let err = store.search("missing", &[1.0], 1).await.unwrap_err();
        assert!(err.to_string().contains("'missing' not found"));
    }

    #[tokio::test]
    async fn create_collection_is_idempotent() {
        let store = InMemoryVectorStore::new();
        store.create_collection("docs", 2).await.unwrap();
        store.upsert("docs", &[entry("a", vec![1.0, 0.0])]).await.unwrap();
        store.create_collection("docs", 2).await.unwrap();
        assert_eq!(store.search("docs", &[1.0, 0.0], 5).await.unwrap().len(), 1);

        store.delete_collection("docs").await.unwrap();
        assert!(store.search("docs", &[1.0, 0.0], 5).await.is_err());
    }
}

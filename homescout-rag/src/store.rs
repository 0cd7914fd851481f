//! The listing store: records, their embeddings, and similarity search.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use homescout_telemetry::{debug, embedding_span, info};
use tokio::sync::RwLock;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::RagConfig;
use crate::document::ListingHit;
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::inmemory::InMemoryVectorStore;
use crate::listing::{ListingDetail, ListingRecord};
use crate::vectorstore::{VectorEntry, VectorStore};

/// Tool output signalling that a search matched nothing.
///
/// This is a terminal outcome, not an error. Callers must not retry on it.
pub const NO_PROPERTIES_FOUND: &str = "NO_PROPERTIES_FOUND";

/// Result of [`ListingStore::search`].
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// Ranked hits, best first.
    Matches(Vec<ListingHit>),
    NoMatches,
}

impl SearchOutcome {
    fn from_hits(hits: Vec<ListingHit>) -> Self {
        if hits.is_empty() { Self::NoMatches } else { Self::Matches(hits) }
    }

    pub fn hits(&self) -> &[ListingHit] {
        match self {
            Self::Matches(hits) => hits,
            Self::NoMatches => &[],
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::NoMatches)
    }

    /// Matched search documents joined by newlines, or [`NO_PROPERTIES_FOUND`].
    pub fn to_tool_output(&self) -> String {
        match self {
            Self::Matches(hits) => {
                hits.iter().map(|hit| hit.document.as_str()).collect::<Vec<_>>().join("\n")
            }
            Self::NoMatches => NO_PROPERTIES_FOUND.to_string(),
        }
    }
}

/// Owns listing records and keeps their embeddings in a vector index.
///
/// Upserting never deduplicates: the same listing upserted twice becomes two
/// records with distinct ids.
pub struct ListingStore {
    embedder: Arc<dyn EmbeddingProvider>,
    vectors: Arc<dyn VectorStore>,
    config: RagConfig,
    records: RwLock<HashMap<Uuid, ListingRecord>>,
}

impl ListingStore {
    /// Create the store and its vector collection.
    pub async fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        vectors: Arc<dyn VectorStore>,
        config: RagConfig,
    ) -> Result<Self> {
        vectors.create_collection(&config.collection, embedder.dimensions()).await?;
        Ok(Self { embedder, vectors, config, records: RwLock::new(HashMap::new()) })
    }

    /// Store backed by an [`InMemoryVectorStore`] with default settings.
    pub async fn in_memory(embedder: Arc<dyn EmbeddingProvider>) -> Result<Self> {
        Self::new(embedder, Arc::new(InMemoryVectorStore::new()), RagConfig::default()).await
    }

    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Store one listing under a fresh id and index its search document.
    pub async fn upsert(&self, detail: ListingDetail) -> Result<Uuid> {
        let mut ids = self.upsert_all(vec![detail]).await?;
        ids.pop().ok_or_else(|| RagError::Ingest("upsert produced no record".to_string()))
    }

    /// Store a batch of listings. Returned ids follow input order.
    pub async fn upsert_all(&self, details: Vec<ListingDetail>) -> Result<Vec<Uuid>> {
        if details.is_empty() {
            return Ok(Vec::new());
        }

        let records: Vec<ListingRecord> = details.into_iter().map(ListingRecord::from_detail).collect();
        let documents: Vec<String> = records.iter().map(ListingRecord::search_document).collect();

        let embeddings = self
            .embedder
            .embed_batch(&documents)
            .instrument(embedding_span(self.embedder.name(), documents.len()))
            .await?;
        if embeddings.len() != records.len() {
            return Err(RagError::Embedding {
                provider: self.embedder.name().to_string(),
                message: format!(
                    "expected {} embeddings, received {}",
                    records.len(),
                    embeddings.len()
                ),
            });
        }

        let entries: Vec<VectorEntry> = records
            .iter()
            .zip(documents)
            .zip(embeddings)
            .map(|((record, text), embedding)| VectorEntry {
                id: record.id.to_string(),
                text,
                embedding,
            })
            .collect();
        self.vectors.upsert(&self.config.collection, &entries).await?;

        let ids: Vec<Uuid> = records.iter().map(|r| r.id).collect();
        let mut stored = self.records.write().await;
        for record in records {
            stored.insert(record.id, record);
        }
        debug!(count = ids.len(), total = stored.len(), "upserted listings");
        Ok(ids)
    }

    /// Load a JSON array of listings from disk and upsert all of them.
    pub async fn load_json(&self, path: impl AsRef<Path>) -> Result<Vec<Uuid>> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path).await?;
        let details = ListingDetail::parse_many(&raw)?;
        let ids = self.upsert_all(details).await?;
        info!(path = %path.display(), listings = ids.len(), "loaded listings");
        Ok(ids)
    }

    /// Return up to `k` listings ranked by similarity to `query`.
    pub async fn search(&self, query: &str, k: usize) -> Result<SearchOutcome> {
        if k == 0 || self.is_empty().await {
            return Ok(SearchOutcome::NoMatches);
        }

        let embedding = self
            .embedder
            .embed(query)
            .instrument(embedding_span(self.embedder.name(), 1))
            .await?;
        let scored = self.vectors.search(&self.config.collection, &embedding, k).await?;

        let threshold = self.config.similarity_threshold;
        let mut hits = Vec::with_capacity(scored.len());
        for entry in scored.into_iter().filter(|e| e.score >= threshold) {
            let id = Uuid::parse_str(&entry.id).map_err(|e| RagError::VectorStore {
                backend: "index".to_string(),
                message: format!("entry id '{}' is not a listing id: {e}", entry.id),
            })?;
            hits.push(ListingHit { id, document: entry.text, score: entry.score });
        }

        debug!(query, k, hits = hits.len(), "listing search");
        Ok(SearchOutcome::from_hits(hits))
    }

    pub async fn get(&self, id: Uuid) -> Option<ListingRecord> {
        self.records.read().await.get(&id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

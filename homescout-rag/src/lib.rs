//! # homescout-rag
//!
//! Listing retrieval for HomeScout.
//!
//! Scraped listings ([`ListingDetail`]) become immutable [`ListingRecord`]s.
//! Each record's search document is embedded by an [`EmbeddingProvider`] and
//! indexed in a [`VectorStore`]. [`ListingStore::search`] answers a question
//! with a [`SearchOutcome`], and [`SearchListingsTool`] exposes that search to
//! the retrieval role.
//!
//! ## Features
//!
//! | Feature | What it enables |
//! |---------|-----------------|
//! | `azure` (default) | `AzureOpenAIEmbeddingProvider` via reqwest |
//!
//! [`HashingEmbeddingProvider`] and [`InMemoryVectorStore`] are always
//! available and need no network.

pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod inmemory;
pub mod listing;
pub mod store;
pub mod tool;
pub mod vectorstore;

#[cfg(feature = "azure")]
pub mod azure;

pub use config::{DEFAULT_TOP_K, RagConfig, RagConfigBuilder};
pub use document::ListingHit;
pub use embedding::{EmbeddingProvider, HashingEmbeddingProvider, cosine_similarity};
pub use error::{RagError, Result};
pub use inmemory::InMemoryVectorStore;
pub use listing::{ListingDetail, ListingRecord};
pub use store::{ListingStore, NO_PROPERTIES_FOUND, SearchOutcome};
pub use tool::{SEARCH_LISTINGS_TOOL, SearchListingsTool};
pub use vectorstore::{ScoredEntry, VectorEntry, VectorStore};

#[cfg(feature = "azure")]
pub use azure::{AzureOpenAIEmbeddingProvider, DEFAULT_EMBEDDING_DIMENSIONS};

//! Error types for the listing retrieval layer.

use homescout_core::ScoutError;

/// Errors raised while embedding, indexing, or loading listings.
#[derive(Debug, thiserror::Error)]
pub enum RagError {
    /// The embedding provider failed to produce vectors.
    #[error("embedding error ({provider}): {message}")]
    Embedding { provider: String, message: String },

    /// The vector index rejected an operation.
    #[error("vector store error ({backend}): {message}")]
    VectorStore { backend: String, message: String },

    /// Listing input could not be turned into records.
    #[error("ingest error: {0}")]
    Ingest(String),

    /// Invalid retrieval configuration.
    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RagError>;

impl From<RagError> for ScoutError {
    fn from(err: RagError) -> Self {
        match err {
            RagError::Embedding { .. } => ScoutError::Embedding(err.to_string()),
            RagError::Config(message) => ScoutError::Config(message),
            RagError::Io(io) => ScoutError::Io(io),
            RagError::Serde(serde) => ScoutError::Serde(serde),
            RagError::VectorStore { .. } | RagError::Ingest(_) => ScoutError::Tool(err.to_string()),
        }
    }
}

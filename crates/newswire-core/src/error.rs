//! Error types for newswire

use thiserror::Error;

/// Result type alias using NewswireError
pub type Result<T> = std::result::Result<T, NewswireError>;

/// Error type alias for convenience
pub type Error = NewswireError;

/// Main error type for newswire
#[derive(Debug, Error)]
pub enum NewswireError {
    /// Empty or whitespace-only search query (400-class)
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Empty or whitespace-only text handed to an embedder
    #[error("Cannot embed empty input")]
    EmptyInput,

    /// Out-of-range request parameter (422-class, field-level detail)
    #[error("Invalid value for `{field}`: {message}")]
    Validation { field: &'static str, message: String },

    /// Embedding runtime unreachable or timed out (503-class)
    #[error("Embedding service unavailable: {0}")]
    EmbeddingUnavailable(String),

    /// Query against an index mid-rebuild or after a model change (503-class)
    #[error("Index is stale: {0}")]
    IndexStale(String),

    /// Vector length does not match the index's fixed dimensions
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl NewswireError {
    /// Whether the caller may retry after a short backoff
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::EmbeddingUnavailable(_) | Self::IndexStale(_) | Self::Http(_)
        )
    }
}

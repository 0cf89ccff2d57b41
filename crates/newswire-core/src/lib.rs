//! Newswire Core Library
//!
//! Semantic search and retrieval ranking for aggregated tech-news
//! articles.
//!
//! # Features
//! - Dense-vector retrieval with cosine similarity over an in-memory,
//!   snapshot-swapped index
//! - Multi-factor reranking (similarity, title match, recency)
//! - TTL/LRU result caching with single-flight miss de-duplication
//! - Pluggable embedding runtimes behind the [`Embedder`] trait

pub mod config;
pub mod embed;
pub mod error;
pub mod index;
pub mod search;
pub mod types;

pub use config::{EmbeddingServiceConfig, RerankWeights, SearchConfig};
pub use embed::{BoundedEmbedder, Embedder, HashEmbedder, HttpEmbedder};
pub use error::{Error, NewswireError, Result};
pub use index::{cosine_similarity, IndexState, RebuildBatch, ScoredCandidate, VectorIndex};
pub use search::{
    request_key, CacheStats, Filter, QueryProcessor, Reranker, ResultCache, SearchService,
};
pub use types::{
    Article, HealthReport, HealthStatus, SearchRequest, SearchResponse, SearchResult,
};

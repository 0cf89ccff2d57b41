//! Search pipeline
//!
//! Provides:
//! - Metadata filtering with boundary-validated predicates
//! - Cosine-similarity retrieval with candidate over-fetch
//! - Multi-factor reranking (similarity, title match, recency)
//! - TTL/LRU result caching with single-flight de-duplication

mod cache;
mod filter;
mod query;
mod rerank;
mod service;

pub use cache::{request_key, CacheStats, ResultCache};
pub use filter::Filter;
pub use query::QueryProcessor;
pub use rerank::{tokenize, Reranker};
pub use service::SearchService;

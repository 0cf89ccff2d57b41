//! Request, response and article types for the search engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A news article as produced by the ingestion pipeline.
///
/// Read-only to this crate: identity (`id`) and metadata correctness are
/// owned by ingestion, which also guarantees one id per URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub id: String,
    pub title: String,
    pub url: String,
    pub source: String,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub published_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

/// One search request. Ephemeral, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub min_score: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_after: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_before: Option<DateTime<Utc>>,
    #[serde(default = "default_use_reranking")]
    pub use_reranking: bool,
}

fn default_limit() -> usize {
    20
}

fn default_use_reranking() -> bool {
    true
}

impl SearchRequest {
    /// Request with all knobs at their defaults
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            limit: default_limit(),
            min_score: 0.0,
            sources: None,
            categories: None,
            published_after: None,
            published_before: None,
            use_reranking: default_use_reranking(),
        }
    }
}

/// One ranked hit, denormalized for display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub article_id: String,
    pub title: String,
    pub url: String,
    pub source: String,
    pub categories: Vec<String>,
    pub keywords: Vec<String>,
    #[serde(rename = "published_date")]
    pub published_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Final relevance score in [0, 1]
    pub score: f32,
    /// Identifies the vector this hit was ranked by: `"{model_name}:{article_id}"`
    pub embedding_id: String,
}

/// Response envelope for a search call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub query: String,
    pub results: Vec<SearchResult>,
    pub total_results: usize,
    pub execution_time_ms: u64,
    pub reranking_applied: bool,
    pub filters_applied: bool,
}

/// Service health as reported by `SearchService::health`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub total_indexed_articles: usize,
    pub embedding_dimensions: usize,
    pub model_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_indexed: Option<DateTime<Utc>>,
}

/// Coarse service status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Index populated and embedder reachable
    Healthy,
    /// Serving, but the index is empty or mid-rebuild
    Degraded,
    /// Embedding runtime unreachable
    Unhealthy,
}

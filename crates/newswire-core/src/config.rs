//! Configuration for the search pipeline and the embedding runtime

use serde::{Deserialize, Serialize};

/// Tuning knobs for query processing, reranking and caching.
///
/// The reranking weights and the recency horizon are defaults carried over
/// from operational tuning, not guaranteed-optimal values; treat them as
/// configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Candidate over-fetch: `k = max(limit * candidate_multiplier, limit + candidate_headroom)`
    #[serde(default = "default_candidate_multiplier")]
    pub candidate_multiplier: usize,
    /// Additive floor for the candidate set size
    #[serde(default = "default_candidate_headroom")]
    pub candidate_headroom: usize,
    /// Reranking weights (similarity / title match / recency)
    #[serde(default)]
    pub rerank: RerankWeights,
    /// Articles older than this score 0.0 on recency
    #[serde(default = "default_recency_horizon_days")]
    pub recency_horizon_days: i64,
    /// Result cache time-to-live in seconds
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    /// Result cache capacity (entries); LRU beyond this
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
    /// Timeout for a single embedding call, in seconds
    #[serde(default = "default_embed_timeout_secs")]
    pub embed_timeout_secs: u64,
    /// Cap on concurrent in-flight embedding calls
    #[serde(default = "default_max_concurrent_embeds")]
    pub max_concurrent_embeds: usize,
}

/// Weights for the multi-factor rerank score. Should sum to 1.0 so the
/// final score stays in [0, 1] without relying on the clamp.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RerankWeights {
    pub similarity: f32,
    pub title_match: f32,
    pub recency: f32,
}

impl Default for RerankWeights {
    fn default() -> Self {
        Self {
            similarity: 0.50,
            title_match: 0.30,
            recency: 0.20,
        }
    }
}

fn default_candidate_multiplier() -> usize {
    3
}

fn default_candidate_headroom() -> usize {
    20
}

fn default_recency_horizon_days() -> i64 {
    90
}

fn default_cache_ttl_secs() -> u64 {
    300
}

fn default_cache_capacity() -> usize {
    1024
}

fn default_embed_timeout_secs() -> u64 {
    5
}

fn default_max_concurrent_embeds() -> usize {
    8
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            candidate_multiplier: default_candidate_multiplier(),
            candidate_headroom: default_candidate_headroom(),
            rerank: RerankWeights::default(),
            recency_horizon_days: default_recency_horizon_days(),
            cache_ttl_secs: default_cache_ttl_secs(),
            cache_capacity: default_cache_capacity(),
            embed_timeout_secs: default_embed_timeout_secs(),
            max_concurrent_embeds: default_max_concurrent_embeds(),
        }
    }
}

/// Configuration for an external embedding service (vLLM, OpenAI, TEI, etc.)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingServiceConfig {
    /// Base URL of the embeddings endpoint
    pub url: String,

    /// Model name for embeddings
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Embedding dimensions
    #[serde(default = "default_embedding_dimensions")]
    pub dimensions: usize,

    /// API key (optional, for authenticated services)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_embed_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_embedding_model() -> String {
    "nomic-embed-text-v1.5".to_string()
}

fn default_embedding_dimensions() -> usize {
    384
}

impl Default for EmbeddingServiceConfig {
    fn default() -> Self {
        Self {
            url: std::env::var("NEWSWIRE_EMBEDDING_URL")
                .unwrap_or_else(|_| "http://localhost:8000".to_string()),
            model: std::env::var("NEWSWIRE_EMBEDDING_MODEL")
                .unwrap_or_else(|_| default_embedding_model()),
            dimensions: std::env::var("NEWSWIRE_EMBEDDING_DIMS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_else(default_embedding_dimensions),
            api_key: std::env::var("NEWSWIRE_EMBEDDING_API_KEY").ok(),
            timeout_secs: default_embed_timeout_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_sum_to_one() {
        let w = RerankWeights::default();
        assert!((w.similarity + w.title_match + w.recency - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_search_config_from_empty_json() {
        let config: SearchConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.cache_ttl_secs, 300);
        assert_eq!(config.candidate_multiplier, 3);
    }
}

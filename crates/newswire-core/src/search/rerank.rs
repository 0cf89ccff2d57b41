//! Multi-factor reranking
//!
//! Recomputes a relevance score per candidate from three signals:
//! remapped cosine similarity, query/title token overlap, and publication
//! recency. Pure per-candidate computation, no I/O and no shared state.

use crate::config::{RerankWeights, SearchConfig};
use crate::index::ScoredCandidate;
use chrono::{DateTime, Utc};
use std::collections::HashSet;

/// Reranker with configurable weights and recency horizon
#[derive(Debug, Clone)]
pub struct Reranker {
    weights: RerankWeights,
    recency_horizon_days: i64,
}

impl Reranker {
    pub fn new(config: &SearchConfig) -> Self {
        Self {
            weights: config.rerank,
            recency_horizon_days: config.recency_horizon_days.max(2),
        }
    }

    /// Final score in [0, 1] for one candidate
    pub fn score(&self, query_tokens: &HashSet<String>, candidate: &ScoredCandidate, now: DateTime<Utc>) -> f32 {
        let similarity = remap_similarity(candidate.similarity);
        let title = title_match(query_tokens, &candidate.article.title);
        let recency = self.recency(candidate.article.published_at, now);

        let score = self.weights.similarity * similarity
            + self.weights.title_match * title
            + self.weights.recency * recency;
        score.clamp(0.0, 1.0)
    }

    /// 1.0 for articles up to a day old, linear decay to 0.0 at the horizon
    fn recency(&self, published_at: DateTime<Utc>, now: DateTime<Utc>) -> f32 {
        let age_days = (now - published_at).num_seconds() as f32 / 86_400.0;
        if age_days <= 1.0 {
            1.0
        } else {
            let horizon = self.recency_horizon_days as f32;
            (1.0 - (age_days - 1.0) / (horizon - 1.0)).clamp(0.0, 1.0)
        }
    }
}

/// Cosine similarity remapped from [-1, 1] to [0, 1]
pub fn remap_similarity(sim: f32) -> f32 {
    ((sim + 1.0) / 2.0).clamp(0.0, 1.0)
}

/// Lowercased unique tokens, split on non-alphanumeric boundaries
pub fn tokenize(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Fraction of query tokens present in the title, in [0, 1]
fn title_match(query_tokens: &HashSet<String>, title: &str) -> f32 {
    if query_tokens.is_empty() {
        return 0.0;
    }
    let title_tokens = tokenize(title);
    let overlap = query_tokens.intersection(&title_tokens).count();
    (overlap as f32 / query_tokens.len() as f32).clamp(0.0, 1.0)
}

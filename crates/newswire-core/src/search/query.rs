//! Query processing
//!
//! Orchestrates one request: validate, embed the query, over-fetch
//! candidates from the index, filter, rerank, apply the score floor and
//! cut to the requested limit. Read-only against the index and embedder.

use super::filter::Filter;
use super::rerank::{remap_similarity, tokenize, Reranker};
use crate::config::SearchConfig;
use crate::embed::Embedder;
use crate::error::{NewswireError, Result};
use crate::index::VectorIndex;
use crate::types::{SearchRequest, SearchResult};
use chrono::Utc;
use std::sync::Arc;

const MAX_LIMIT: usize = 100;

/// Executes validated search requests against an index snapshot
pub struct QueryProcessor {
    embedder: Arc<dyn Embedder>,
    index: Arc<VectorIndex>,
    reranker: Reranker,
    candidate_multiplier: usize,
    candidate_headroom: usize,
}

impl QueryProcessor {
    pub fn new(embedder: Arc<dyn Embedder>, index: Arc<VectorIndex>, config: &SearchConfig) -> Self {
        Self {
            embedder,
            index,
            reranker: Reranker::new(config),
            candidate_multiplier: config.candidate_multiplier.max(1),
            candidate_headroom: config.candidate_headroom,
        }
    }

    /// Validate request parameters and derive the metadata filter
    pub fn validate(&self, request: &SearchRequest) -> Result<Filter> {
        if request.query.trim().is_empty() {
            return Err(NewswireError::InvalidQuery(
                "query must not be empty".to_string(),
            ));
        }

        if request.limit == 0 || request.limit > MAX_LIMIT {
            return Err(NewswireError::Validation {
                field: "limit",
                message: format!("must be between 1 and {}, got {}", MAX_LIMIT, request.limit),
            });
        }

        if !request.min_score.is_finite() || !(0.0..=1.0).contains(&request.min_score) {
            return Err(NewswireError::Validation {
                field: "min_score",
                message: format!("must be between 0.0 and 1.0, got {}", request.min_score),
            });
        }

        Filter::from_request(request)
    }

    /// Run the retrieval pipeline for an already validated request
    pub async fn execute(&self, request: &SearchRequest, filter: &Filter) -> Result<Vec<SearchResult>> {
        let query_vector = self.embedder.embed(request.query.trim()).await?;

        // Over-fetch so post-filtering and reranking still have enough
        // candidates, capped at the index size.
        let k = (request.limit * self.candidate_multiplier)
            .max(request.limit + self.candidate_headroom)
            .min(self.index.len().max(1));
        let filter_arg = (!filter.is_empty()).then_some(filter);
        let candidates = self.index.query(&query_vector, k, filter_arg)?;

        tracing::debug!(
            query = %request.query.trim(),
            fetched = candidates.len(),
            k,
            reranking = request.use_reranking,
            "retrieved candidate set"
        );

        let query_tokens = tokenize(&request.query);
        let now = Utc::now();
        let model_name = self.index.model_name();

        let mut results: Vec<SearchResult> = candidates
            .into_iter()
            .map(|candidate| {
                let score = if request.use_reranking {
                    self.reranker.score(&query_tokens, &candidate, now)
                } else {
                    remap_similarity(candidate.similarity)
                };
                let article = candidate.article;
                SearchResult {
                    embedding_id: format!("{}:{}", model_name, article.id),
                    article_id: article.id,
                    title: article.title,
                    url: article.url,
                    source: article.source,
                    categories: article.categories,
                    keywords: article.keywords,
                    published_at: article.published_at,
                    summary: article.summary,
                    score,
                }
            })
            // min_score applies after reranking: reranking can change
            // which items clear the bar.
            .filter(|r| r.score >= request.min_score)
            .collect();

        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| b.published_at.cmp(&a.published_at))
        });
        results.truncate(request.limit);
        Ok(results)
    }
}

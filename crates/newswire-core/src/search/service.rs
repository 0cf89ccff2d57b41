//! Search service facade
//!
//! Composes the embedder, vector index, query processor and result cache
//! behind `search` and `health`. Constructed with explicit dependencies
//! so tests can inject a deterministic embedder.

use super::cache::{request_key, ResultCache};
use super::query::QueryProcessor;
use crate::config::SearchConfig;
use crate::embed::{BoundedEmbedder, Embedder};
use crate::error::Result;
use crate::index::{IndexState, VectorIndex};
use crate::types::{HealthReport, HealthStatus, SearchRequest, SearchResponse};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Public entry point for semantic article search
pub struct SearchService {
    embedder: Arc<dyn Embedder>,
    index: Arc<VectorIndex>,
    processor: QueryProcessor,
    cache: ResultCache,
}

impl SearchService {
    /// Build a service around an embedder and index.
    ///
    /// The embedder is wrapped with a concurrency cap and per-call timeout
    /// from `config`, so callers can hand in a bare client.
    pub fn new(embedder: Arc<dyn Embedder>, index: Arc<VectorIndex>, config: SearchConfig) -> Self {
        let bounded: Arc<dyn Embedder> = Arc::new(BoundedEmbedder::new(
            Arc::clone(&embedder),
            config.max_concurrent_embeds,
            Duration::from_secs(config.embed_timeout_secs),
        ));
        let processor = QueryProcessor::new(Arc::clone(&bounded), Arc::clone(&index), &config);
        let cache = ResultCache::new(
            Duration::from_secs(config.cache_ttl_secs),
            config.cache_capacity,
        );

        Self {
            embedder: bounded,
            index,
            processor,
            cache,
        }
    }

    /// Execute one search request.
    ///
    /// Repeat requests within the cache TTL return the stored response
    /// unmodified (original `execution_time_ms` included). Concurrent
    /// identical misses share a single computation.
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        let started = Instant::now();
        let filter = self.processor.validate(request)?;
        let key = request_key(request);

        if let Some(hit) = self.cache.get(&key) {
            tracing::debug!(query = %request.query.trim(), "cache hit");
            return Ok(hit);
        }

        let gate = self.cache.flight(&key).await;
        let guard = gate.lock().await;

        // Another request may have computed this while we waited.
        if let Some(hit) = self.cache.get(&key) {
            drop(guard);
            self.cache.finish_flight(&key).await;
            return Ok(hit);
        }

        let outcome = self.processor.execute(request, &filter).await;
        drop(guard);
        self.cache.finish_flight(&key).await;
        let results = outcome?;

        let response = SearchResponse {
            query: request.query.trim().to_string(),
            total_results: results.len(),
            results,
            execution_time_ms: started.elapsed().as_millis() as u64,
            reranking_applied: request.use_reranking,
            filters_applied: !filter.is_empty(),
        };

        tracing::info!(
            query = %response.query,
            total = response.total_results,
            elapsed_ms = response.execution_time_ms,
            "search completed"
        );

        self.cache.insert(key, response.clone());
        Ok(response)
    }

    /// Report service health.
    ///
    /// `unhealthy` when the embedding runtime is unreachable; `degraded`
    /// when the index is empty or a rebuild is pending (still reachable,
    /// but results are absent or refused); `healthy` otherwise.
    pub async fn health(&self) -> HealthReport {
        let total = self.index.len();
        let status = if self.embedder.healthcheck().await.is_err() {
            HealthStatus::Unhealthy
        } else if total == 0 || self.index.state() == IndexState::Stale {
            HealthStatus::Degraded
        } else {
            HealthStatus::Healthy
        };

        HealthReport {
            status,
            total_indexed_articles: total,
            embedding_dimensions: self.index.dimensions(),
            model_name: self.index.model_name().to_string(),
            last_indexed: self.index.last_indexed(),
        }
    }

    /// The index this service serves from (ingestion upserts through it)
    pub fn index(&self) -> &Arc<VectorIndex> {
        &self.index
    }

    /// Cache statistics, for operational visibility
    pub fn cache_stats(&self) -> super::cache::CacheStats {
        self.cache.stats()
    }

    /// Release cached results; the service remains usable
    pub fn close(&self) {
        self.cache.clear();
    }
}

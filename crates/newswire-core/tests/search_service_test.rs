//! End-to-end tests for the search pipeline
//!
//! Runs the full facade (cache → query processing → index → reranking)
//! against the deterministic local embedder.

use chrono::{Duration, Utc};
use newswire_core::{
    Article, Embedder, HashEmbedder, HealthStatus, NewswireError, SearchConfig, SearchRequest,
    SearchService, VectorIndex,
};
use std::sync::Arc;

const DIMS: usize = 64;

fn article(id: &str, title: &str, source: &str, categories: &[&str], age_days: i64) -> Article {
    Article {
        id: id.to_string(),
        title: title.to_string(),
        url: format!("https://example.com/{}", id),
        source: source.to_string(),
        categories: categories.iter().map(|s| s.to_string()).collect(),
        keywords: vec![],
        published_at: Utc::now() - Duration::days(age_days),
        summary: None,
    }
}

async fn seeded_service() -> SearchService {
    let embedder = HashEmbedder::new(DIMS);
    let index = Arc::new(VectorIndex::new(embedder.model_name(), DIMS));

    let corpus = [
        ("a1", "Machine learning breakthroughs in vision", "techcrunch", vec!["ai"], 1),
        ("a2", "Machine learning chips hit the market", "wired", vec!["ai", "hardware"], 5),
        ("a3", "Deep learning models shrink again", "techcrunch", vec!["ai"], 10),
        ("a4", "Kernel scheduler rewrite lands", "lwn", vec!["linux"], 2),
        ("a5", "Gardening robots go mainstream", "verge", vec!["robotics"], 40),
        ("a6", "Machine learning regulation debated", "politico", vec!["ai", "policy"], 80),
    ];
    for (id, title, source, categories, age) in corpus {
        let a = article(id, title, source, &categories, age);
        let vector = embedder.embed(title).await.unwrap();
        index.upsert(a, vector).unwrap();
    }

    SearchService::new(Arc::new(HashEmbedder::new(DIMS)), index, SearchConfig::default())
}

#[tokio::test]
async fn scores_are_sorted_bounded_and_above_floor() {
    let service = seeded_service().await;

    let mut request = SearchRequest::new("machine learning breakthroughs");
    request.limit = 5;
    request.min_score = 0.5;
    let response = service.search(&request).await.unwrap();

    assert!(response.results.len() <= 5);
    assert!(response.reranking_applied);
    for window in response.results.windows(2) {
        assert!(window[0].score >= window[1].score);
    }
    for result in &response.results {
        assert!((0.0..=1.0).contains(&result.score));
        assert!(result.score >= 0.5);
        assert_eq!(result.embedding_id, format!("token-hash-v1:{}", result.article_id));
    }
}

#[tokio::test]
async fn source_filter_is_strict() {
    let service = seeded_service().await;

    let mut request = SearchRequest::new("machine learning");
    request.sources = Some(vec!["techcrunch".to_string()]);
    let response = service.search(&request).await.unwrap();

    assert!(response.filters_applied);
    assert!(!response.results.is_empty());
    assert!(response.results.iter().all(|r| r.source == "techcrunch"));
}

#[tokio::test]
async fn category_filter_is_strict() {
    let service = seeded_service().await;

    let mut request = SearchRequest::new("machine learning");
    request.categories = Some(vec!["policy".to_string()]);
    let response = service.search(&request).await.unwrap();

    assert!(!response.results.is_empty());
    assert!(response
        .results
        .iter()
        .all(|r| r.categories.iter().any(|c| c == "policy")));
}

#[tokio::test]
async fn reranking_can_change_the_order() {
    // Index vectors directly so raw similarity and title/recency signals
    // can be pulled apart: one old article whose vector equals the query
    // exactly, one fresh title-matching article that is slightly off.
    let embedder = HashEmbedder::new(DIMS);
    let index = Arc::new(VectorIndex::new(embedder.model_name(), DIMS));

    let query = "machine learning breakthroughs";
    let query_vector = embedder.embed(query).await.unwrap();
    let other = embedder.embed("unrelated filler text").await.unwrap();

    let mut blended: Vec<f32> = query_vector
        .iter()
        .zip(&other)
        .map(|(q, o)| 0.9 * q + 0.1 * o)
        .collect();
    let norm = blended.iter().map(|x| x * x).sum::<f32>().sqrt();
    blended.iter_mut().for_each(|x| *x /= norm);

    index
        .upsert(
            article("old", "Quarterly results recap", "wired", &["business"], 400),
            query_vector.clone(),
        )
        .unwrap();
    index
        .upsert(
            article("new", "Machine learning breakthroughs", "wired", &["ai"], 0),
            blended,
        )
        .unwrap();

    let service = SearchService::new(
        Arc::new(HashEmbedder::new(DIMS)),
        index,
        SearchConfig::default(),
    );

    let mut raw = SearchRequest::new(query);
    raw.use_reranking = false;
    let raw_response = service.search(&raw).await.unwrap();
    assert_eq!(raw_response.results[0].article_id, "old");
    assert!(!raw_response.reranking_applied);

    let reranked_response = service.search(&SearchRequest::new(query)).await.unwrap();
    assert_eq!(reranked_response.results[0].article_id, "new");
}

#[tokio::test]
async fn empty_index_is_degraded_and_returns_nothing() {
    let index = Arc::new(VectorIndex::new("token-hash-v1", DIMS));
    let service = SearchService::new(
        Arc::new(HashEmbedder::new(DIMS)),
        index,
        SearchConfig::default(),
    );

    let response = service.search(&SearchRequest::new("anything")).await.unwrap();
    assert_eq!(response.total_results, 0);

    let report = service.health().await;
    assert_eq!(report.status, HealthStatus::Degraded);
    assert_eq!(report.total_indexed_articles, 0);
}

#[tokio::test]
async fn stale_index_fails_fast() {
    let service = seeded_service().await;
    service.index().mark_stale();

    let err = service
        .search(&SearchRequest::new("some novel query"))
        .await
        .unwrap_err();
    assert!(matches!(err, NewswireError::IndexStale(_)));
    assert_eq!(service.health().await.status, HealthStatus::Degraded);

    // Publishing a rebuild restores service.
    let embedder = HashEmbedder::new(DIMS);
    let mut batch = service.index().begin_rebuild();
    batch
        .upsert(
            article("r1", "Fresh article after rebuild", "wired", &["tech"], 0),
            embedder.embed("Fresh article after rebuild").await.unwrap(),
        )
        .unwrap();
    service.index().publish(batch);

    assert!(service.search(&SearchRequest::new("fresh article")).await.is_ok());
    assert_eq!(service.health().await.status, HealthStatus::Healthy);
}

#[tokio::test]
async fn repeat_request_hits_the_cache() {
    let service = seeded_service().await;
    let request = SearchRequest::new("machine learning");

    let first = service.search(&request).await.unwrap();
    let second = service.search(&request).await.unwrap();

    // Stored response returned unmodified, timing included.
    assert_eq!(first.execution_time_ms, second.execution_time_ms);
    assert_eq!(first.total_results, second.total_results);
    assert_eq!(
        first.results.iter().map(|r| &r.article_id).collect::<Vec<_>>(),
        second.results.iter().map(|r| &r.article_id).collect::<Vec<_>>()
    );

    // Normalized variants share the entry.
    let variant = SearchRequest::new("  MACHINE LEARNING ");
    let third = service.search(&variant).await.unwrap();
    assert_eq!(first.execution_time_ms, third.execution_time_ms);
}

#[tokio::test]
async fn reindexing_same_article_never_duplicates() {
    let embedder = HashEmbedder::new(DIMS);
    let index = Arc::new(VectorIndex::new(embedder.model_name(), DIMS));
    let a = article("a1", "Machine learning breakthroughs", "wired", &["ai"], 0);
    let vector = embedder.embed(&a.title).await.unwrap();

    index.upsert(a.clone(), vector.clone()).unwrap();
    index.upsert(a, vector).unwrap();
    assert_eq!(index.len(), 1);

    let service = SearchService::new(
        Arc::new(HashEmbedder::new(DIMS)),
        index,
        SearchConfig::default(),
    );
    let response = service
        .search(&SearchRequest::new("machine learning"))
        .await
        .unwrap();
    assert_eq!(response.total_results, 1);
}

#[tokio::test]
async fn validation_errors_propagate_without_caching() {
    let service = seeded_service().await;

    let mut request = SearchRequest::new("machine learning");
    request.min_score = 2.0;
    assert!(matches!(
        service.search(&request).await.unwrap_err(),
        NewswireError::Validation { field: "min_score", .. }
    ));

    assert!(matches!(
        service.search(&SearchRequest::new("")).await.unwrap_err(),
        NewswireError::InvalidQuery(_)
    ));
}

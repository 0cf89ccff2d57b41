//! In-memory vector index with snapshot-swap publication
//!
//! One index instance holds vectors of one fixed dimension produced by one
//! model version; mixing spaces is an integrity violation and is rejected
//! at the boundary. Readers clone an `Arc` to the current snapshot under a
//! short lock and then rank lock-free, so no query ever observes a
//! partially applied write or a half-built rebuild.

use crate::error::{NewswireError, Result};
use crate::search::Filter;
use crate::types::Article;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Index lifecycle: EMPTY → INDEXED (first upsert) → STALE (model change,
/// rebuild pending) → INDEXED (rebuild published).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexState {
    Empty,
    Indexed,
    Stale,
}

/// A candidate returned by [`VectorIndex::query`].
///
/// `similarity` is raw cosine in [-1, 1]; remapping to [0, 1] is the
/// scorer's job.
#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub article: Article,
    pub similarity: f32,
}

#[derive(Clone)]
struct IndexEntry {
    article: Article,
    vector: Vec<f32>,
}

/// Immutable point-in-time contents of the index
#[derive(Clone, Default)]
struct IndexSnapshot {
    entries: HashMap<String, IndexEntry>,
    last_indexed: Option<DateTime<Utc>>,
}

struct Shared {
    snapshot: Arc<IndexSnapshot>,
    state: IndexState,
}

/// Vector store answering top-K cosine similarity queries with metadata
/// filtering
pub struct VectorIndex {
    shared: RwLock<Shared>,
    dimensions: usize,
    model_name: String,
}

impl VectorIndex {
    pub fn new(model_name: impl Into<String>, dimensions: usize) -> Self {
        Self {
            shared: RwLock::new(Shared {
                snapshot: Arc::new(IndexSnapshot::default()),
                state: IndexState::Empty,
            }),
            dimensions,
            model_name: model_name.into(),
        }
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn state(&self) -> IndexState {
        self.shared.read().expect("index lock poisoned").state
    }

    pub fn len(&self) -> usize {
        self.current().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// When the most recent upsert or rebuild was published
    pub fn last_indexed(&self) -> Option<DateTime<Utc>> {
        self.current().last_indexed
    }

    fn current(&self) -> Arc<IndexSnapshot> {
        Arc::clone(&self.shared.read().expect("index lock poisoned").snapshot)
    }

    fn check_dimensions(&self, vector: &[f32]) -> Result<()> {
        if vector.len() != self.dimensions {
            return Err(NewswireError::DimensionMismatch {
                expected: self.dimensions,
                actual: vector.len(),
            });
        }
        Ok(())
    }

    /// Insert or overwrite the entry for `article.id`.
    ///
    /// Re-indexing the same id never duplicates. Rejected while a rebuild
    /// is pending: single upserts cannot bring a stale index back.
    pub fn upsert(&self, article: Article, vector: Vec<f32>) -> Result<()> {
        self.check_dimensions(&vector)?;

        let mut shared = self.shared.write().expect("index lock poisoned");
        if shared.state == IndexState::Stale {
            return Err(NewswireError::IndexStale(
                "rebuild pending, upsert refused".to_string(),
            ));
        }

        let snapshot = Arc::make_mut(&mut shared.snapshot);
        snapshot.entries.insert(
            article.id.clone(),
            IndexEntry { article, vector },
        );
        snapshot.last_indexed = Some(Utc::now());
        shared.state = IndexState::Indexed;
        Ok(())
    }

    /// Remove the entry for `article_id`; returns whether it existed
    pub fn remove(&self, article_id: &str) -> bool {
        let mut shared = self.shared.write().expect("index lock poisoned");
        let snapshot = Arc::make_mut(&mut shared.snapshot);
        snapshot.entries.remove(article_id).is_some()
    }

    /// Mark the index stale (embedding model changed); queries fail fast
    /// until a rebuild is published
    pub fn mark_stale(&self) {
        let mut shared = self.shared.write().expect("index lock poisoned");
        shared.state = IndexState::Stale;
    }

    /// Start an off-to-the-side rebuild. Existing queries keep failing
    /// fast (if stale) or serving the old snapshot until [`Self::publish`].
    pub fn begin_rebuild(&self) -> RebuildBatch {
        RebuildBatch {
            entries: HashMap::new(),
            dimensions: self.dimensions,
        }
    }

    /// Atomically swap in a fully built snapshot
    pub fn publish(&self, batch: RebuildBatch) {
        let snapshot = IndexSnapshot {
            entries: batch.entries,
            last_indexed: Some(Utc::now()),
        };
        let mut shared = self.shared.write().expect("index lock poisoned");
        shared.state = if snapshot.entries.is_empty() {
            IndexState::Empty
        } else {
            IndexState::Indexed
        };
        shared.snapshot = Arc::new(snapshot);
    }

    /// Top-`k` entries by cosine similarity to `query_vector`, descending,
    /// ties broken by more-recent `published_at`. `filter` is applied
    /// during retrieval, before the cut to `k`.
    pub fn query(
        &self,
        query_vector: &[f32],
        k: usize,
        filter: Option<&Filter>,
    ) -> Result<Vec<ScoredCandidate>> {
        self.check_dimensions(query_vector)?;

        let snapshot = {
            let shared = self.shared.read().expect("index lock poisoned");
            if shared.state == IndexState::Stale {
                return Err(NewswireError::IndexStale(
                    "index rebuild in progress".to_string(),
                ));
            }
            Arc::clone(&shared.snapshot)
        };

        let mut candidates: Vec<ScoredCandidate> = snapshot
            .entries
            .values()
            .filter(|entry| filter.map_or(true, |f| f.matches(&entry.article)))
            .map(|entry| ScoredCandidate {
                similarity: cosine_similarity(query_vector, &entry.vector),
                article: entry.article.clone(),
            })
            .collect();

        candidates.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| b.article.published_at.cmp(&a.article.published_at))
        });
        candidates.truncate(k);
        Ok(candidates)
    }
}

/// Compute cosine similarity between two vectors
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

/// Accumulates entries for a rebuild; nothing is visible to readers until
/// the batch is published
pub struct RebuildBatch {
    entries: HashMap<String, IndexEntry>,
    dimensions: usize,
}

impl RebuildBatch {
    pub fn upsert(&mut self, article: Article, vector: Vec<f32>) -> Result<()> {
        if vector.len() != self.dimensions {
            return Err(NewswireError::DimensionMismatch {
                expected: self.dimensions,
                actual: vector.len(),
            });
        }
        self.entries
            .insert(article.id.clone(), IndexEntry { article, vector });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn article(id: &str, source: &str, age_days: i64) -> Article {
        Article {
            id: id.to_string(),
            title: format!("article {}", id),
            url: format!("https://example.com/{}", id),
            source: source.to_string(),
            categories: vec!["tech".to_string()],
            keywords: vec![],
            published_at: Utc::now() - Duration::days(age_days),
            summary: None,
        }
    }

    #[test]
    fn test_cosine_similarity_identical() {
        let a = vec![1.0, 0.0, 0.0];
        let sim = cosine_similarity(&a, &a);
        assert!((sim - 1.0).abs() < 0.0001);
    }

    #[test]
    fn test_cosine_similarity_orthogonal() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![0.0, 1.0, 0.0];
        assert!(cosine_similarity(&a, &b).abs() < 0.0001);
    }

    #[test]
    fn test_cosine_similarity_zero_norm() {
        let a = vec![0.0, 0.0];
        let b = vec![1.0, 1.0];
        assert_eq!(cosine_similarity(&a, &b), 0.0);
    }

    #[test]
    fn test_upsert_overwrites_same_id() {
        let index = VectorIndex::new("test-model", 2);
        index.upsert(article("a1", "wired", 0), vec![1.0, 0.0]).unwrap();
        index.upsert(article("a1", "wired", 0), vec![0.0, 1.0]).unwrap();
        assert_eq!(index.len(), 1);

        let hits = index.query(&[0.0, 1.0], 10, None).unwrap();
        assert!((hits[0].similarity - 1.0).abs() < 0.0001);
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let index = VectorIndex::new("test-model", 3);
        let err = index
            .upsert(article("a1", "wired", 0), vec![1.0, 0.0])
            .unwrap_err();
        assert!(matches!(
            err,
            NewswireError::DimensionMismatch {
                expected: 3,
                actual: 2
            }
        ));
    }

    #[test]
    fn test_query_orders_by_similarity_then_recency() {
        let index = VectorIndex::new("test-model", 2);
        index.upsert(article("old", "wired", 30), vec![1.0, 0.0]).unwrap();
        index.upsert(article("new", "wired", 1), vec![1.0, 0.0]).unwrap();
        index.upsert(article("far", "wired", 0), vec![0.0, 1.0]).unwrap();

        let hits = index.query(&[1.0, 0.0], 10, None).unwrap();
        let ids: Vec<&str> = hits.iter().map(|h| h.article.id.as_str()).collect();
        // Equal similarity: newer article first; dissimilar one last.
        assert_eq!(ids, vec!["new", "old", "far"]);
    }

    #[test]
    fn test_state_machine() {
        let index = VectorIndex::new("test-model", 2);
        assert_eq!(index.state(), IndexState::Empty);

        index.upsert(article("a1", "wired", 0), vec![1.0, 0.0]).unwrap();
        assert_eq!(index.state(), IndexState::Indexed);

        index.mark_stale();
        assert_eq!(index.state(), IndexState::Stale);
        assert!(matches!(
            index.query(&[1.0, 0.0], 5, None).unwrap_err(),
            NewswireError::IndexStale(_)
        ));
        assert!(matches!(
            index.upsert(article("a2", "wired", 0), vec![1.0, 0.0]).unwrap_err(),
            NewswireError::IndexStale(_)
        ));

        let mut batch = index.begin_rebuild();
        batch.upsert(article("a2", "verge", 0), vec![0.5, 0.5]).unwrap();
        index.publish(batch);
        assert_eq!(index.state(), IndexState::Indexed);
        assert_eq!(index.len(), 1);
        assert!(index.query(&[1.0, 0.0], 5, None).is_ok());
    }

    #[test]
    fn test_remove() {
        let index = VectorIndex::new("test-model", 2);
        index.upsert(article("a1", "wired", 0), vec![1.0, 0.0]).unwrap();
        assert!(index.remove("a1"));
        assert!(!index.remove("a1"));
        assert_eq!(index.len(), 0);
    }

    #[test]
    fn test_old_snapshot_survives_concurrent_write() {
        let index = VectorIndex::new("test-model", 2);
        index.upsert(article("a1", "wired", 0), vec![1.0, 0.0]).unwrap();

        let before = index.current();
        index.upsert(article("a2", "verge", 0), vec![0.0, 1.0]).unwrap();

        // The previously cloned snapshot is untouched.
        assert_eq!(before.entries.len(), 1);
        assert_eq!(index.len(), 2);
    }
}

//! Embedding generation
//!
//! The engine only depends on the [`Embedder`] contract; the actual model
//! runtime lives behind it (external HTTP service, or the deterministic
//! local hash embedder for tests and offline runs).

mod hash;
mod http;

pub use hash::HashEmbedder;
pub use http::HttpEmbedder;

use crate::error::{NewswireError, Result};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

/// Embedding generation trait
///
/// Implementations must be deterministic for a given model version: the
/// same text always maps to the same vector. Empty or whitespace-only
/// input is rejected with [`NewswireError::EmptyInput`].
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate embedding for a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for a batch of texts
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }

    /// Get embedding dimensions
    fn dimensions(&self) -> usize;

    /// Get model name
    fn model_name(&self) -> &str;

    /// Probe whether the model runtime is reachable
    async fn healthcheck(&self) -> Result<()> {
        Ok(())
    }
}

/// Decorator that caps concurrent embedding calls and bounds their latency.
///
/// Model runtimes degrade badly under unbounded fan-out, so every call
/// first takes a semaphore permit; calls that exceed the timeout are
/// abandoned and surface as [`NewswireError::EmbeddingUnavailable`].
/// Dropping the future (client disconnect) releases the permit and aborts
/// the in-flight request.
pub struct BoundedEmbedder {
    inner: Arc<dyn Embedder>,
    permits: Semaphore,
    timeout: Duration,
}

impl BoundedEmbedder {
    pub fn new(inner: Arc<dyn Embedder>, max_concurrent: usize, timeout: Duration) -> Self {
        Self {
            inner,
            permits: Semaphore::new(max_concurrent.max(1)),
            timeout,
        }
    }
}

#[async_trait]
impl Embedder for BoundedEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| NewswireError::EmbeddingUnavailable("embedder shut down".to_string()))?;

        tokio::time::timeout(self.timeout, self.inner.embed(text))
            .await
            .map_err(|_| {
                NewswireError::EmbeddingUnavailable(format!(
                    "embedding call timed out after {:?}",
                    self.timeout
                ))
            })?
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| NewswireError::EmbeddingUnavailable("embedder shut down".to_string()))?;

        tokio::time::timeout(self.timeout, self.inner.embed_batch(texts))
            .await
            .map_err(|_| {
                NewswireError::EmbeddingUnavailable(format!(
                    "embedding call timed out after {:?}",
                    self.timeout
                ))
            })?
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }

    async fn healthcheck(&self) -> Result<()> {
        self.inner.healthcheck().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct SlowEmbedder;

    #[async_trait]
    impl Embedder for SlowEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(vec![0.0; 4])
        }

        fn dimensions(&self) -> usize {
            4
        }

        fn model_name(&self) -> &str {
            "slow-test-model"
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_bounded_embedder_times_out() {
        let bounded = BoundedEmbedder::new(
            Arc::new(SlowEmbedder),
            2,
            Duration::from_millis(100),
        );
        let err = bounded.embed("hello").await.unwrap_err();
        assert!(matches!(err, NewswireError::EmbeddingUnavailable(_)));
    }

    #[tokio::test]
    async fn test_bounded_embedder_passes_through() {
        let bounded = BoundedEmbedder::new(
            Arc::new(HashEmbedder::new(16)),
            2,
            Duration::from_secs(5),
        );
        let vector = bounded.embed("rust async runtimes").await.unwrap();
        assert_eq!(vector.len(), 16);
        assert_eq!(bounded.dimensions(), 16);
    }
}

//! HTTP-based embedder for OpenAI-compatible embedding services
//! (vLLM, OpenAI, text-embeddings-inference, etc.)

use super::Embedder;
use crate::config::EmbeddingServiceConfig;
use crate::error::{NewswireError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Embedder backed by an external `/v1/embeddings` endpoint.
///
/// Performs no internal result caching; the search pipeline caches
/// downstream. Connection failures and timeouts surface as
/// [`NewswireError::EmbeddingUnavailable`] so callers can map them to a
/// 503-class condition.
pub struct HttpEmbedder {
    http_client: reqwest::Client,
    config: EmbeddingServiceConfig,
}

#[derive(Serialize)]
struct EmbedRequest {
    model: String,
    input: Vec<String>,
}

#[derive(Deserialize)]
struct EmbedResponse {
    data: Vec<EmbedData>,
}

#[derive(Deserialize)]
struct EmbedData {
    embedding: Vec<f32>,
}

impl HttpEmbedder {
    /// Create from configuration
    pub fn new(config: EmbeddingServiceConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(NewswireError::Http)?;

        Ok(Self {
            http_client,
            config,
        })
    }

    /// Create from `NEWSWIRE_EMBEDDING_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(EmbeddingServiceConfig::default())
    }

    fn classify(&self, e: reqwest::Error) -> NewswireError {
        if e.is_timeout() || e.is_connect() {
            NewswireError::EmbeddingUnavailable(e.to_string())
        } else {
            NewswireError::Http(e)
        }
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let results = self.embed_batch(&[text.to_string()]).await?;
        results
            .into_iter()
            .next()
            .ok_or_else(|| NewswireError::EmbeddingUnavailable("no embedding returned".to_string()))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.iter().any(|t| t.trim().is_empty()) {
            return Err(NewswireError::EmptyInput);
        }

        let request = EmbedRequest {
            model: self.config.model.clone(),
            input: texts.to_vec(),
        };

        let url = format!("{}/v1/embeddings", self.config.url.trim_end_matches('/'));
        let mut req = self.http_client.post(&url).json(&request);
        if let Some(ref api_key) = self.config.api_key {
            req = req.header("Authorization", format!("Bearer {}", api_key));
        }

        let response = req.send().await.map_err(|e| self.classify(e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(NewswireError::EmbeddingUnavailable(format!(
                "embedding service error (HTTP {}): {}",
                status, body
            )));
        }

        let embed_response: EmbedResponse =
            response.json().await.map_err(|e| self.classify(e))?;

        tracing::debug!(
            count = texts.len(),
            model = %self.config.model,
            "embedded batch"
        );

        Ok(embed_response
            .data
            .into_iter()
            .map(|d| d.embedding)
            .collect())
    }

    fn dimensions(&self) -> usize {
        self.config.dimensions
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }

    async fn healthcheck(&self) -> Result<()> {
        let url = format!("{}/v1/models", self.config.url.trim_end_matches('/'));
        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(NewswireError::EmbeddingUnavailable(format!(
                "embedding service returned HTTP {}",
                response.status()
            )))
        }
    }
}

//! Deterministic token-hash embedder
//!
//! Maps each token to a pseudo-random unit direction derived from its
//! SHA-256 digest and sums them. Texts sharing tokens end up with
//! correlated vectors, which is enough semantic structure for tests,
//! offline development and demo corpora. Not a substitute for a real
//! model at relevance-quality level.

use super::Embedder;
use crate::error::{NewswireError, Result};
use async_trait::async_trait;
use sha2::{Digest, Sha256};

const MODEL_NAME: &str = "token-hash-v1";

/// Local, dependency-free embedder with stable output per text
pub struct HashEmbedder {
    dimensions: usize,
}

impl HashEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    fn token_vector(&self, token: &str) -> Vec<f32> {
        let digest = Sha256::digest(token.as_bytes());
        let mut seed = u64::from_le_bytes(digest[..8].try_into().expect("digest is 32 bytes"));
        // xorshift64*, seeded from the token digest
        (0..self.dimensions)
            .map(|_| {
                seed ^= seed << 13;
                seed ^= seed >> 7;
                seed ^= seed << 17;
                let unit = (seed.wrapping_mul(0x2545F4914F6CDD1D) >> 40) as f32 / (1u64 << 24) as f32;
                unit * 2.0 - 1.0
            })
            .collect()
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(NewswireError::EmptyInput);
        }

        let mut vector = vec![0.0f32; self.dimensions];
        let mut tokens = trimmed
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect::<Vec<_>>();
        if tokens.is_empty() {
            // Punctuation-only input still embeds deterministically
            tokens.push(trimmed.to_lowercase());
        }

        for token in &tokens {
            for (acc, component) in vector.iter_mut().zip(self.token_vector(token)) {
                *acc += component;
            }
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut vector {
                *x /= norm;
            }
        }
        Ok(vector)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_name(&self) -> &str {
        MODEL_NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_embedding_is_deterministic() {
        let embedder = HashEmbedder::new(64);
        let a = embedder.embed("machine learning breakthroughs").await.unwrap();
        let b = embedder.embed("machine learning breakthroughs").await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_shared_tokens_correlate() {
        let embedder = HashEmbedder::new(128);
        let base = embedder.embed("rust compiler internals").await.unwrap();
        let close = embedder.embed("rust compiler performance").await.unwrap();
        let far = embedder.embed("celebrity gossip roundup").await.unwrap();

        let dot = |a: &[f32], b: &[f32]| a.iter().zip(b).map(|(x, y)| x * y).sum::<f32>();
        assert!(dot(&base, &close) > dot(&base, &far));
    }

    #[tokio::test]
    async fn test_rejects_empty_input() {
        let embedder = HashEmbedder::new(8);
        assert!(matches!(
            embedder.embed("   ").await.unwrap_err(),
            NewswireError::EmptyInput
        ));
    }

    #[tokio::test]
    async fn test_output_is_normalized() {
        let embedder = HashEmbedder::new(32);
        let v = embedder.embed("quantum computing advances").await.unwrap();
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }
}

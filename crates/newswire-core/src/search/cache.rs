//! Result caching to short-circuit repeat queries
//!
//! Keyed by a normalized request hash, TTL-bounded, capacity-bounded with
//! least-recently-used eviction. Losing the cache never affects
//! correctness, only latency.

use crate::types::{SearchRequest, SearchResponse};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

#[derive(Clone)]
struct CacheEntry {
    response: SearchResponse,
    expires_at: Instant,
    last_used: Instant,
}

/// TTL + LRU bounded cache for search responses.
///
/// A hit returns the stored response unmodified, including its original
/// `execution_time_ms`; callers relying on per-request timing should
/// treat cached responses accordingly.
pub struct ResultCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    pending: tokio::sync::Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
    ttl: Duration,
    capacity: usize,
}

impl ResultCache {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            pending: tokio::sync::Mutex::new(HashMap::new()),
            ttl,
            capacity: capacity.max(1),
        }
    }

    /// Get cached response if present and not expired
    pub fn get(&self, key: &str) -> Option<SearchResponse> {
        let mut entries = self.entries.lock().ok()?;
        let entry = entries.get_mut(key)?;
        if Instant::now() < entry.expires_at {
            entry.last_used = Instant::now();
            Some(entry.response.clone())
        } else {
            entries.remove(key);
            None
        }
    }

    /// Store a response under `key`, evicting as needed
    pub fn insert(&self, key: String, response: SearchResponse) {
        let Ok(mut entries) = self.entries.lock() else {
            return;
        };

        let now = Instant::now();
        if !entries.contains_key(&key) && entries.len() >= self.capacity {
            entries.retain(|_, e| now < e.expires_at);
            if entries.len() >= self.capacity {
                // Still full: drop the least recently used entry
                if let Some(oldest) = entries
                    .iter()
                    .min_by_key(|(_, e)| e.last_used)
                    .map(|(k, _)| k.clone())
                {
                    entries.remove(&oldest);
                }
            }
        }

        entries.insert(
            key,
            CacheEntry {
                response,
                expires_at: now + self.ttl,
                last_used: now,
            },
        );
    }

    /// Per-key gate for single-flight de-duplication: concurrent misses on
    /// the same key serialize on the returned mutex and re-check the cache
    /// once they hold it, so one computation serves all of them.
    pub async fn flight(&self, key: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut pending = self.pending.lock().await;
        Arc::clone(
            pending
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(()))),
        )
    }

    /// Drop the flight gate once a computation has been published
    pub async fn finish_flight(&self, key: &str) {
        self.pending.lock().await.remove(key);
    }

    /// Clear expired entries
    pub fn cleanup(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            let now = Instant::now();
            entries.retain(|_, e| now < e.expires_at);
        }
    }

    /// Clear all entries
    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        if let Ok(entries) = self.entries.lock() {
            let now = Instant::now();
            let total = entries.len();
            let expired = entries.values().filter(|e| now >= e.expires_at).count();
            CacheStats {
                total_entries: total,
                expired_entries: expired,
                active_entries: total - expired,
            }
        } else {
            CacheStats::default()
        }
    }
}

/// Cache statistics
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CacheStats {
    pub total_entries: usize,
    pub expired_entries: usize,
    pub active_entries: usize,
}

/// Normalized cache key for a search request.
///
/// Two requests that differ only in query casing/whitespace or in the
/// order of their filter values map to the same key.
pub fn request_key(request: &SearchRequest) -> String {
    let sorted = |values: &Option<Vec<String>>| {
        values.as_ref().map(|v| {
            let mut folded: Vec<String> = v.iter().map(|s| s.trim().to_lowercase()).collect();
            folded.sort();
            folded.join(",")
        })
    };

    let mut hasher = Sha256::new();
    hasher.update(request.query.trim().to_lowercase());
    hasher.update("\x1f");
    hasher.update(sorted(&request.sources).unwrap_or_default());
    hasher.update("\x1f");
    hasher.update(sorted(&request.categories).unwrap_or_default());
    hasher.update("\x1f");
    if let Some(after) = request.published_after {
        hasher.update(after.to_rfc3339());
    }
    hasher.update("\x1f");
    if let Some(before) = request.published_before {
        hasher.update(before.to_rfc3339());
    }
    hasher.update("\x1f");
    hasher.update(request.limit.to_le_bytes());
    hasher.update(request.min_score.to_le_bytes());
    hasher.update([request.use_reranking as u8]);

    format!("search:{:x}", hasher.finalize())
}

//! Metadata filtering
//!
//! Filters are parsed and validated once at the request boundary, then
//! evaluated as a plain predicate during candidate retrieval.

use crate::error::{NewswireError, Result};
use crate::types::{Article, SearchRequest};
use chrono::{DateTime, Utc};
use std::collections::HashSet;

/// Metadata predicate derived from a search request.
///
/// All present fields must match: source membership, at least one shared
/// category, and the publication date window (inclusive bounds).
#[derive(Debug, Clone, Default)]
pub struct Filter {
    pub sources: Option<HashSet<String>>,
    pub categories: Option<HashSet<String>>,
    pub published_after: Option<DateTime<Utc>>,
    pub published_before: Option<DateTime<Utc>>,
}

impl Filter {
    /// Build and validate the filter for a request.
    ///
    /// Source and category values are case-folded so `"TechCrunch"` in a
    /// request matches `"techcrunch"` in article metadata.
    pub fn from_request(request: &SearchRequest) -> Result<Self> {
        if let (Some(after), Some(before)) = (request.published_after, request.published_before) {
            if after > before {
                return Err(NewswireError::Validation {
                    field: "published_after",
                    message: format!("{} is after published_before {}", after, before),
                });
            }
        }

        let fold = |values: &Option<Vec<String>>| {
            values.as_ref().map(|v| {
                v.iter()
                    .map(|s| s.trim().to_lowercase())
                    .filter(|s| !s.is_empty())
                    .collect::<HashSet<_>>()
            })
        };

        Ok(Self {
            sources: fold(&request.sources),
            categories: fold(&request.categories),
            published_after: request.published_after,
            published_before: request.published_before,
        })
    }

    /// Whether no constraint is present
    pub fn is_empty(&self) -> bool {
        self.sources.is_none()
            && self.categories.is_none()
            && self.published_after.is_none()
            && self.published_before.is_none()
    }

    /// Evaluate the predicate against one article
    pub fn matches(&self, article: &Article) -> bool {
        if let Some(ref sources) = self.sources {
            if !sources.contains(&article.source.to_lowercase()) {
                return false;
            }
        }

        if let Some(ref categories) = self.categories {
            let any = article
                .categories
                .iter()
                .any(|c| categories.contains(&c.to_lowercase()));
            if !any {
                return false;
            }
        }

        if let Some(after) = self.published_after {
            if article.published_at < after {
                return false;
            }
        }

        if let Some(before) = self.published_before {
            if article.published_at > before {
                return false;
            }
        }

        true
    }
}

//! Shared handler state

use newswire_core::SearchService;
use std::sync::Arc;

/// Application state passed to route handlers via axum's `State` extractor
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<SearchService>,
}

impl AppState {
    pub fn new(service: Arc<SearchService>) -> Self {
        Self { service }
    }
}

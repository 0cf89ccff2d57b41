//! HTTP search API
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/search` | Semantic article search |
//! | `GET`  | `/search/health` | Service health report |
//!
//! # Error contract
//!
//! ```json
//! { "error": { "code": "validation", "message": "...", "field": "limit" } }
//! ```
//!
//! Codes: `invalid_query` (400), `validation` (422), `embedding_unavailable`
//! and `index_stale` (503, with `Retry-After`), `internal` (500).

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

pub mod handlers;
pub mod state;

pub use state::AppState;

/// Build the router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/search", post(handlers::search))
        .route("/search/health", get(handlers::health))
        .layer(cors)
        .with_state(state)
}

/// Bind and serve until the process is terminated
pub async fn run_server(bind: &str, state: AppState) -> anyhow::Result<()> {
    let app = create_app(state);
    let listener = tokio::net::TcpListener::bind(bind).await?;
    tracing::info!(%bind, "search API listening");
    axum::serve(listener, app).await?;
    Ok(())
}

//! Newswire search API server
//!
//! Serves `POST /search` and `GET /search/health` over the semantic
//! retrieval engine. The embedding runtime is either an external
//! OpenAI-compatible service or the built-in deterministic local embedder
//! for offline runs.

use anyhow::Result;
use chrono::{Duration, Utc};
use clap::Parser;
use newswire_core::{
    Article, Embedder, EmbeddingServiceConfig, HashEmbedder, HttpEmbedder, SearchConfig,
    SearchService, VectorIndex,
};
use newswire_server::{run_server, AppState};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "newswire-server", about = "Semantic search API for tech-news articles")]
struct Cli {
    /// Address to bind the HTTP server to
    #[arg(long, default_value = "0.0.0.0:3000", env = "NEWSWIRE_BIND")]
    bind: String,

    /// Base URL of the OpenAI-compatible embedding service
    #[arg(long, env = "NEWSWIRE_EMBEDDING_URL")]
    embedding_url: Option<String>,

    /// Embedding model name
    #[arg(long, env = "NEWSWIRE_EMBEDDING_MODEL")]
    embedding_model: Option<String>,

    /// Embedding dimensions
    #[arg(long, default_value_t = 384, env = "NEWSWIRE_EMBEDDING_DIMS")]
    dimensions: usize,

    /// Use the deterministic local embedder instead of an external service
    #[arg(long)]
    local_embedder: bool,

    /// Index a small built-in demo corpus on startup
    #[arg(long)]
    seed_demo: bool,
}

const DEMO_ARTICLES: &[(&str, &str, &str, &[&str], i64)] = &[
    (
        "demo-1",
        "Machine learning breakthroughs reshape code review",
        "techcrunch",
        &["ai", "devtools"],
        0,
    ),
    (
        "demo-2",
        "Rust compiler lands parallel frontend by default",
        "lwn",
        &["rust", "compilers"],
        1,
    ),
    (
        "demo-3",
        "Cloud provider outage traced to config rollout",
        "wired",
        &["cloud", "reliability"],
        3,
    ),
    (
        "demo-4",
        "Quantum error correction milestone announced",
        "verge",
        &["quantum"],
        7,
    ),
    (
        "demo-5",
        "Open source database adds vector search",
        "techcrunch",
        &["databases", "ai"],
        14,
    ),
];

async fn seed_demo_corpus(embedder: &dyn Embedder, index: &VectorIndex) -> Result<()> {
    for (id, title, source, categories, age_days) in DEMO_ARTICLES {
        let article = Article {
            id: id.to_string(),
            title: title.to_string(),
            url: format!("https://news.example.com/{}", id),
            source: source.to_string(),
            categories: categories.iter().map(|s| s.to_string()).collect(),
            keywords: vec![],
            published_at: Utc::now() - Duration::days(*age_days),
            summary: None,
        };
        let vector = embedder.embed(title).await?;
        index.upsert(article, vector)?;
    }
    tracing::info!(count = DEMO_ARTICLES.len(), "seeded demo corpus");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    let embedder: Arc<dyn Embedder> = if cli.local_embedder {
        Arc::new(HashEmbedder::new(cli.dimensions))
    } else {
        let mut config = EmbeddingServiceConfig::default();
        if let Some(url) = cli.embedding_url {
            config.url = url;
        }
        if let Some(model) = cli.embedding_model {
            config.model = model;
        }
        config.dimensions = cli.dimensions;
        Arc::new(HttpEmbedder::new(config)?)
    };

    let index = Arc::new(VectorIndex::new(
        embedder.model_name(),
        embedder.dimensions(),
    ));

    if cli.seed_demo {
        seed_demo_corpus(embedder.as_ref(), &index).await?;
    }

    let service = SearchService::new(embedder, index, SearchConfig::default());
    run_server(&cli.bind, AppState::new(Arc::new(service))).await
}

use agora_core::{LexicalConfig, RankConfig};
use anyhow::Result;
use axum::Router;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use agora_server::{build_app, load_bundle};
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
struct Args {
    /// Directory holding the cases, methods and organizations datasets
    #[arg(long, default_value = "./data")]
    data: PathBuf,
    /// Embedder: `minilm` (sentence encoder), or `hash` / `hash:<dim>` for offline runs
    #[arg(long, default_value = "minilm")]
    embedder: String,
    /// Tokenize like a plain TF-IDF vectorizer: keep stopwords, no stemming
    #[arg(long, default_value_t = false)]
    vectorizer: bool,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
    #[arg(long, default_value_t = 0.7)]
    semantic_weight: f32,
    #[arg(long, default_value_t = 0.3)]
    lexical_weight: f32,
    #[arg(long, default_value_t = 0.5)]
    primary_threshold: f32,
    #[arg(long, default_value_t = 0.5)]
    suggestion_threshold: f32,
    #[arg(long, default_value_t = 3)]
    suggestion_count: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();

    // Build indices once, before accepting any request
    let lexical = if args.vectorizer { LexicalConfig::vectorizer() } else { LexicalConfig::default() };
    let bundle = load_bundle(args.data.clone(), args.embedder.clone(), lexical).await?;
    let defaults = RankConfig {
        semantic_weight: args.semantic_weight,
        lexical_weight: args.lexical_weight,
        primary_threshold: args.primary_threshold,
        suggestion_threshold: args.suggestion_threshold,
        suggestion_count: args.suggestion_count,
    };
    let app: Router = build_app(Arc::new(bundle), defaults);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}

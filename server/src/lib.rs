use agora_core::semantic::build_embedder;
use agora_core::{dataset, AgoraError, IndexBundle, LexicalConfig, RankConfig, NO_ANSWER};
use axum::{extract::{Path, Query, State}, http::StatusCode, routing::{get, post}, Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt::Display;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

type ApiError = (StatusCode, Json<Value>);

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    pub semantic_weight: Option<f32>,
    pub lexical_weight: Option<f32>,
    pub primary_threshold: Option<f32>,
    pub suggestion_threshold: Option<f32>,
    pub suggestion_count: Option<usize>,
}

impl SearchParams {
    fn config(&self, defaults: &RankConfig) -> RankConfig {
        RankConfig {
            semantic_weight: self.semantic_weight.unwrap_or(defaults.semantic_weight),
            lexical_weight: self.lexical_weight.unwrap_or(defaults.lexical_weight),
            primary_threshold: self.primary_threshold.unwrap_or(defaults.primary_threshold),
            suggestion_threshold: self.suggestion_threshold.unwrap_or(defaults.suggestion_threshold),
            suggestion_count: self.suggestion_count.unwrap_or(defaults.suggestion_count),
        }
    }
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub took_s: f64,
    pub answered: bool,
    pub result: Value,
}

#[derive(Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Serialize)]
pub struct ChatReply {
    pub reply: String,
    pub suggestions: Vec<String>,
    pub answered: bool,
}

#[derive(Clone)]
pub struct AppState {
    pub bundle: Arc<IndexBundle>,
    pub defaults: RankConfig,
}

/// Load the datasets and build both indices on the blocking pool. Model
/// loading and document embedding can take a while and must not stall the
/// runtime.
pub async fn load_bundle(data: PathBuf, embedder: String, lexical: LexicalConfig) -> anyhow::Result<IndexBundle> {
    tokio::task::spawn_blocking(move || -> anyhow::Result<IndexBundle> {
        let collections = dataset::load_dir(&data)?;
        let embedder = build_embedder(&embedder)?;
        let bundle = IndexBundle::build(collections, embedder, &lexical)?;
        tracing::info!(docs = bundle.store().len(), data = %data.display(), "indices ready");
        Ok(bundle)
    })
    .await?
}

pub fn build_app(bundle: Arc<IndexBundle>, defaults: RankConfig) -> Router {
    let app_state = AppState { bundle, defaults };

    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/chat", post(chat_handler))
        .route("/doc/:index", get(doc_handler))
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

fn error_response(err: AgoraError) -> ApiError {
    let status = match err {
        AgoraError::InvalidQuery => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        tracing::error!(error = %err, "request failed");
    }
    (status, Json(json!({ "error": err.to_string() })))
}

pub fn internal_error(err: impl Display) -> ApiError {
    tracing::error!(error = %err, "request failed");
    (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": err.to_string() })))
}

/// Ranking is CPU-bound (model inference), so it runs off the async workers.
async fn run_blocking<T, F>(state: &AppState, f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&IndexBundle) -> Result<T, AgoraError> + Send + 'static,
{
    let bundle = Arc::clone(&state.bundle);
    tokio::task::spawn_blocking(move || f(&bundle))
        .await
        .map_err(internal_error)?
        .map_err(error_response)
}

pub async fn search_handler(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Result<Json<SearchResponse>, ApiError> {
    let start = std::time::Instant::now();
    let config = params.config(&state.defaults);
    let query = params.q.clone();
    let (answered, result) = run_blocking(&state, move |bundle| {
        let r = bundle.rank(&query, &config)?;
        Ok((r.is_answered(), serde_json::to_value(&r)))
    })
    .await?;
    let result = result.map_err(internal_error)?;
    let elapsed = start.elapsed();
    Ok(Json(SearchResponse { query: params.q, took_s: elapsed.as_secs_f64(), answered, result }))
}

pub async fn chat_handler(State(state): State<AppState>, Json(req): Json<ChatRequest>) -> Result<Json<ChatReply>, ApiError> {
    let config = state.defaults;
    let reply = run_blocking(&state, move |bundle| {
        let r = bundle.rank(&req.message, &config)?;
        Ok(match &r.primary {
            Some(p) => ChatReply {
                reply: p.document.answer_line(),
                suggestions: r.suggestions.iter().map(|s| s.document.suggestion_line()).collect(),
                answered: true,
            },
            None => ChatReply { reply: NO_ANSWER.to_string(), suggestions: vec![], answered: false },
        })
    })
    .await?;
    Ok(Json(reply))
}

pub async fn doc_handler(State(state): State<AppState>, Path(index): Path<i64>) -> Result<Json<Value>, ApiError> {
    let doc = state
        .bundle
        .store()
        .resolve(index)
        .map_err(|e| (StatusCode::NOT_FOUND, Json(json!({ "error": e.to_string() }))))?;
    Ok(Json(json!({
        "corpus_index": doc.corpus_index,
        "category": doc.category,
        "title": doc.title,
        "description": doc.description,
        "url": doc.url,
    })))
}

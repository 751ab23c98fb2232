//! Router assembly: HTTP endpoints, CORS, upload body limit and HTTP tracing.

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;

/// Build the application router with:
/// - document CRUD under `/api/documents`
/// - model-backed features under `/api/ai`
/// - CORS (allow any origin/method/headers); the SPA is served separately
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
/// - JSON 404 for everything else
pub fn build_router(state: Arc<AppState>) -> Router {
    let upload_limit = state.server.max_upload_bytes;

    Router::new()
        .route("/", get(http::http_root))
        .route("/api/health", get(http::http_health))
        // Documents
        .route("/api/documents", get(http::http_list_documents))
        .route(
            "/api/documents/upload",
            post(http::http_upload_document).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route(
            "/api/documents/:id",
            get(http::http_get_document).delete(http::http_delete_document),
        )
        // Model-backed features
        .route("/api/ai/ask", post(http::http_post_ask))
        .route("/api/ai/quiz", post(http::http_post_quiz))
        .fallback(http::http_not_found)
        // State + CORS + HTTP tracing
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}

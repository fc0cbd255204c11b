//! Router assembly: question/admin endpoints, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod guard;
pub mod http;

/// Build the application router with:
/// - question CRUD + evaluation under `/questions`
/// - admin session endpoints under `/admin`
/// - CORS (allow any origin/method/headers); the quiz UI is served from another origin
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(http::http_health))
        .route(
            "/questions",
            get(http::http_list_questions).post(http::http_create_question),
        )
        .route(
            "/questions/:id",
            put(http::http_update_question).delete(http::http_delete_question),
        )
        .route("/questions/evaluate/:id", post(http::http_evaluate))
        .route("/admin/login", post(http::http_admin_login))
        .route("/admin/logout", post(http::http_admin_logout))
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

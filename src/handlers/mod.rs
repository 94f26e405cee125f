//! HTTP Request Handlers
//!
//! This module contains all HTTP request handlers organized by domain.

pub mod admin;
pub mod contests;
pub mod health;
pub mod judge;
pub mod submissions;

use axum::{extract::DefaultBodyLimit, http::Request, middleware, Router};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use crate::{
    constants::{API_BASE_PATH, MAX_SOURCE_CODE_SIZE},
    middleware::{logging_middleware, redacted_path},
    state::AppState,
};

/// Create all API routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(submissions::routes())
        .nest("/contests", contests::routes())
        .nest("/judge", judge::routes())
        .nest("/admin", admin::routes())
}

/// Full application router with its middleware stack
pub fn router(state: AppState) -> Router {
    // JSON escaping can roughly double the source size
    let body_limit = MAX_SOURCE_CODE_SIZE * 2 + 4096;

    Router::new()
        .nest(API_BASE_PATH, routes())
        .layer(middleware::from_fn(logging_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    path = %redacted_path(request.uri().path()),
                )
            }),
        )
        .layer(CompressionLayer::new())
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

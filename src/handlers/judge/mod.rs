//! Judge callback handlers

mod handler;

pub use handler::*;

use axum::{routing::put, Router};

use crate::state::AppState;

/// Judge routes
pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/callback/{secret}/{submission_id}/{test_index}/{dispatched_at}",
        put(handler::judge_callback).post(handler::judge_callback),
    )
}

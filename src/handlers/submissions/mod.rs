//! Submission handlers

mod handler;
pub mod request;
pub mod response;

pub use handler::*;
pub use request::*;
pub use response::*;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

/// Submission routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/contests/{contest_id}/challenges/{challenge_id}/submissions",
            post(handler::create_submission),
        )
        .route("/submissions/{token}/tests/{index}", get(handler::get_test_result))
        .route("/submissions/{token}/score", get(handler::get_score))
}

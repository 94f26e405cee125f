//! Admin handlers

mod handler;
pub mod response;

pub use handler::*;
pub use response::*;

use axum::{routing::post, Router};

use crate::state::AppState;

/// Admin routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/reset", post(handler::reset))
}

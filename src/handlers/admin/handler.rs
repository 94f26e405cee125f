//! Admin handler implementations

use axum::{extract::State, Json};
use chrono::Utc;

use crate::{error::AppResult, middleware::auth::Admin, state::AppState};

use super::response::ResetResponse;

/// Wipe all submissions, results and stored sources
pub async fn reset(State(state): State<AppState>, _admin: Admin) -> AppResult<Json<ResetResponse>> {
    state.coordinator().reset().await?;

    Ok(Json(ResetResponse {
        message: "All submissions and results were deleted".to_string(),
        reset_at: Utc::now(),
    }))
}

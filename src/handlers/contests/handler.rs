//! Contest handler implementations

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::{error::AppResult, state::AppState};

use super::response::LeaderboardResponse;

/// Get contest leaderboard
pub async fn get_leaderboard(
    State(state): State<AppState>,
    Path(contest_id): Path<Uuid>,
) -> AppResult<Json<LeaderboardResponse>> {
    let board = state.coordinator().leaderboard(&contest_id).await?;
    Ok(Json(board.into()))
}

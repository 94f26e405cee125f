//! Judge callback handler implementation

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{error::AppResult, judge::CallbackPayload, state::AppState};

/// Receive one per-test verdict from the judge
pub async fn judge_callback(
    State(state): State<AppState>,
    Path((secret, submission_id, test_index, dispatched_at)): Path<(String, i64, usize, i64)>,
    Json(payload): Json<CallbackPayload>,
) -> AppResult<StatusCode> {
    state
        .coordinator()
        .on_judge_callback(&secret, submission_id, test_index, dispatched_at, payload)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

//! Submission handler implementations

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    coordinator::NewSubmission,
    error::AppResult,
    middleware::auth::Participant,
    state::AppState,
};

use super::{
    request::CreateSubmissionRequest,
    response::{CreateSubmissionResponse, ScoreResponse, TestResultResponse},
};

/// Create a new submission and dispatch it to the judge
pub async fn create_submission(
    State(state): State<AppState>,
    participant: Participant,
    Path((contest_id, challenge_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<CreateSubmissionRequest>,
) -> AppResult<(StatusCode, Json<CreateSubmissionResponse>)> {
    payload.validate()?;

    let receipt = state
        .coordinator()
        .submit(NewSubmission {
            contest_id,
            challenge_id,
            language_id: payload.language_id,
            user_id: participant.id,
            source: payload.source_code.into_bytes(),
        })
        .await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(CreateSubmissionResponse {
            token: receipt.token,
            message: "Submission received and dispatched for judging".to_string(),
        }),
    ))
}

/// Get the result of one test, waiting until the judge reports it
pub async fn get_test_result(
    State(state): State<AppState>,
    Path((token, index)): Path<(Uuid, usize)>,
) -> AppResult<Json<TestResultResponse>> {
    let result = state.coordinator().get_test(&token, index).await?;
    Ok(Json(TestResultResponse::new(token, result)))
}

/// Get the final score, waiting until every test has reported
pub async fn get_score(
    State(state): State<AppState>,
    Path(token): Path<Uuid>,
) -> AppResult<Json<ScoreResponse>> {
    let score = state.coordinator().get_final_score(&token).await?;
    Ok(Json(ScoreResponse { token, score }))
}

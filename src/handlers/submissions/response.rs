//! Submission response DTOs

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::TestResult;

/// Returned when a submission has been accepted for judging
#[derive(Debug, Serialize)]
pub struct CreateSubmissionResponse {
    pub token: Uuid,
    pub message: String,
}

/// Outcome of one test case
#[derive(Debug, Serialize)]
pub struct TestResultResponse {
    pub token: Uuid,
    pub test_index: i32,
    pub status: String,
    /// Short verdict code (`AC`, `WA`, ...)
    pub verdict: String,
    pub time: Option<f64>,
    pub memory: Option<i64>,
    pub compile_output: Option<String>,
    pub received_at: DateTime<Utc>,
}

impl TestResultResponse {
    pub fn new(token: Uuid, result: TestResult) -> Self {
        Self {
            token,
            test_index: result.test_index,
            verdict: result.verdict().code().to_string(),
            status: result.status,
            time: result.time,
            memory: result.memory,
            compile_output: result.compile_output,
            received_at: result.received_at,
        }
    }
}

/// Final score of a submission
#[derive(Debug, Serialize)]
pub struct ScoreResponse {
    pub token: Uuid,
    pub score: f64,
}

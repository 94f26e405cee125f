//! Submission request DTOs

use serde::Deserialize;
use validator::Validate;

/// Create submission request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateSubmissionRequest {
    /// Judge language id
    #[validate(range(min = 1))]
    pub language_id: i32,

    /// Source code
    #[validate(length(min = 1, max = 1048576))] // 1MB max
    pub source_code: String,
}

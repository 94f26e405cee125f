//! Admin response DTOs

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Reset acknowledgement
#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub message: String,
    pub reset_at: DateTime<Utc>,
}

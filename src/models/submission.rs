//! Submission and per-test result models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::constants::statuses;

/// Submission database model
///
/// The source code is not part of the row; it lives in the source store
/// under `token`.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Submission {
    /// Internal sequential id, embedded in callback URLs
    pub id: i64,
    /// Opaque external identifier handed to clients
    pub token: Uuid,
    pub user_id: Uuid,
    pub contest_id: Uuid,
    pub challenge_id: Uuid,
    pub language_id: i32,
    /// `None` until every test has reported and the scorer ran
    pub score: Option<f64>,
    /// Epoch milliseconds echoed back by the judge on every callback
    pub dispatched_at: i64,
    pub submitted_at: DateTime<Utc>,
}

/// Outcome of one test case, as reported by the judge
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct TestResult {
    pub submission_id: i64,
    pub test_index: i32,
    /// Judge-side token of the execution
    pub token: Option<String>,
    /// Elapsed CPU time in seconds
    pub time: Option<f64>,
    /// Peak memory in kilobytes
    pub memory: Option<i64>,
    /// Raw status description (`Accepted`, `Wrong Answer`, ...)
    pub status: String,
    pub compile_output: Option<String>,
    pub received_at: DateTime<Utc>,
}

impl TestResult {
    /// Classified verdict of this result
    pub fn verdict(&self) -> Verdict {
        Verdict::from_status(&self.status)
    }

    /// Check if this test passed
    pub fn is_accepted(&self) -> bool {
        self.verdict().is_accepted()
    }
}

/// Per-test verdict derived from the judge's status description
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Accepted,
    WrongAnswer,
    TimeLimitExceeded,
    CompilationError,
    RuntimeError,
    InternalError,
    /// Judge has not finished (`In Queue`, `Processing`)
    Pending,
    /// Any description we do not recognize
    Unknown,
}

impl Verdict {
    /// Classify a judge status description
    pub fn from_status(description: &str) -> Self {
        match description.trim() {
            statuses::ACCEPTED => Self::Accepted,
            statuses::WRONG_ANSWER => Self::WrongAnswer,
            statuses::TIME_LIMIT_EXCEEDED => Self::TimeLimitExceeded,
            statuses::COMPILATION_ERROR => Self::CompilationError,
            statuses::INTERNAL_ERROR | statuses::EXEC_FORMAT_ERROR => Self::InternalError,
            statuses::IN_QUEUE | statuses::PROCESSING => Self::Pending,
            s if s.starts_with(statuses::RUNTIME_ERROR_PREFIX) => Self::RuntimeError,
            _ => Self::Unknown,
        }
    }

    /// Get short code for verdict
    pub fn code(&self) -> &'static str {
        match self {
            Self::Accepted => "AC",
            Self::WrongAnswer => "WA",
            Self::TimeLimitExceeded => "TLE",
            Self::CompilationError => "CE",
            Self::RuntimeError => "RE",
            Self::InternalError => "IE",
            Self::Pending => "PD",
            Self::Unknown => "??",
        }
    }

    /// Check if this verdict means the test passed
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_from_status() {
        assert_eq!(Verdict::from_status("Accepted"), Verdict::Accepted);
        assert_eq!(Verdict::from_status("Wrong Answer"), Verdict::WrongAnswer);
        assert_eq!(
            Verdict::from_status("Runtime Error (SIGSEGV)"),
            Verdict::RuntimeError
        );
        assert_eq!(Verdict::from_status("Processing"), Verdict::Pending);
        assert_eq!(Verdict::from_status("accepted"), Verdict::Unknown);
    }

    #[test]
    fn test_only_accepted_passes() {
        assert!(Verdict::Accepted.is_accepted());
        assert!(!Verdict::TimeLimitExceeded.is_accepted());
        assert!(!Verdict::Unknown.is_accepted());
    }
}

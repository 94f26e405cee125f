//! Challenge model: ordered test cases and optional subtasks

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A challenge as seen by the judging core (read-only)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Challenge {
    pub id: Uuid,
    pub contest_id: Uuid,
    pub name: String,
    /// CPU time limit override in seconds
    pub cpu_time_limit: Option<f64>,
    /// Memory limit override in kilobytes
    pub memory_limit_kb: Option<i64>,
    /// Test cases in dispatch order; a test's position is its test index
    pub tests: Vec<TestCase>,
    /// Empty when the challenge is scored by plain pass ratio
    pub subtasks: Vec<Subtask>,
}

impl Challenge {
    /// Position of the test carrying `test_id`
    pub fn index_of(&self, test_id: i32) -> Option<usize> {
        self.tests.iter().position(|t| t.id == test_id)
    }
}

/// Test case database model
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize, Deserialize)]
pub struct TestCase {
    /// Stable id assigned when the challenge is defined
    pub id: i32,
    pub input: String,
    pub expected_output: String,
}

/// A weighted group of tests sharing a scoring mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subtask {
    pub name: String,
    pub weight: f64,
    pub mode: SubtaskMode,
    /// Member tests, by stable test id
    pub test_ids: Vec<i32>,
}

/// How a subtask turns member verdicts into awarded weight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubtaskMode {
    /// Full weight only if every member test is accepted
    Batch,
    /// Weight proportional to the accepted member tests
    Individual,
}

impl SubtaskMode {
    /// Get mode as string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Batch => "BATCH",
            Self::Individual => "INDIVIDUAL",
        }
    }

    /// Parse mode from string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "BATCH" => Some(Self::Batch),
            "INDIVIDUAL" => Some(Self::Individual),
            _ => None,
        }
    }
}

impl std::fmt::Display for SubtaskMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

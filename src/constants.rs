//! Application-wide constants
//!
//! This module contains all constant values used throughout the application.
//! Constants are grouped by their purpose for better organization.

// =============================================================================
// SERVER DEFAULTS
// =============================================================================

/// Default server host address
pub const DEFAULT_SERVER_HOST: &str = "0.0.0.0";

/// Default server port
pub const DEFAULT_SERVER_PORT: u16 = 8080;

/// Default public base URL the judge uses to reach the callback endpoint
pub const DEFAULT_CALLBACK_BASE_URL: &str = "http://localhost:8080";

// =============================================================================
// DATABASE DEFAULTS
// =============================================================================

/// Default maximum database connections in the pool
pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 20;

// =============================================================================
// JUDGE DEFAULTS
// =============================================================================

/// Default base URL of the external judge service
pub const DEFAULT_JUDGE_URL: &str = "http://localhost:2358";

/// Default CPU time limit in seconds when a challenge sets none
pub const DEFAULT_CPU_TIME_LIMIT_SECONDS: f64 = 2.0;

/// Default memory limit in kilobytes when a challenge sets none
pub const DEFAULT_MEMORY_LIMIT_KB: i64 = 128_000;

/// Timeout for a single outbound judge request
pub const DEFAULT_JUDGE_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Path prefix of the inbound judge callback route
pub const CALLBACK_PATH: &str = "/api/v1/judge/callback";

// =============================================================================
// SCORING DEFAULTS
// =============================================================================

/// Point value of a challenge when the contest defines no weight for it
pub const DEFAULT_CHALLENGE_POINTS: f64 = 100.0;

// =============================================================================
// JUDGE STATUSES
// =============================================================================

/// Status descriptions reported by the judge
pub mod statuses {
    pub const IN_QUEUE: &str = "In Queue";
    pub const PROCESSING: &str = "Processing";
    pub const ACCEPTED: &str = "Accepted";
    pub const WRONG_ANSWER: &str = "Wrong Answer";
    pub const TIME_LIMIT_EXCEEDED: &str = "Time Limit Exceeded";
    pub const COMPILATION_ERROR: &str = "Compilation Error";
    pub const INTERNAL_ERROR: &str = "Internal Error";
    pub const EXEC_FORMAT_ERROR: &str = "Exec Format Error";

    /// Prefix shared by all runtime error descriptions (`Runtime Error (SIGSEGV)`, ...)
    pub const RUNTIME_ERROR_PREFIX: &str = "Runtime Error";
}

// =============================================================================
// API
// =============================================================================

/// API base path
pub const API_BASE_PATH: &str = "/api/v1";

/// Header carrying the caller's user id (identity is resolved upstream)
pub const USER_ID_HEADER: &str = "x-user-id";

/// Header carrying the administrative token
pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// Header carrying the judge API token on outbound requests
pub const JUDGE_AUTH_HEADER: &str = "X-Auth-Token";

// =============================================================================
// VALIDATION
// =============================================================================

/// Maximum source code size in bytes (1 MB)
pub const MAX_SOURCE_CODE_SIZE: usize = 1024 * 1024;

//! Arbiter - Asynchronous Submission-Judging Coordinator
//!
//! This library provides the judging core of a programming-contest platform.
//! Submissions are fanned out as one execution request per test case to an
//! external Judge0-compatible service, whose asynchronous callbacks are
//! correlated back to waiting callers and aggregated into weighted scores.
//!
//! # Architecture
//!
//! - **Handlers**: HTTP request handlers (thin layer)
//! - **Coordinator**: waiters, tallies and the queue-mutex serializing writes
//! - **Scoring / Leaderboard**: pure aggregation
//! - **Judge**: outbound client for the execution service
//! - **Db / Storage**: datastore and source blob seams

pub mod config;
pub mod constants;
pub mod coordinator;
pub mod db;
pub mod error;
pub mod handlers;
pub mod judge;
pub mod leaderboard;
pub mod middleware;
pub mod models;
pub mod scoring;
pub mod state;
pub mod storage;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use coordinator::Coordinator;
pub use error::{AppError, AppResult};
pub use state::AppState;

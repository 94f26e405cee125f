//! Database module
//!
//! This module defines the `Datastore` seam the coordinator writes through,
//! its PostgreSQL implementation (repositories + migrations) and an in-memory
//! implementation.
//!
//! Neither implementation offers multi-statement transactions to callers;
//! conflicting writes are serialized by the coordinator's queue-mutex.

pub mod connection;
pub mod memory;
pub mod postgres;
pub mod repositories;

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{Challenge, Contest, Submission, TestResult},
};

pub use connection::*;
pub use memory::MemoryDatastore;
pub use postgres::PgDatastore;

/// Run database migrations
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Persistence operations used by the judging core
#[async_trait]
pub trait Datastore: Send + Sync {
    /// Contest with its ordered challenge list
    async fn find_contest(&self, id: &Uuid) -> AppResult<Option<Contest>>;

    /// Challenge with its ordered tests and subtasks
    async fn find_challenge(&self, id: &Uuid) -> AppResult<Option<Challenge>>;

    /// Usernames for the given user ids; unknown ids are absent from the map
    async fn find_usernames(&self, ids: &[Uuid]) -> AppResult<HashMap<Uuid, String>>;

    /// Next free internal submission id. Callers must hold the submissions domain.
    async fn next_submission_id(&self) -> AppResult<i64>;

    async fn insert_submission(&self, submission: &Submission) -> AppResult<()>;

    async fn find_submission(&self, id: i64) -> AppResult<Option<Submission>>;

    async fn find_submission_by_token(&self, token: &Uuid) -> AppResult<Option<Submission>>;

    async fn update_score(&self, id: i64, score: f64) -> AppResult<()>;

    /// Delete one submission together with its results
    async fn delete_submission(&self, id: i64) -> AppResult<()>;

    async fn list_contest_submissions(&self, contest_id: &Uuid) -> AppResult<Vec<Submission>>;

    /// Insert or replace the result for `(submission_id, test_index)`
    async fn upsert_result(&self, result: &TestResult) -> AppResult<()>;

    async fn find_result(&self, submission_id: i64, test_index: i32)
        -> AppResult<Option<TestResult>>;

    async fn list_results(&self, submission_id: i64) -> AppResult<Vec<TestResult>>;

    /// Delete every submission and result
    async fn reset(&self) -> AppResult<()>;
}

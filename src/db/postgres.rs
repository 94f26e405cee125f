//! PostgreSQL datastore

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{Challenge, Contest, Submission, TestResult},
};

use super::{
    repositories::{
        ChallengeRepository, ContestRepository, ResultRepository, SubmissionRepository,
        UserRepository,
    },
    Datastore,
};

/// Datastore backed by a PostgreSQL pool
#[derive(Clone)]
pub struct PgDatastore {
    pool: PgPool,
}

impl PgDatastore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Datastore for PgDatastore {
    async fn find_contest(&self, id: &Uuid) -> AppResult<Option<Contest>> {
        ContestRepository::find_by_id(&self.pool, id).await
    }

    async fn find_challenge(&self, id: &Uuid) -> AppResult<Option<Challenge>> {
        ChallengeRepository::find_by_id(&self.pool, id).await
    }

    async fn find_usernames(&self, ids: &[Uuid]) -> AppResult<HashMap<Uuid, String>> {
        let users = UserRepository::find_many(&self.pool, ids).await?;
        Ok(users.into_iter().map(|u| (u.id, u.username)).collect())
    }

    async fn next_submission_id(&self) -> AppResult<i64> {
        SubmissionRepository::next_id(&self.pool).await
    }

    async fn insert_submission(&self, submission: &Submission) -> AppResult<()> {
        SubmissionRepository::create(&self.pool, submission).await
    }

    async fn find_submission(&self, id: i64) -> AppResult<Option<Submission>> {
        SubmissionRepository::find_by_id(&self.pool, id).await
    }

    async fn find_submission_by_token(&self, token: &Uuid) -> AppResult<Option<Submission>> {
        SubmissionRepository::find_by_token(&self.pool, token).await
    }

    async fn update_score(&self, id: i64, score: f64) -> AppResult<()> {
        SubmissionRepository::update_score(&self.pool, id, score).await
    }

    async fn delete_submission(&self, id: i64) -> AppResult<()> {
        SubmissionRepository::delete(&self.pool, id).await
    }

    async fn list_contest_submissions(&self, contest_id: &Uuid) -> AppResult<Vec<Submission>> {
        SubmissionRepository::list_by_contest(&self.pool, contest_id).await
    }

    async fn upsert_result(&self, result: &TestResult) -> AppResult<()> {
        ResultRepository::upsert(&self.pool, result).await
    }

    async fn find_result(
        &self,
        submission_id: i64,
        test_index: i32,
    ) -> AppResult<Option<TestResult>> {
        ResultRepository::find(&self.pool, submission_id, test_index).await
    }

    async fn list_results(&self, submission_id: i64) -> AppResult<Vec<TestResult>> {
        ResultRepository::list_by_submission(&self.pool, submission_id).await
    }

    async fn reset(&self) -> AppResult<()> {
        SubmissionRepository::delete_all(&self.pool).await
    }
}

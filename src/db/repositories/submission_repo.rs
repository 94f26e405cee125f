//! Submission repository

use sqlx::PgPool;
use uuid::Uuid;

use crate::{error::AppResult, models::Submission};

/// Repository for submission database operations
pub struct SubmissionRepository;

impl SubmissionRepository {
    /// Next internal id (max + 1). Not atomic on its own; callers serialize.
    pub async fn next_id(pool: &PgPool) -> AppResult<i64> {
        let id: i64 = sqlx::query_scalar(r#"SELECT COALESCE(MAX(id), 0) + 1 FROM submissions"#)
            .fetch_one(pool)
            .await?;

        Ok(id)
    }

    /// Create a new pending submission
    pub async fn create(pool: &PgPool, submission: &Submission) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO submissions (
                id, token, user_id, contest_id, challenge_id,
                language_id, score, dispatched_at, submitted_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(submission.id)
        .bind(submission.token)
        .bind(submission.user_id)
        .bind(submission.contest_id)
        .bind(submission.challenge_id)
        .bind(submission.language_id)
        .bind(submission.score)
        .bind(submission.dispatched_at)
        .bind(submission.submitted_at)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Find submission by internal ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> AppResult<Option<Submission>> {
        let submission = sqlx::query_as::<_, Submission>(r#"SELECT * FROM submissions WHERE id = $1"#)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(submission)
    }

    /// Find submission by its external token
    pub async fn find_by_token(pool: &PgPool, token: &Uuid) -> AppResult<Option<Submission>> {
        let submission =
            sqlx::query_as::<_, Submission>(r#"SELECT * FROM submissions WHERE token = $1"#)
                .bind(token)
                .fetch_optional(pool)
                .await?;

        Ok(submission)
    }

    /// Record the final score
    pub async fn update_score(pool: &PgPool, id: i64, score: f64) -> AppResult<()> {
        sqlx::query(r#"UPDATE submissions SET score = $2 WHERE id = $1"#)
            .bind(id)
            .bind(score)
            .execute(pool)
            .await?;

        Ok(())
    }

    /// All submissions of a contest
    pub async fn list_by_contest(pool: &PgPool, contest_id: &Uuid) -> AppResult<Vec<Submission>> {
        let submissions = sqlx::query_as::<_, Submission>(
            r#"SELECT * FROM submissions WHERE contest_id = $1 ORDER BY id"#,
        )
        .bind(contest_id)
        .fetch_all(pool)
        .await?;

        Ok(submissions)
    }

    /// Delete one submission (results cascade)
    pub async fn delete(pool: &PgPool, id: i64) -> AppResult<()> {
        sqlx::query(r#"DELETE FROM submissions WHERE id = $1"#)
            .bind(id)
            .execute(pool)
            .await?;

        Ok(())
    }

    /// Delete every submission (results cascade)
    pub async fn delete_all(pool: &PgPool) -> AppResult<()> {
        sqlx::query(r#"DELETE FROM submissions"#).execute(pool).await?;

        Ok(())
    }
}

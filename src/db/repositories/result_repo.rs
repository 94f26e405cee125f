//! Per-test result repository

use sqlx::PgPool;

use crate::{error::AppResult, models::TestResult};

/// Repository for test result database operations
pub struct ResultRepository;

impl ResultRepository {
    /// Save a test result, replacing any earlier row for the same test
    pub async fn upsert(pool: &PgPool, result: &TestResult) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO results (
                submission_id, test_index, token, time, memory,
                status, compile_output, received_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (submission_id, test_index) DO UPDATE SET
                token = EXCLUDED.token,
                time = EXCLUDED.time,
                memory = EXCLUDED.memory,
                status = EXCLUDED.status,
                compile_output = EXCLUDED.compile_output,
                received_at = EXCLUDED.received_at
            "#,
        )
        .bind(result.submission_id)
        .bind(result.test_index)
        .bind(&result.token)
        .bind(result.time)
        .bind(result.memory)
        .bind(&result.status)
        .bind(&result.compile_output)
        .bind(result.received_at)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Find the result of one test
    pub async fn find(
        pool: &PgPool,
        submission_id: i64,
        test_index: i32,
    ) -> AppResult<Option<TestResult>> {
        let result = sqlx::query_as::<_, TestResult>(
            r#"SELECT * FROM results WHERE submission_id = $1 AND test_index = $2"#,
        )
        .bind(submission_id)
        .bind(test_index)
        .fetch_optional(pool)
        .await?;

        Ok(result)
    }

    /// All results of a submission, by test index
    pub async fn list_by_submission(pool: &PgPool, submission_id: i64) -> AppResult<Vec<TestResult>> {
        let results = sqlx::query_as::<_, TestResult>(
            r#"SELECT * FROM results WHERE submission_id = $1 ORDER BY test_index"#,
        )
        .bind(submission_id)
        .fetch_all(pool)
        .await?;

        Ok(results)
    }
}

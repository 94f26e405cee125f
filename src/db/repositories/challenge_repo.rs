//! Challenge repository

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{Challenge, Subtask, SubtaskMode, TestCase},
};

#[derive(sqlx::FromRow)]
struct ChallengeRow {
    id: Uuid,
    contest_id: Uuid,
    name: String,
    cpu_time_limit: Option<f64>,
    memory_limit_kb: Option<i64>,
}

#[derive(sqlx::FromRow)]
struct SubtaskRow {
    name: String,
    weight: f64,
    mode: String,
    test_ids: Vec<i32>,
}

/// Repository for challenge database operations
pub struct ChallengeRepository;

impl ChallengeRepository {
    /// Find challenge by ID with its tests and subtasks
    pub async fn find_by_id(pool: &PgPool, id: &Uuid) -> AppResult<Option<Challenge>> {
        let Some(row) = sqlx::query_as::<_, ChallengeRow>(
            r#"
            SELECT id, contest_id, name, cpu_time_limit, memory_limit_kb
            FROM challenges WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?
        else {
            return Ok(None);
        };

        let tests = sqlx::query_as::<_, TestCase>(
            r#"
            SELECT id, input, expected_output
            FROM test_cases
            WHERE challenge_id = $1
            ORDER BY position
            "#,
        )
        .bind(id)
        .fetch_all(pool)
        .await?;

        let subtasks = sqlx::query_as::<_, SubtaskRow>(
            r#"
            SELECT name, weight, mode, test_ids
            FROM subtasks
            WHERE challenge_id = $1
            ORDER BY position
            "#,
        )
        .bind(id)
        .fetch_all(pool)
        .await?
        .into_iter()
        .map(|s| {
            let mode = SubtaskMode::parse(&s.mode).ok_or_else(|| {
                AppError::Database(format!("unknown subtask mode '{}'", s.mode))
            })?;
            Ok(Subtask {
                name: s.name,
                weight: s.weight,
                mode,
                test_ids: s.test_ids,
            })
        })
        .collect::<AppResult<Vec<_>>>()?;

        Ok(Some(Challenge {
            id: row.id,
            contest_id: row.contest_id,
            name: row.name,
            cpu_time_limit: row.cpu_time_limit,
            memory_limit_kb: row.memory_limit_kb,
            tests,
            subtasks,
        }))
    }
}

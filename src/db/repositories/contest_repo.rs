//! Contest repository

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{Contest, ContestChallenge},
};

#[derive(sqlx::FromRow)]
struct ContestRow {
    id: Uuid,
    title: String,
    starts_at: DateTime<Utc>,
    ends_at: DateTime<Utc>,
}

/// Repository for contest database operations
pub struct ContestRepository;

impl ContestRepository {
    /// Find contest by ID, with its challenges in declared order
    pub async fn find_by_id(pool: &PgPool, id: &Uuid) -> AppResult<Option<Contest>> {
        let Some(row) = sqlx::query_as::<_, ContestRow>(
            r#"SELECT id, title, starts_at, ends_at FROM contests WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?
        else {
            return Ok(None);
        };

        let challenges = sqlx::query_as::<_, ContestChallenge>(
            r#"
            SELECT id AS challenge_id, points
            FROM challenges
            WHERE contest_id = $1
            ORDER BY position
            "#,
        )
        .bind(id)
        .fetch_all(pool)
        .await?;

        Ok(Some(Contest {
            id: row.id,
            title: row.title,
            starts_at: row.starts_at,
            ends_at: row.ends_at,
            challenges,
        }))
    }
}

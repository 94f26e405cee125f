//! User repository

use sqlx::PgPool;
use uuid::Uuid;

use crate::{error::AppResult, models::User};

/// Repository for user lookups
pub struct UserRepository;

impl UserRepository {
    /// Find users by a set of IDs
    pub async fn find_many(pool: &PgPool, ids: &[Uuid]) -> AppResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(r#"SELECT id, username FROM users WHERE id = ANY($1)"#)
            .bind(ids)
            .fetch_all(pool)
            .await?;

        Ok(users)
    }
}

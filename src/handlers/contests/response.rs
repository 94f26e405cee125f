//! Contest response DTOs

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::leaderboard::{Leaderboard, LeaderboardRow};

/// Leaderboard entry
#[derive(Debug, Serialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub user_id: Uuid,
    pub username: String,
    pub total: f64,
    /// Best score per challenge, in `LeaderboardResponse::challenge_ids` order
    pub challenge_scores: Vec<Option<f64>>,
}

impl From<LeaderboardRow> for LeaderboardEntry {
    fn from(row: LeaderboardRow) -> Self {
        Self {
            rank: row.rank,
            user_id: row.user_id,
            username: row.username,
            total: row.total,
            challenge_scores: row.breakdown,
        }
    }
}

/// Leaderboard response
#[derive(Debug, Serialize)]
pub struct LeaderboardResponse {
    pub contest_id: Uuid,
    pub challenge_ids: Vec<Uuid>,
    pub entries: Vec<LeaderboardEntry>,
    pub total: usize,
    pub updated_at: DateTime<Utc>,
}

impl From<Leaderboard> for LeaderboardResponse {
    fn from(board: Leaderboard) -> Self {
        let entries: Vec<LeaderboardEntry> = board.rows.into_iter().map(Into::into).collect();
        Self {
            contest_id: board.contest_id,
            challenge_ids: board.challenge_ids,
            total: entries.len(),
            entries,
            updated_at: Utc::now(),
        }
    }
}

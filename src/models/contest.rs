//! Contest model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Contest as seen by the judging core
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contest {
    pub id: Uuid,
    pub title: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    /// Challenges in their declared display order
    pub challenges: Vec<ContestChallenge>,
}

impl Contest {
    /// Get the status of the contest at `now`
    pub fn status_at(&self, now: DateTime<Utc>) -> ContestStatus {
        if now < self.starts_at {
            ContestStatus::Upcoming
        } else if now <= self.ends_at {
            ContestStatus::Ongoing
        } else {
            ContestStatus::Ended
        }
    }

    /// Check if the contest accepts submissions right now
    pub fn is_open(&self) -> bool {
        self.status_at(Utc::now()) == ContestStatus::Ongoing
    }

    /// Point value the contest assigns to a challenge, if it defines one
    pub fn points_for(&self, challenge_id: &Uuid) -> Option<f64> {
        self.challenges
            .iter()
            .find(|c| c.challenge_id == *challenge_id)
            .and_then(|c| c.points)
    }
}

/// Contest-challenge association
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize, Deserialize)]
pub struct ContestChallenge {
    pub challenge_id: Uuid,
    pub points: Option<f64>,
}

/// Contest status enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContestStatus {
    Upcoming,
    Ongoing,
    Ended,
}

impl std::fmt::Display for ContestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Upcoming => write!(f, "upcoming"),
            Self::Ongoing => write!(f, "ongoing"),
            Self::Ended => write!(f, "ended"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn contest(starts_at: DateTime<Utc>, ends_at: DateTime<Utc>) -> Contest {
        Contest {
            id: Uuid::new_v4(),
            title: "Round 1".to_string(),
            starts_at,
            ends_at,
            challenges: vec![],
        }
    }

    #[test]
    fn test_status_window() {
        let now = Utc::now();
        let c = contest(now - Duration::hours(1), now + Duration::hours(1));

        assert_eq!(c.status_at(now - Duration::hours(2)), ContestStatus::Upcoming);
        assert_eq!(c.status_at(now), ContestStatus::Ongoing);
        assert_eq!(c.status_at(now + Duration::hours(2)), ContestStatus::Ended);
        assert!(c.is_open());
    }

    #[test]
    fn test_points_for() {
        let now = Utc::now();
        let weighted = Uuid::new_v4();
        let unweighted = Uuid::new_v4();
        let mut c = contest(now, now);
        c.challenges = vec![
            ContestChallenge { challenge_id: weighted, points: Some(250.0) },
            ContestChallenge { challenge_id: unweighted, points: None },
        ];

        assert_eq!(c.points_for(&weighted), Some(250.0));
        assert_eq!(c.points_for(&unweighted), None);
        assert_eq!(c.points_for(&Uuid::new_v4()), None);
    }
}

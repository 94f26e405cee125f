//! Contest leaderboard aggregation

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;
use uuid::Uuid;

use crate::models::{Contest, Submission};

/// One participant's standing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardRow {
    /// 1-based; participants with equal totals share a rank
    pub rank: usize,
    pub user_id: Uuid,
    pub username: String,
    pub total: f64,
    /// Best score per challenge, aligned with `Leaderboard::challenge_ids`
    pub breakdown: Vec<Option<f64>>,
}

/// Ranked standings of a contest
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Leaderboard {
    pub contest_id: Uuid,
    pub challenge_ids: Vec<Uuid>,
    pub rows: Vec<LeaderboardRow>,
}

/// Rank participants by the sum of their best score per challenge.
///
/// Unscored submissions never contribute, but their owners still get a row.
/// Submissions to challenges outside the contest are ignored.
pub fn rank(
    contest: &Contest,
    submissions: &[Submission],
    usernames: &HashMap<Uuid, String>,
) -> Leaderboard {
    let challenge_ids: Vec<Uuid> = contest.challenges.iter().map(|c| c.challenge_id).collect();
    let column: HashMap<Uuid, usize> = challenge_ids
        .iter()
        .enumerate()
        .map(|(i, id)| (*id, i))
        .collect();

    let mut best: HashMap<Uuid, Vec<Option<f64>>> = HashMap::new();
    for submission in submissions.iter().filter(|s| s.contest_id == contest.id) {
        let Some(&col) = column.get(&submission.challenge_id) else {
            continue;
        };
        let cells = best
            .entry(submission.user_id)
            .or_insert_with(|| vec![None; challenge_ids.len()]);

        if let Some(score) = submission.score {
            cells[col] = Some(cells[col].map_or(score, |current| current.max(score)));
        }
    }

    let mut rows: Vec<LeaderboardRow> = best
        .into_iter()
        .map(|(user_id, breakdown)| LeaderboardRow {
            rank: 0,
            user_id,
            username: usernames
                .get(&user_id)
                .cloned()
                .unwrap_or_else(|| user_id.to_string()),
            total: breakdown.iter().flatten().sum(),
            breakdown,
        })
        .collect();

    rows.sort_by(|a, b| {
        b.total
            .partial_cmp(&a.total)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.username.cmp(&b.username))
    });

    let mut previous: Option<(f64, usize)> = None;
    for (position, row) in rows.iter_mut().enumerate() {
        row.rank = match previous {
            Some((total, rank)) if total == row.total => rank,
            _ => position + 1,
        };
        previous = Some((row.total, row.rank));
    }

    Leaderboard {
        contest_id: contest.id,
        challenge_ids,
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ContestChallenge;
    use chrono::{Duration, Utc};

    struct Fixture {
        contest: Contest,
        next_id: i64,
        submissions: Vec<Submission>,
    }

    impl Fixture {
        fn new(challenges: usize) -> Self {
            let now = Utc::now();
            Self {
                contest: Contest {
                    id: Uuid::new_v4(),
                    title: "Weekly".to_string(),
                    starts_at: now - Duration::hours(1),
                    ends_at: now + Duration::hours(1),
                    challenges: (0..challenges)
                        .map(|_| ContestChallenge {
                            challenge_id: Uuid::new_v4(),
                            points: None,
                        })
                        .collect(),
                },
                next_id: 1,
                submissions: Vec::new(),
            }
        }

        fn challenge(&self, i: usize) -> Uuid {
            self.contest.challenges[i].challenge_id
        }

        fn submit(&mut self, user_id: Uuid, challenge: usize, score: Option<f64>) {
            self.submissions.push(Submission {
                id: self.next_id,
                token: Uuid::new_v4(),
                user_id,
                contest_id: self.contest.id,
                challenge_id: self.challenge(challenge),
                language_id: 71,
                score,
                dispatched_at: 0,
                submitted_at: Utc::now(),
            });
            self.next_id += 1;
        }
    }

    #[test]
    fn test_best_score_per_challenge_is_summed() {
        let mut f = Fixture::new(2);
        let alice = Uuid::new_v4();
        f.submit(alice, 0, Some(40.0));
        f.submit(alice, 0, Some(70.0));
        f.submit(alice, 0, None);
        f.submit(alice, 1, Some(25.0));

        let board = rank(&f.contest, &f.submissions, &HashMap::from([(alice, "alice".to_string())]));

        assert_eq!(board.rows.len(), 1);
        assert_eq!(board.rows[0].total, 95.0);
        assert_eq!(board.rows[0].breakdown, vec![Some(70.0), Some(25.0)]);
    }

    #[test]
    fn test_ties_are_ordered_by_username() {
        let mut f = Fixture::new(1);
        let (zed, amy, bob) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        f.submit(zed, 0, Some(50.0));
        f.submit(amy, 0, Some(50.0));
        f.submit(bob, 0, Some(80.0));

        let names = HashMap::from([
            (zed, "zed".to_string()),
            (amy, "amy".to_string()),
            (bob, "bob".to_string()),
        ]);
        let board = rank(&f.contest, &f.submissions, &names);

        let order: Vec<(&str, usize)> = board
            .rows
            .iter()
            .map(|r| (r.username.as_str(), r.rank))
            .collect();
        assert_eq!(order, vec![("bob", 1), ("amy", 2), ("zed", 2)]);
    }

    #[test]
    fn test_breakdown_follows_contest_order_and_unscored_users_appear() {
        let mut f = Fixture::new(3);
        let (solver, pending) = (Uuid::new_v4(), Uuid::new_v4());
        f.submit(solver, 2, Some(100.0));
        f.submit(pending, 1, None);

        let board = rank(&f.contest, &f.submissions, &HashMap::new());

        assert_eq!(
            board.challenge_ids,
            vec![f.challenge(0), f.challenge(1), f.challenge(2)]
        );
        assert_eq!(board.rows[0].user_id, solver);
        assert_eq!(board.rows[0].breakdown, vec![None, None, Some(100.0)]);
        assert_eq!(board.rows[0].username, solver.to_string());

        assert_eq!(board.rows[1].user_id, pending);
        assert_eq!(board.rows[1].total, 0.0);
        assert_eq!(board.rows[1].breakdown, vec![None, None, None]);
    }
}

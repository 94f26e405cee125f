//! In-memory datastore
//!
//! Used for local runs (`STORAGE_BACKEND=memory`) and tests. Contests,
//! challenges and users are seeded through the inherent `insert_*` methods,
//! standing in for the authoring side of the platform.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{Challenge, Contest, Submission, TestResult, User},
};

use super::Datastore;

#[derive(Default)]
struct Tables {
    contests: HashMap<Uuid, Contest>,
    challenges: HashMap<Uuid, Challenge>,
    users: HashMap<Uuid, User>,
    submissions: BTreeMap<i64, Submission>,
    results: BTreeMap<(i64, i32), TestResult>,
}

/// Datastore backed by process memory
#[derive(Default)]
pub struct MemoryDatastore {
    tables: Mutex<Tables>,
    score_updates: AtomicUsize,
}

impl MemoryDatastore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn insert_contest(&self, contest: Contest) {
        self.tables().contests.insert(contest.id, contest);
    }

    pub fn insert_challenge(&self, challenge: Challenge) {
        self.tables().challenges.insert(challenge.id, challenge);
    }

    pub fn insert_user(&self, user: User) {
        self.tables().users.insert(user.id, user);
    }

    /// Number of score writes since creation
    pub fn score_updates(&self) -> usize {
        self.score_updates.load(Ordering::SeqCst)
    }

    /// Number of stored results across all submissions
    pub fn result_count(&self) -> usize {
        self.tables().results.len()
    }
}

#[async_trait]
impl Datastore for MemoryDatastore {
    async fn find_contest(&self, id: &Uuid) -> AppResult<Option<Contest>> {
        Ok(self.tables().contests.get(id).cloned())
    }

    async fn find_challenge(&self, id: &Uuid) -> AppResult<Option<Challenge>> {
        Ok(self.tables().challenges.get(id).cloned())
    }

    async fn find_usernames(&self, ids: &[Uuid]) -> AppResult<HashMap<Uuid, String>> {
        let tables = self.tables();
        Ok(ids
            .iter()
            .filter_map(|id| tables.users.get(id).map(|u| (*id, u.username.clone())))
            .collect())
    }

    async fn next_submission_id(&self) -> AppResult<i64> {
        let tables = self.tables();
        Ok(tables.submissions.keys().next_back().map_or(1, |id| id + 1))
    }

    async fn insert_submission(&self, submission: &Submission) -> AppResult<()> {
        let mut tables = self.tables();
        if tables.submissions.contains_key(&submission.id) {
            return Err(AppError::Database(format!(
                "duplicate submission id {}",
                submission.id
            )));
        }
        tables.submissions.insert(submission.id, submission.clone());
        Ok(())
    }

    async fn find_submission(&self, id: i64) -> AppResult<Option<Submission>> {
        Ok(self.tables().submissions.get(&id).cloned())
    }

    async fn find_submission_by_token(&self, token: &Uuid) -> AppResult<Option<Submission>> {
        Ok(self
            .tables()
            .submissions
            .values()
            .find(|s| s.token == *token)
            .cloned())
    }

    async fn update_score(&self, id: i64, score: f64) -> AppResult<()> {
        let mut tables = self.tables();
        let submission = tables
            .submissions
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("Submission not found".to_string()))?;
        submission.score = Some(score);
        self.score_updates.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn delete_submission(&self, id: i64) -> AppResult<()> {
        let mut tables = self.tables();
        tables.submissions.remove(&id);
        tables.results.retain(|(submission_id, _), _| *submission_id != id);
        Ok(())
    }

    async fn list_contest_submissions(&self, contest_id: &Uuid) -> AppResult<Vec<Submission>> {
        Ok(self
            .tables()
            .submissions
            .values()
            .filter(|s| s.contest_id == *contest_id)
            .cloned()
            .collect())
    }

    async fn upsert_result(&self, result: &TestResult) -> AppResult<()> {
        self.tables()
            .results
            .insert((result.submission_id, result.test_index), result.clone());
        Ok(())
    }

    async fn find_result(
        &self,
        submission_id: i64,
        test_index: i32,
    ) -> AppResult<Option<TestResult>> {
        Ok(self.tables().results.get(&(submission_id, test_index)).cloned())
    }

    async fn list_results(&self, submission_id: i64) -> AppResult<Vec<TestResult>> {
        Ok(self
            .tables()
            .results
            .range((submission_id, i32::MIN)..=(submission_id, i32::MAX))
            .map(|(_, r)| r.clone())
            .collect())
    }

    async fn reset(&self) -> AppResult<()> {
        let mut tables = self.tables();
        tables.submissions.clear();
        tables.results.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn result(submission_id: i64, test_index: i32, status: &str) -> TestResult {
        TestResult {
            submission_id,
            test_index,
            token: None,
            time: Some(0.01),
            memory: Some(1024),
            status: status.to_string(),
            compile_output: None,
            received_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_upsert_result_replaces_existing_row() {
        let store = MemoryDatastore::new();
        store.upsert_result(&result(1, 0, "Wrong Answer")).await.unwrap();
        store.upsert_result(&result(1, 0, "Accepted")).await.unwrap();
        store.upsert_result(&result(2, 0, "Accepted")).await.unwrap();

        let rows = store.list_results(1).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].status, "Accepted");
        assert_eq!(store.result_count(), 2);
    }

    #[tokio::test]
    async fn test_next_submission_id_is_sequential() {
        let store = MemoryDatastore::new();
        assert_eq!(store.next_submission_id().await.unwrap(), 1);

        let submission = Submission {
            id: 1,
            token: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            contest_id: Uuid::new_v4(),
            challenge_id: Uuid::new_v4(),
            language_id: 71,
            score: None,
            dispatched_at: 0,
            submitted_at: Utc::now(),
        };
        store.insert_submission(&submission).await.unwrap();
        assert_eq!(store.next_submission_id().await.unwrap(), 2);
        assert!(store.insert_submission(&submission).await.is_err());

        store.reset().await.unwrap();
        assert!(store.find_submission(1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_submission_drops_its_results() {
        let store = MemoryDatastore::new();
        let submission = Submission {
            id: 4,
            token: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            contest_id: Uuid::new_v4(),
            challenge_id: Uuid::new_v4(),
            language_id: 54,
            score: None,
            dispatched_at: 0,
            submitted_at: Utc::now(),
        };
        store.insert_submission(&submission).await.unwrap();
        store.upsert_result(&result(4, 0, "Accepted")).await.unwrap();
        store.upsert_result(&result(4, 1, "Accepted")).await.unwrap();
        store.upsert_result(&result(5, 0, "Accepted")).await.unwrap();

        store.delete_submission(4).await.unwrap();

        assert!(store.find_submission(4).await.unwrap().is_none());
        assert!(store.list_results(4).await.unwrap().is_empty());
        assert_eq!(store.result_count(), 1);
    }
}

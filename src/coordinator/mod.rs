//! Submission-judging coordinator
//!
//! Owns everything that correlates an accepted submission with the judge's
//! asynchronous verdicts: the per-test and per-submission waiters, the
//! outstanding-callback tallies and the queue-mutex serializing datastore
//! writes. One instance is shared by all request handlers.
//!
//! Readers register their waiter before they look at the datastore, and
//! writers persist before they notify, so a wake-up can never fall between
//! the two.

pub mod queue_mutex;
pub mod waiters;


use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use futures::future::join_all;
use uuid::Uuid;

use crate::{
    config::Config,
    constants::MAX_SOURCE_CODE_SIZE,
    db::Datastore,
    error::{AppError, AppResult},
    judge::{self, CallbackPayload, ExecutionRequest, JudgeClient},
    leaderboard::{self, Leaderboard},
    models::{Challenge, Submission, TestResult},
    scoring,
    storage::{self, SourceStore},
    utils::secrets_match,
};

pub use queue_mutex::{QueueMutex, ResourceDomain};
pub use waiters::{Waiter, WaiterMap};

/// Values the coordinator needs from configuration
#[derive(Debug, Clone)]
pub struct CoordinatorSettings {
    pub callback_base_url: String,
    pub callback_secret: String,
    pub default_cpu_time_limit: f64,
    pub default_memory_limit_kb: i64,
    pub default_challenge_points: f64,
}

impl CoordinatorSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            callback_base_url: config.judge.callback_base_url.clone(),
            callback_secret: config.judge.callback_secret.clone(),
            default_cpu_time_limit: config.judge.default_cpu_time_limit,
            default_memory_limit_kb: config.judge.default_memory_limit_kb,
            default_challenge_points: config.scoring.default_challenge_points,
        }
    }
}

/// A submission as handed in by a participant
#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub contest_id: Uuid,
    pub challenge_id: Uuid,
    pub language_id: i32,
    pub user_id: Uuid,
    pub source: Vec<u8>,
}

/// Handle returned once a submission has been persisted and dispatched
pub struct SubmissionReceipt {
    pub token: Uuid,
    pub submission_id: i64,
    /// Resolves with the final score once every test has reported
    pub result: ScoreWaiter,
}

/// Pending final score of one submission
pub struct ScoreWaiter(Waiter<i64, f64>);

impl ScoreWaiter {
    pub async fn wait(self) -> AppResult<f64> {
        self.0.wait().await.ok_or_else(abandoned)
    }
}

fn abandoned() -> AppError {
    AppError::NotFound("Submission is no longer being judged".to_string())
}

/// Outstanding callbacks of one dispatched submission
#[derive(Debug)]
struct Tally {
    remaining: usize,
    received: HashSet<usize>,
    dispatched_at: i64,
}

enum TallyOutcome {
    Pending,
    Complete,
    /// No tally for this submission (restart, reset or a failed score write)
    Untracked,
}

pub struct Coordinator {
    store: Arc<dyn Datastore>,
    sources: Arc<dyn SourceStore>,
    judge: Arc<dyn JudgeClient>,
    settings: CoordinatorSettings,
    queue: QueueMutex<ResourceDomain>,
    test_waiters: WaiterMap<(i64, usize), TestResult>,
    score_waiters: WaiterMap<i64, f64>,
    tallies: Mutex<HashMap<i64, Tally>>,
}

fn guard<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Coordinator {
    pub fn new(
        store: Arc<dyn Datastore>,
        sources: Arc<dyn SourceStore>,
        judge: Arc<dyn JudgeClient>,
        settings: CoordinatorSettings,
    ) -> Self {
        Self {
            store,
            sources,
            judge,
            settings,
            queue: QueueMutex::new(),
            test_waiters: WaiterMap::new(),
            score_waiters: WaiterMap::new(),
            tallies: Mutex::new(HashMap::new()),
        }
    }

    // =========================================================================
    // Intake and dispatch
    // =========================================================================

    /// Validate, persist and dispatch a submission
    pub async fn submit(&self, new: NewSubmission) -> AppResult<SubmissionReceipt> {
        if new.source.is_empty() {
            return Err(AppError::Validation("Source code is required".to_string()));
        }
        if new.source.len() > MAX_SOURCE_CODE_SIZE {
            return Err(AppError::Validation(format!(
                "Source code exceeds {} bytes",
                MAX_SOURCE_CODE_SIZE
            )));
        }
        if new.language_id <= 0 {
            return Err(AppError::Validation("Language is required".to_string()));
        }
        let source_text = storage::source_text(new.source.clone())?;

        let contest = self
            .store
            .find_contest(&new.contest_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Contest not found".to_string()))?;

        let challenge = self
            .store
            .find_challenge(&new.challenge_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Challenge not found".to_string()))?;

        let listed = contest
            .challenges
            .iter()
            .any(|c| c.challenge_id == challenge.id);
        if challenge.contest_id != contest.id || !listed {
            return Err(AppError::Validation(
                "Challenge does not belong to this contest".to_string(),
            ));
        }

        if !contest.is_open() {
            return Err(AppError::Validation(format!(
                "Contest is {}",
                contest.status_at(Utc::now())
            )));
        }

        if challenge.tests.is_empty() {
            return Err(AppError::Validation(
                "Challenge has no test cases".to_string(),
            ));
        }

        let submission = self.persist(new).await?;

        // Both registrations must exist before the first callback can arrive
        let result = ScoreWaiter(self.score_waiters.register(submission.id));
        guard(&self.tallies).insert(
            submission.id,
            Tally {
                remaining: challenge.tests.len(),
                received: HashSet::new(),
                dispatched_at: submission.dispatched_at,
            },
        );

        if let Err(e) = self.dispatch(&submission, &challenge, &source_text).await {
            guard(&self.tallies).remove(&submission.id);
            drop(result);
            if let Err(cleanup) = self.withdraw(&submission).await {
                tracing::error!(
                    submission_id = submission.id,
                    error = %cleanup,
                    "Failed to withdraw rejected submission"
                );
            }
            self.score_waiters.abandon(&submission.id);
            return Err(e);
        }

        tracing::info!(
            submission_id = submission.id,
            token = %submission.token,
            tests = challenge.tests.len(),
            "Submission dispatched"
        );

        Ok(SubmissionReceipt {
            token: submission.token,
            submission_id: submission.id,
            result,
        })
    }

    /// Allocate identifiers, store the source and insert the unscored row
    async fn persist(&self, new: NewSubmission) -> AppResult<Submission> {
        let store = Arc::clone(&self.store);
        let sources = Arc::clone(&self.sources);

        self.queue
            .enqueue(ResourceDomain::Submissions, move || async move {
                let submission = Submission {
                    id: store.next_submission_id().await?,
                    token: Uuid::new_v4(),
                    user_id: new.user_id,
                    contest_id: new.contest_id,
                    challenge_id: new.challenge_id,
                    language_id: new.language_id,
                    score: None,
                    dispatched_at: Utc::now().timestamp_millis(),
                    submitted_at: Utc::now(),
                };

                sources.put(&submission.token, &new.source).await?;
                store.insert_submission(&submission).await?;
                Ok(submission)
            })
            .await
    }

    /// Remove a submission the judge refused, with any results that raced in
    async fn withdraw(&self, submission: &Submission) -> AppResult<()> {
        let store = Arc::clone(&self.store);
        let sources = Arc::clone(&self.sources);
        let queue = self.queue.clone();
        let (submission_id, token) = (submission.id, submission.token);

        self.queue
            .enqueue(ResourceDomain::Submissions, move || async move {
                queue
                    .enqueue(ResourceDomain::Results, move || async move {
                        store.delete_submission(submission_id).await?;
                        sources.delete(&token).await
                    })
                    .await
            })
            .await
    }

    /// Send one execution request per test case, all at once
    async fn dispatch(
        &self,
        submission: &Submission,
        challenge: &Challenge,
        source: &str,
    ) -> AppResult<()> {
        let requests: Vec<ExecutionRequest> = challenge
            .tests
            .iter()
            .enumerate()
            .map(|(index, test)| ExecutionRequest {
                source_code: source.to_string(),
                language_id: submission.language_id,
                stdin: test.input.clone(),
                expected_output: test.expected_output.clone(),
                cpu_time_limit: challenge
                    .cpu_time_limit
                    .unwrap_or(self.settings.default_cpu_time_limit),
                memory_limit: challenge
                    .memory_limit_kb
                    .unwrap_or(self.settings.default_memory_limit_kb),
                callback_url: judge::callback_url(
                    &self.settings.callback_base_url,
                    &self.settings.callback_secret,
                    submission.id,
                    index,
                    submission.dispatched_at,
                ),
            })
            .collect();

        let outcomes = join_all(requests.iter().map(|r| self.judge.submit(r))).await;

        let mut reasons: Vec<String> = Vec::new();
        for (index, outcome) in outcomes.into_iter().enumerate() {
            if let Err(rejection) = outcome {
                tracing::warn!(
                    submission_id = submission.id,
                    test_index = index,
                    status = ?rejection.status,
                    reasons = ?rejection.reasons,
                    "Judge rejected test dispatch"
                );
                for reason in rejection.reasons {
                    if !reasons.contains(&reason) {
                        reasons.push(reason);
                    }
                }
            }
        }

        if reasons.is_empty() {
            Ok(())
        } else {
            Err(AppError::JudgeDispatch { reasons })
        }
    }

    // =========================================================================
    // Callbacks and scoring
    // =========================================================================

    /// Record one per-test verdict reported by the judge
    pub async fn on_judge_callback(
        &self,
        secret: &str,
        submission_id: i64,
        test_index: usize,
        dispatched_at: i64,
        payload: CallbackPayload,
    ) -> AppResult<()> {
        if !secrets_match(secret, &self.settings.callback_secret) {
            tracing::warn!(submission_id, test_index, "Callback with invalid secret");
            return Err(AppError::Unauthorized);
        }

        let submission = self
            .store
            .find_submission(submission_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Submission not found".to_string()))?;

        if submission.dispatched_at != dispatched_at {
            return Err(AppError::StaleCallback(format!(
                "dispatch {} does not match submission {}",
                dispatched_at, submission_id
            )));
        }

        let challenge = self.challenge_of(&submission).await?;
        let index = i32::try_from(test_index)
            .ok()
            .filter(|_| test_index < challenge.tests.len())
            .ok_or_else(|| AppError::NotFound("Test index out of range".to_string()))?;

        let result = TestResult {
            submission_id,
            test_index: index,
            token: payload.token,
            time: payload.time,
            memory: payload.memory,
            status: payload.status.description,
            compile_output: payload.compile_output,
            received_at: Utc::now(),
        };

        // Checked again under the results domain: a reset or withdrawal may
        // have removed the submission since it was read above
        let store = Arc::clone(&self.store);
        let row = result.clone();
        self.queue
            .enqueue(ResourceDomain::Results, move || async move {
                let current = store.find_submission(row.submission_id).await?;
                if !current.is_some_and(|s| s.dispatched_at == dispatched_at) {
                    return Err(AppError::NotFound("Submission not found".to_string()));
                }
                store.upsert_result(&row).await
            })
            .await?;

        tracing::debug!(
            submission_id,
            test_index,
            status = %result.status,
            "Test result recorded"
        );
        self.test_waiters.notify(&(submission_id, test_index), result);

        match self.count_callback(submission_id, test_index, dispatched_at) {
            TallyOutcome::Pending => {}
            TallyOutcome::Complete => {
                self.score(&submission, &challenge).await?;
            }
            TallyOutcome::Untracked if submission.score.is_none() => {
                self.score_if_reported(&submission, &challenge).await?;
            }
            TallyOutcome::Untracked => {}
        }

        Ok(())
    }

    /// Count a callback at most once per test index
    fn count_callback(
        &self,
        submission_id: i64,
        test_index: usize,
        dispatched_at: i64,
    ) -> TallyOutcome {
        let mut tallies = guard(&self.tallies);
        let Some(tally) = tallies.get_mut(&submission_id) else {
            return TallyOutcome::Untracked;
        };
        if tally.dispatched_at != dispatched_at {
            return TallyOutcome::Untracked;
        }

        if tally.received.insert(test_index) {
            tally.remaining = tally.remaining.saturating_sub(1);
        }
        if tally.remaining > 0 {
            return TallyOutcome::Pending;
        }

        tallies.remove(&submission_id);
        TallyOutcome::Complete
    }

    /// Score an untracked submission once stored results cover every test
    async fn score_if_reported(
        &self,
        submission: &Submission,
        challenge: &Challenge,
    ) -> AppResult<Option<f64>> {
        let reported: HashSet<i32> = self
            .store
            .list_results(submission.id)
            .await?
            .iter()
            .map(|r| r.test_index)
            .collect();
        let covered = (0..challenge.tests.len())
            .all(|i| i32::try_from(i).is_ok_and(|i| reported.contains(&i)));
        if !covered {
            return Ok(None);
        }
        self.score(submission, challenge).await.map(Some)
    }

    /// Compute and persist the final score, then wake every score waiter.
    ///
    /// A submission that already has a score keeps it; waiters get the stored value.
    /// If scoring fails the waiters are released with an error; the next
    /// callback or score query for the submission scores it again.
    pub async fn score(&self, submission: &Submission, challenge: &Challenge) -> AppResult<f64> {
        match self.store_score(submission, challenge).await {
            Ok(score) => {
                tracing::info!(submission_id = submission.id, score, "Submission scored");
                self.score_waiters.notify(&submission.id, score);
                Ok(score)
            }
            Err(e) => {
                tracing::error!(
                    submission_id = submission.id,
                    error = %e,
                    "Failed to record score"
                );
                self.score_waiters.abandon(&submission.id);
                Err(e)
            }
        }
    }

    async fn store_score(&self, submission: &Submission, challenge: &Challenge) -> AppResult<f64> {
        let results = self.store.list_results(submission.id).await?;
        let points = self
            .store
            .find_contest(&submission.contest_id)
            .await?
            .and_then(|c| c.points_for(&submission.challenge_id))
            .unwrap_or(self.settings.default_challenge_points);
        let computed = scoring::final_score(challenge, &results, points);

        let store = Arc::clone(&self.store);
        let submission_id = submission.id;
        self.queue
            .enqueue(ResourceDomain::Submissions, move || async move {
                let current = store
                    .find_submission(submission_id)
                    .await?
                    .ok_or_else(|| AppError::NotFound("Submission not found".to_string()))?;
                match current.score {
                    Some(existing) => Ok(existing),
                    None => {
                        store.update_score(submission_id, computed).await?;
                        Ok(computed)
                    }
                }
            })
            .await
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Result of one test, waiting for its callback if it has not arrived yet
    pub async fn get_test(&self, token: &Uuid, test_index: usize) -> AppResult<TestResult> {
        let submission = self.submission_by_token(token).await?;
        let challenge = self.challenge_of(&submission).await?;
        let index = i32::try_from(test_index)
            .ok()
            .filter(|_| test_index < challenge.tests.len())
            .ok_or_else(|| AppError::NotFound("Test index out of range".to_string()))?;

        let waiter = self.test_waiters.register((submission.id, test_index));
        if let Some(result) = self.store.find_result(submission.id, index).await? {
            return Ok(result);
        }

        waiter.wait().await.ok_or_else(abandoned)
    }

    /// Final score, waiting for the last callback if needed
    pub async fn get_final_score(&self, token: &Uuid) -> AppResult<f64> {
        let submission = self.submission_by_token(token).await?;

        let waiter = self.score_waiters.register(submission.id);
        let current = self
            .store
            .find_submission(submission.id)
            .await?
            .ok_or_else(abandoned)?;
        if let Some(score) = current.score {
            return Ok(score);
        }

        // No tally after a restart or a failed score write
        if self.outstanding(submission.id).is_none() {
            let challenge = self.challenge_of(&current).await?;
            if let Some(score) = self.score_if_reported(&current, &challenge).await? {
                return Ok(score);
            }
        }

        ScoreWaiter(waiter).wait().await
    }

    /// Ranked standings of a contest
    pub async fn leaderboard(&self, contest_id: &Uuid) -> AppResult<Leaderboard> {
        let contest = self
            .store
            .find_contest(contest_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Contest not found".to_string()))?;

        let submissions = self.store.list_contest_submissions(contest_id).await?;
        let mut user_ids: Vec<Uuid> = submissions.iter().map(|s| s.user_id).collect();
        user_ids.sort_unstable();
        user_ids.dedup();
        let usernames = self.store.find_usernames(&user_ids).await?;

        Ok(leaderboard::rank(&contest, &submissions, &usernames))
    }

    // =========================================================================
    // Administration
    // =========================================================================

    /// Delete every submission, result and stored source, and forget all
    /// in-flight judging state. Pending waiters resolve as not found.
    pub async fn reset(&self) -> AppResult<()> {
        let store = Arc::clone(&self.store);
        let sources = Arc::clone(&self.sources);
        let queue = self.queue.clone();

        // Hold both domains so no queued write straddles the wipe
        self.queue
            .enqueue(ResourceDomain::Submissions, move || async move {
                queue
                    .enqueue(ResourceDomain::Results, move || async move {
                        store.reset().await?;
                        sources.clear().await
                    })
                    .await
            })
            .await?;

        guard(&self.tallies).clear();
        self.test_waiters.clear();
        self.score_waiters.clear();

        tracing::warn!("Judging state reset");
        Ok(())
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    async fn submission_by_token(&self, token: &Uuid) -> AppResult<Submission> {
        self.store
            .find_submission_by_token(token)
            .await?
            .ok_or_else(|| AppError::NotFound("Submission not found".to_string()))
    }

    async fn challenge_of(&self, submission: &Submission) -> AppResult<Challenge> {
        self.store
            .find_challenge(&submission.challenge_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Challenge not found".to_string()))
    }

    /// Callbacks still expected for a submission, `None` when untracked
    pub fn outstanding(&self, submission_id: i64) -> Option<usize> {
        guard(&self.tallies).get(&submission_id).map(|t| t.remaining)
    }
}

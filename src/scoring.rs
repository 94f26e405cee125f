//! Score aggregation
//!
//! Turns per-test verdicts into a raw score in `[0, 1]` and scales it by the
//! challenge's point value in the contest.

use serde::Serialize;

use crate::models::{Challenge, Subtask, SubtaskMode, TestResult};

/// Weight awarded by one subtask
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubtaskAward {
    pub name: String,
    pub mode: SubtaskMode,
    pub weight: f64,
    pub awarded: f64,
}

/// Accepted flag per test index; tests without a result count as failed
fn accepted_by_index(challenge: &Challenge, results: &[TestResult]) -> Vec<bool> {
    let mut accepted = vec![false; challenge.tests.len()];
    for result in results {
        if let Some(slot) = usize::try_from(result.test_index)
            .ok()
            .and_then(|i| accepted.get_mut(i))
        {
            *slot = result.is_accepted();
        }
    }
    accepted
}

fn award(challenge: &Challenge, subtask: &Subtask, accepted: &[bool]) -> f64 {
    let members = subtask.test_ids.len();
    if members == 0 {
        return 0.0;
    }

    // Unknown member ids can never pass
    let passed = subtask
        .test_ids
        .iter()
        .filter(|id| {
            challenge
                .index_of(**id)
                .is_some_and(|i| accepted.get(i).copied().unwrap_or(false))
        })
        .count();

    match subtask.mode {
        SubtaskMode::Batch if passed == members => subtask.weight,
        SubtaskMode::Batch => 0.0,
        SubtaskMode::Individual => subtask.weight * passed as f64 / members as f64,
    }
}

/// Per-subtask awards, in subtask order
pub fn subtask_awards(challenge: &Challenge, results: &[TestResult]) -> Vec<SubtaskAward> {
    let accepted = accepted_by_index(challenge, results);
    challenge
        .subtasks
        .iter()
        .map(|s| SubtaskAward {
            name: s.name.clone(),
            mode: s.mode,
            weight: s.weight,
            awarded: award(challenge, s, &accepted),
        })
        .collect()
}

/// Fraction of the challenge earned, in `[0, 1]`
pub fn raw_score(challenge: &Challenge, results: &[TestResult]) -> f64 {
    if challenge.subtasks.is_empty() {
        let accepted = accepted_by_index(challenge, results);
        if accepted.is_empty() {
            return 0.0;
        }
        let passed = accepted.iter().filter(|a| **a).count();
        return passed as f64 / accepted.len() as f64;
    }

    let awards = subtask_awards(challenge, results);
    let total_weight: f64 = awards.iter().map(|a| a.weight).sum();
    if total_weight <= 0.0 {
        return 0.0;
    }
    awards.iter().map(|a| a.awarded).sum::<f64>() / total_weight
}

/// Raw score scaled to the challenge's point value
pub fn final_score(challenge: &Challenge, results: &[TestResult], points: f64) -> f64 {
    raw_score(challenge, results) * points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TestCase;
    use chrono::Utc;
    use uuid::Uuid;

    fn challenge(tests: usize, subtasks: Vec<Subtask>) -> Challenge {
        Challenge {
            id: Uuid::new_v4(),
            contest_id: Uuid::new_v4(),
            name: "sum".to_string(),
            cpu_time_limit: None,
            memory_limit_kb: None,
            // Stable ids deliberately differ from positions
            tests: (0..tests)
                .map(|i| TestCase {
                    id: 100 + i as i32,
                    input: format!("{}", i),
                    expected_output: format!("{}", i),
                })
                .collect(),
            subtasks,
        }
    }

    fn results(statuses: &[&str]) -> Vec<TestResult> {
        statuses
            .iter()
            .enumerate()
            .map(|(i, status)| TestResult {
                submission_id: 1,
                test_index: i as i32,
                token: None,
                time: None,
                memory: None,
                status: status.to_string(),
                compile_output: None,
                received_at: Utc::now(),
            })
            .collect()
    }

    fn subtask(mode: SubtaskMode, weight: f64, test_ids: Vec<i32>) -> Subtask {
        Subtask {
            name: "group".to_string(),
            weight,
            mode,
            test_ids,
        }
    }

    #[test]
    fn test_plain_ratio_without_subtasks() {
        let c = challenge(3, vec![]);
        let score = final_score(&c, &results(&["Accepted", "Accepted", "Wrong Answer"]), 100.0);
        assert!((score - 66.666_666).abs() < 1e-3);
    }

    #[test]
    fn test_batch_is_all_or_nothing() {
        let c = challenge(
            4,
            vec![subtask(SubtaskMode::Batch, 40.0, vec![100, 101, 102, 103])],
        );

        let one_failed = results(&["Accepted", "Accepted", "Time Limit Exceeded", "Accepted"]);
        assert_eq!(subtask_awards(&c, &one_failed)[0].awarded, 0.0);

        let all_passed = results(&["Accepted"; 4]);
        assert_eq!(subtask_awards(&c, &all_passed)[0].awarded, 40.0);
        assert_eq!(raw_score(&c, &all_passed), 1.0);
    }

    #[test]
    fn test_individual_is_proportional() {
        let c = challenge(
            4,
            vec![subtask(SubtaskMode::Individual, 40.0, vec![100, 101, 102, 103])],
        );
        let r = results(&["Accepted", "Wrong Answer", "Accepted", "Accepted"]);
        assert_eq!(subtask_awards(&c, &r)[0].awarded, 30.0);
        assert_eq!(raw_score(&c, &r), 0.75);
    }

    #[test]
    fn test_mixed_subtasks_normalize_by_total_weight() {
        let c = challenge(
            4,
            vec![
                subtask(SubtaskMode::Batch, 40.0, vec![100, 101]),
                subtask(SubtaskMode::Individual, 60.0, vec![102, 103]),
            ],
        );
        let r = results(&["Accepted", "Accepted", "Accepted", "Runtime Error (NZEC)"]);
        assert!((final_score(&c, &r, 200.0) - 140.0).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_subtasks_score_zero() {
        let empty = challenge(2, vec![subtask(SubtaskMode::Individual, 10.0, vec![])]);
        assert_eq!(raw_score(&empty, &results(&["Accepted", "Accepted"])), 0.0);

        let weightless = challenge(2, vec![subtask(SubtaskMode::Batch, 0.0, vec![100, 101])]);
        assert_eq!(raw_score(&weightless, &results(&["Accepted", "Accepted"])), 0.0);
    }

    #[test]
    fn test_missing_results_count_as_failed() {
        let c = challenge(4, vec![]);
        assert_eq!(raw_score(&c, &results(&["Accepted", "Accepted"])), 0.5);
    }
}

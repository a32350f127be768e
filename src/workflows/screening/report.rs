use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{CandidateId, JobId};
use super::scoring::{EvaluationOutcome, OutcomeStatus, Tier};

/// Ranked result of one batch: exactly one outcome per submitted input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub job_id: JobId,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    /// Set when cancellation or the batch deadline cut the run short.
    pub interrupted: bool,
    pub outcomes: Vec<EvaluationOutcome>,
}

impl BatchReport {
    pub fn from_outcomes(
        job_id: JobId,
        started_at: DateTime<Utc>,
        mut outcomes: Vec<EvaluationOutcome>,
        interrupted: bool,
    ) -> Self {
        rank(&mut outcomes);
        Self {
            job_id,
            started_at,
            completed_at: Utc::now(),
            interrupted,
            outcomes,
        }
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn outcome(&self, candidate_id: &CandidateId) -> Option<&EvaluationOutcome> {
        self.outcomes
            .iter()
            .find(|outcome| &outcome.candidate_id == candidate_id)
    }

    /// Qualified outcomes in rank order, paired with their 1-based rank.
    pub fn qualified(&self) -> impl Iterator<Item = (usize, &EvaluationOutcome)> {
        self.outcomes
            .iter()
            .enumerate()
            .filter(|(_, outcome)| outcome.qualified)
            .map(|(index, outcome)| (index + 1, outcome))
    }

    pub fn summary(&self) -> BatchSummary {
        let mut summary = BatchSummary {
            total: self.outcomes.len(),
            ..BatchSummary::default()
        };

        for outcome in &self.outcomes {
            match outcome.status {
                OutcomeStatus::Complete => summary.complete += 1,
                OutcomeStatus::Partial => summary.partial += 1,
                OutcomeStatus::FailedExtraction => summary.failed_extraction += 1,
                OutcomeStatus::FailedEvaluation => summary.failed_evaluation += 1,
            }
            match outcome.tier {
                Some(Tier::StrongMatch) => summary.strong_match += 1,
                Some(Tier::ModerateMatch) => summary.moderate_match += 1,
                Some(Tier::WeakMatch) => summary.weak_match += 1,
                None => {}
            }
            if outcome.qualified {
                summary.qualified += 1;
            }
        }

        summary
    }
}

/// Sorts by overall score descending, unscored last, ties by input position.
pub(crate) fn rank(outcomes: &mut [EvaluationOutcome]) {
    outcomes.sort_by(|left, right| {
        compare_scores(left.overall_score, right.overall_score)
            .then_with(|| left.position.cmp(&right.position))
    });
}

fn compare_scores(left: Option<f64>, right: Option<f64>) -> Ordering {
    match (left, right) {
        (Some(left), Some(right)) => right.total_cmp(&left),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Batch totals per status and tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub complete: usize,
    pub partial: usize,
    pub failed_extraction: usize,
    pub failed_evaluation: usize,
    pub strong_match: usize,
    pub moderate_match: usize,
    pub weak_match: usize,
    pub qualified: usize,
    pub dispatched: usize,
}

impl BatchSummary {
    pub fn failed(&self) -> usize {
        self.failed_extraction + self.failed_evaluation
    }
}

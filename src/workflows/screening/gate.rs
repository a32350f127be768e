use serde::{Deserialize, Serialize};
use tracing::debug;

use super::domain::{CandidateContact, CandidateId, JobId};
use super::report::BatchReport;
use super::scoring::{EvaluationOutcome, Tier};

/// Share of the qualified pool kept by [`SelectionStrategy::StrongFirst`] when no
/// candidate reached the strong tier.
const FALLBACK_SHARE_DIVISOR: usize = 5;

/// How qualified candidates are narrowed before dispatch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionStrategy {
    /// Every qualified candidate.
    #[default]
    AllQualified,
    /// Qualified strong matches only; without any, the top fifth of the qualified pool.
    StrongFirst,
}

/// Scheduling request for one selected candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchRequest {
    pub job_id: JobId,
    pub candidate_id: CandidateId,
    /// 1-based position in the ranked report.
    pub rank: usize,
    pub tier: Tier,
    pub overall_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<CandidateContact>,
}

/// Chooses which ranked candidates move on to interview scheduling.
#[derive(Debug, Clone, Copy, Default)]
pub struct QualificationGate {
    strategy: SelectionStrategy,
}

impl QualificationGate {
    pub fn new(strategy: SelectionStrategy) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> SelectionStrategy {
        self.strategy
    }

    /// Qualified outcomes in rank order, narrowed by the strategy, then capped to `top_n`.
    pub fn select(&self, report: &BatchReport, top_n: Option<usize>) -> Vec<DispatchRequest> {
        let qualified: Vec<(usize, &EvaluationOutcome, Tier, f64)> = report
            .qualified()
            .filter_map(|(rank, outcome)| match (outcome.tier, outcome.overall_score) {
                (Some(tier), Some(score)) => Some((rank, outcome, tier, score)),
                _ => {
                    debug!(
                        candidate_id = %outcome.candidate_id.0,
                        "qualified candidate has no overall score, skipping dispatch"
                    );
                    None
                }
            })
            .collect();

        let selected = match self.strategy {
            SelectionStrategy::AllQualified => qualified,
            SelectionStrategy::StrongFirst => {
                let strong: Vec<_> = qualified
                    .iter()
                    .copied()
                    .filter(|(_, _, tier, _)| *tier == Tier::StrongMatch)
                    .collect();
                if strong.is_empty() {
                    let keep = (qualified.len() / FALLBACK_SHARE_DIVISOR).max(1);
                    qualified.into_iter().take(keep).collect()
                } else {
                    strong
                }
            }
        };

        selected
            .into_iter()
            .take(top_n.unwrap_or(usize::MAX))
            .map(|(rank, outcome, tier, overall_score)| DispatchRequest {
                job_id: report.job_id.clone(),
                candidate_id: outcome.candidate_id.clone(),
                rank,
                tier,
                overall_score,
                contact: outcome.contact.clone(),
            })
            .collect()
    }
}

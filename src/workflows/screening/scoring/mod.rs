//! Weighted scoring, tier classification, and fail-closed qualification.

mod config;
mod policy;
mod rules;

pub use config::{
    QualificationThresholds, ScoringConfig, ScoringConfigError, ScoringWeights, TierBoundaries,
    WEIGHT_SUM_TOLERANCE,
};
pub use policy::{OutcomeStatus, Tier};

pub(crate) use rules::estimate_experience;

use super::domain::{
    CandidateContact, CandidateId, CandidateProfile, Dimension, FailureCause, FailureStage,
    ProfileConfidence, StageFailure, SubScore,
};
use serde::{Deserialize, Serialize};

/// Validated, immutable scoring rubric. Construction is the only validation point.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringPolicy {
    config: ScoringConfig,
}

impl ScoringPolicy {
    pub fn new(config: ScoringConfig) -> Result<Self, ScoringConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn tier_for(&self, overall_score: f64) -> Tier {
        policy::classify_tier(overall_score, &self.config.tiers)
    }

    /// Turn a finished pipeline's evidence into its terminal outcome.
    pub fn score(&self, input: ScoringInput) -> EvaluationOutcome {
        let ScoringInput {
            candidate_id,
            position,
            filename,
            profile,
            subscores,
            experience_score,
            failures,
        } = input;

        let mut outcome = EvaluationOutcome {
            candidate_id,
            position,
            filename,
            status: OutcomeStatus::FailedExtraction,
            contact: None,
            confidence: None,
            subscores: Vec::new(),
            experience_score: None,
            overall_score: None,
            tier: None,
            qualified: false,
            failures,
        };

        let Some(profile) = profile else {
            return outcome;
        };
        outcome.contact = Some(profile.contact());
        outcome.confidence = Some(profile.confidence());

        let subscores = distinct_subscores(subscores);
        if subscores.is_empty() {
            outcome.status = OutcomeStatus::FailedEvaluation;
            return outcome;
        }

        let has = |dimension: Dimension| {
            subscores
                .iter()
                .any(|subscore| subscore.dimension() == dimension)
        };
        outcome.status = if has(Dimension::Skills) && has(Dimension::Cultural) {
            OutcomeStatus::Complete
        } else {
            OutcomeStatus::Partial
        };

        let experience_score = experience_score.and_then(rules::sanitize);
        let mut present: Vec<(Dimension, f64)> = subscores
            .iter()
            .map(|subscore| (subscore.dimension(), subscore.value))
            .collect();
        if let Some(value) = experience_score {
            present.push((Dimension::Experience, value));
        }

        let overall_score = rules::weighted_score(&self.config.weights, &present);
        outcome.tier = overall_score.map(|score| self.tier_for(score));
        outcome.overall_score = overall_score;
        outcome.qualified = policy::qualifies(&subscores, &self.config.thresholds);
        outcome.experience_score = experience_score;
        outcome.subscores = subscores;
        outcome
    }
}

/// Keeps the first finite sub-score per dimension, clamped into [0, 1].
fn distinct_subscores(subscores: Vec<SubScore>) -> Vec<SubScore> {
    let mut distinct: Vec<SubScore> = Vec::with_capacity(subscores.len());
    for mut subscore in subscores {
        let Some(value) = rules::sanitize(subscore.value) else {
            continue;
        };
        if distinct
            .iter()
            .any(|existing| existing.dimension() == subscore.dimension())
        {
            continue;
        }
        subscore.value = value;
        distinct.push(subscore);
    }
    distinct
}

/// Evidence gathered by a candidate pipeline, handed to [`ScoringPolicy::score`].
#[derive(Debug, Clone)]
pub struct ScoringInput {
    pub candidate_id: CandidateId,
    pub position: usize,
    pub filename: String,
    pub profile: Option<CandidateProfile>,
    pub subscores: Vec<SubScore>,
    pub experience_score: Option<f64>,
    pub failures: Vec<StageFailure>,
}

/// Per-candidate terminal record. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationOutcome {
    pub candidate_id: CandidateId,
    /// Position of the candidate in the submitted batch.
    pub position: usize,
    pub filename: String,
    pub status: OutcomeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<CandidateContact>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<ProfileConfidence>,
    pub subscores: Vec<SubScore>,
    pub experience_score: Option<f64>,
    pub overall_score: Option<f64>,
    pub tier: Option<Tier>,
    pub qualified: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<StageFailure>,
}

impl EvaluationOutcome {
    pub fn subscore(&self, dimension: Dimension) -> Option<f64> {
        match dimension {
            Dimension::Experience => self.experience_score,
            _ => self
                .subscores
                .iter()
                .find(|subscore| subscore.dimension() == dimension)
                .map(|subscore| subscore.value),
        }
    }

    pub fn failure_for(&self, stage: FailureStage) -> Option<FailureCause> {
        self.failures
            .iter()
            .find(|failure| failure.stage == stage)
            .map(|failure| failure.cause)
    }

    /// Reviewer-facing explanation that never includes raw oracle messages.
    pub fn summary(&self) -> String {
        let failures = self
            .failures
            .iter()
            .map(|failure| {
                let stage = match failure.stage {
                    FailureStage::Extraction => "extraction",
                    FailureStage::Skills => "skills evaluation",
                    FailureStage::Cultural => "cultural evaluation",
                };
                format!("{stage} {}", failure.cause.label())
            })
            .collect::<Vec<_>>()
            .join("; ");

        match self.status {
            OutcomeStatus::FailedExtraction if failures.is_empty() => {
                "resume could not be parsed".to_string()
            }
            OutcomeStatus::FailedExtraction => format!("resume could not be parsed: {failures}"),
            OutcomeStatus::FailedEvaluation => {
                format!("candidate could not be evaluated: {failures}")
            }
            OutcomeStatus::Partial | OutcomeStatus::Complete => {
                let score = self
                    .overall_score
                    .map(|score| format!("{:.1}%", score * 100.0))
                    .unwrap_or_else(|| "unscored".to_string());
                let tier = self.tier.map(Tier::label).unwrap_or("unclassified");
                let qualified = if self.qualified {
                    "qualified"
                } else {
                    "not qualified"
                };
                if failures.is_empty() {
                    format!("{score} {tier}, {qualified}")
                } else {
                    format!("{score} {tier}, {qualified} ({failures})")
                }
            }
        }
    }
}

use serde::{Deserialize, Serialize};

use super::super::domain::{Dimension, SubScore};
use super::config::{QualificationThresholds, TierBoundaries};

/// Terminal status of one candidate's evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    FailedExtraction,
    FailedEvaluation,
    Partial,
    Complete,
}

impl OutcomeStatus {
    pub const fn label(self) -> &'static str {
        match self {
            OutcomeStatus::FailedExtraction => "failed_extraction",
            OutcomeStatus::FailedEvaluation => "failed_evaluation",
            OutcomeStatus::Partial => "partial",
            OutcomeStatus::Complete => "complete",
        }
    }

    pub const fn is_failure(self) -> bool {
        matches!(
            self,
            OutcomeStatus::FailedExtraction | OutcomeStatus::FailedEvaluation
        )
    }
}

/// Coarse classification bucket derived from the overall score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    StrongMatch,
    ModerateMatch,
    WeakMatch,
}

impl Tier {
    pub const fn ordered() -> [Self; 3] {
        [Self::StrongMatch, Self::ModerateMatch, Self::WeakMatch]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Tier::StrongMatch => "strong_match",
            Tier::ModerateMatch => "moderate_match",
            Tier::WeakMatch => "weak_match",
        }
    }
}

/// Boundary values belong to the upper tier.
pub(crate) fn classify_tier(score: f64, boundaries: &TierBoundaries) -> Tier {
    if score >= boundaries.strong {
        Tier::StrongMatch
    } else if score >= boundaries.moderate {
        Tier::ModerateMatch
    } else {
        Tier::WeakMatch
    }
}

/// Both oracle dimensions must be present and meet their threshold.
pub(crate) fn qualifies(subscores: &[SubScore], thresholds: &QualificationThresholds) -> bool {
    let meets = |dimension: Dimension, threshold: f64| {
        subscores
            .iter()
            .find(|subscore| subscore.dimension() == dimension)
            .map(|subscore| subscore.value >= threshold)
            .unwrap_or(false)
    };

    meets(Dimension::Skills, thresholds.skills) && meets(Dimension::Cultural, thresholds.cultural)
}

use serde::{Deserialize, Serialize};

use super::super::domain::Dimension;
use super::policy::Tier;

/// Weights must be non-negative and sum to one within this tolerance.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Rubric configuration: dimension weights, qualification thresholds, tier boundaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub weights: ScoringWeights,
    pub thresholds: QualificationThresholds,
    pub tiers: TierBoundaries,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: ScoringWeights {
                skills: 0.6,
                cultural: 0.3,
                experience: 0.1,
            },
            thresholds: QualificationThresholds {
                skills: 0.70,
                cultural: 0.65,
            },
            tiers: TierBoundaries {
                strong: 0.85,
                moderate: 0.70,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub skills: f64,
    pub cultural: f64,
    pub experience: f64,
}

impl ScoringWeights {
    pub fn weight(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::Skills => self.skills,
            Dimension::Cultural => self.cultural,
            Dimension::Experience => self.experience,
        }
    }

    pub fn sum(&self) -> f64 {
        self.skills + self.cultural + self.experience
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualificationThresholds {
    pub skills: f64,
    pub cultural: f64,
}

/// Lower bounds of the upper two tiers; `weak_match` covers everything below `moderate`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierBoundaries {
    pub strong: f64,
    pub moderate: f64,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScoringConfigError {
    #[error("{field} must be a finite number")]
    NonFiniteValue { field: &'static str },
    #[error("{} weight must not be negative (got {value})", .dimension.label())]
    NegativeWeight { dimension: Dimension, value: f64 },
    #[error("weights must sum to 1.0 (got {sum:.6})")]
    WeightsDoNotSumToOne { sum: f64 },
    #[error("{} threshold must lie in [0, 1] (got {value})", .dimension.label())]
    ThresholdOutOfRange { dimension: Dimension, value: f64 },
    #[error("{} boundary must lie in [0, 1] (got {value})", .tier.label())]
    BoundaryOutOfRange { tier: Tier, value: f64 },
    #[error("moderate boundary {moderate} must not exceed strong boundary {strong}")]
    BoundariesOutOfOrder { moderate: f64, strong: f64 },
}

impl ScoringConfig {
    pub(crate) fn validate(&self) -> Result<(), ScoringConfigError> {
        let finite = [
            ("weights.skills", self.weights.skills),
            ("weights.cultural", self.weights.cultural),
            ("weights.experience", self.weights.experience),
            ("thresholds.skills", self.thresholds.skills),
            ("thresholds.cultural", self.thresholds.cultural),
            ("tiers.strong", self.tiers.strong),
            ("tiers.moderate", self.tiers.moderate),
        ];
        if let Some(&(field, _)) = finite.iter().find(|(_, value)| !value.is_finite()) {
            return Err(ScoringConfigError::NonFiniteValue { field });
        }

        for dimension in [Dimension::Skills, Dimension::Cultural, Dimension::Experience] {
            let value = self.weights.weight(dimension);
            if value < 0.0 {
                return Err(ScoringConfigError::NegativeWeight { dimension, value });
            }
        }

        let sum = self.weights.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ScoringConfigError::WeightsDoNotSumToOne { sum });
        }

        for (dimension, value) in [
            (Dimension::Skills, self.thresholds.skills),
            (Dimension::Cultural, self.thresholds.cultural),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ScoringConfigError::ThresholdOutOfRange { dimension, value });
            }
        }

        for (tier, value) in [
            (Tier::StrongMatch, self.tiers.strong),
            (Tier::ModerateMatch, self.tiers.moderate),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ScoringConfigError::BoundaryOutOfRange { tier, value });
            }
        }

        if self.tiers.moderate > self.tiers.strong {
            return Err(ScoringConfigError::BoundariesOutOfOrder {
                moderate: self.tiers.moderate,
                strong: self.tiers.strong,
            });
        }

        Ok(())
    }
}

//! Capability interfaces for the external oracles and the client that invokes them.
//!
//! Each role is a trait implemented by an adapter (HTTP or offline heuristics). The
//! [`OracleClient`] makes exactly one call per invocation under its timeout and
//! validates the response, so an invocation either yields a complete value or an
//! [`OracleError`]. Retries belong to the caller: see [`RetryPolicy::apply`].

pub mod heuristic;
pub mod http;
mod retry;

pub use retry::RetryPolicy;

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::domain::{
    CandidateProfile, FailureCause, JobDescription, RawCandidateInput, SubScore, SubScoreDetail,
};

/// Normalized failure of a single oracle call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OracleError {
    #[error("oracle call timed out")]
    Timeout,
    #[error("oracle returned an invalid response: {0}")]
    InvalidResponse(String),
    #[error("oracle unavailable: {0}")]
    Unavailable(String),
    #[error("oracle rejected the request: {0}")]
    Rejected(String),
}

impl OracleError {
    pub fn is_transient(&self) -> bool {
        matches!(self, OracleError::Timeout | OracleError::Unavailable(_))
    }
}

impl From<&OracleError> for FailureCause {
    fn from(value: &OracleError) -> Self {
        match value {
            OracleError::Timeout => FailureCause::Timeout,
            OracleError::InvalidResponse(_) => FailureCause::InvalidResponse,
            OracleError::Unavailable(_) => FailureCause::Unavailable,
            OracleError::Rejected(_) => FailureCause::Rejected,
        }
    }
}

/// Skills oracle judgment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillsAssessment {
    pub score: f64,
    #[serde(default)]
    pub matched_skills: Vec<String>,
    #[serde(default)]
    pub missing_skills: Vec<String>,
    #[serde(default)]
    pub rationale: Option<String>,
}

/// Cultural-fit oracle judgment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CulturalAssessment {
    pub score: f64,
    #[serde(default)]
    pub dimensions: BTreeMap<String, f64>,
    #[serde(default)]
    pub rationale: Option<String>,
}

#[async_trait]
pub trait ExtractionOracle: Send + Sync {
    async fn extract(&self, input: &RawCandidateInput) -> Result<CandidateProfile, OracleError>;
}

#[async_trait]
pub trait SkillsOracle: Send + Sync {
    async fn match_skills(
        &self,
        profile: &CandidateProfile,
        job: &JobDescription,
    ) -> Result<SkillsAssessment, OracleError>;
}

#[async_trait]
pub trait CulturalOracle: Send + Sync {
    async fn assess_culture(
        &self,
        profile: &CandidateProfile,
        job: &JobDescription,
    ) -> Result<CulturalAssessment, OracleError>;
}

/// The three oracle roles a pipeline needs.
#[derive(Clone)]
pub struct OracleSet {
    pub extraction: Arc<dyn ExtractionOracle>,
    pub skills: Arc<dyn SkillsOracle>,
    pub cultural: Arc<dyn CulturalOracle>,
}

impl OracleSet {
    pub fn new(
        extraction: Arc<dyn ExtractionOracle>,
        skills: Arc<dyn SkillsOracle>,
        cultural: Arc<dyn CulturalOracle>,
    ) -> Self {
        Self {
            extraction,
            skills,
            cultural,
        }
    }
}

/// Per-call timeouts for each oracle role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OracleTimeouts {
    pub extraction: Duration,
    pub skills: Duration,
    pub cultural: Duration,
}

impl OracleTimeouts {
    pub fn uniform(timeout: Duration) -> Self {
        Self {
            extraction: timeout,
            skills: timeout,
            cultural: timeout,
        }
    }
}

impl Default for OracleTimeouts {
    fn default() -> Self {
        Self::uniform(Duration::from_secs(30))
    }
}

/// Invokes the oracles with an enforced timeout and response validation.
#[derive(Clone)]
pub struct OracleClient {
    oracles: OracleSet,
    timeouts: OracleTimeouts,
}

impl OracleClient {
    pub fn new(oracles: OracleSet) -> Self {
        Self {
            oracles,
            timeouts: OracleTimeouts::default(),
        }
    }

    pub fn with_timeouts(mut self, timeouts: OracleTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Extract a profile, accepting it only when it carries a name and a skill list.
    pub async fn extract(
        &self,
        input: &RawCandidateInput,
    ) -> Result<CandidateProfile, OracleError> {
        let oracle = &self.oracles.extraction;
        let profile = self
            .invoke("extraction", self.timeouts.extraction, oracle.extract(input))
            .await?;

        match profile.missing_mandatory_field() {
            Some(field) => Err(OracleError::InvalidResponse(format!(
                "extracted profile is missing {field}"
            ))),
            None => Ok(profile),
        }
    }

    pub async fn assess_skills(
        &self,
        profile: &CandidateProfile,
        job: &JobDescription,
    ) -> Result<SubScore, OracleError> {
        let oracle = &self.oracles.skills;
        let assessment = self
            .invoke("skills", self.timeouts.skills, oracle.match_skills(profile, job))
            .await?;

        Ok(SubScore {
            value: unit_score("skills", assessment.score)?,
            detail: SubScoreDetail::Skills {
                matched_skills: assessment.matched_skills,
                missing_skills: assessment.missing_skills,
                rationale: assessment.rationale,
            },
        })
    }

    pub async fn assess_culture(
        &self,
        profile: &CandidateProfile,
        job: &JobDescription,
    ) -> Result<SubScore, OracleError> {
        let oracle = &self.oracles.cultural;
        let assessment = self
            .invoke("cultural", self.timeouts.cultural, oracle.assess_culture(profile, job))
            .await?;

        for (dimension, value) in &assessment.dimensions {
            unit_score(dimension, *value)?;
        }

        Ok(SubScore {
            value: unit_score("cultural", assessment.score)?,
            detail: SubScoreDetail::Cultural {
                dimensions: assessment.dimensions,
                rationale: assessment.rationale,
            },
        })
    }

    async fn invoke<T>(
        &self,
        operation: &str,
        limit: Duration,
        call: impl Future<Output = Result<T, OracleError>>,
    ) -> Result<T, OracleError> {
        match tokio::time::timeout(limit, call).await {
            Ok(result) => result,
            Err(_) => {
                debug!(
                    operation,
                    timeout_ms = limit.as_millis() as u64,
                    "oracle call timed out"
                );
                Err(OracleError::Timeout)
            }
        }
    }
}

fn unit_score(field: &str, value: f64) -> Result<f64, OracleError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(OracleError::InvalidResponse(format!(
            "{field} score {value} is outside [0, 1]"
        )))
    }
}

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;
use tracing::{info, warn};

use super::{
    CulturalAssessment, CulturalOracle, ExtractionOracle, OracleError, OracleSet,
    SkillsAssessment, SkillsOracle,
};
use crate::workflows::screening::domain::{CandidateProfile, JobDescription, RawCandidateInput};

/// Caller-side retry with capped exponential backoff.
///
/// Only transient failures (`Timeout`, `Unavailable`) are retried; a rejection or an
/// invalid response is returned immediately. [`RetryPolicy::apply`] wraps an
/// [`OracleSet`] so the retries run inside a single client invocation and its timeout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: usize,
    initial_backoff: Duration,
    max_backoff: Duration,
}

/// No retries.
impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(0, 0, 0)
    }
}

impl RetryPolicy {
    pub fn new(max_retries: usize, initial_backoff_ms: u64, max_backoff_ms: u64) -> Self {
        Self {
            max_retries,
            initial_backoff: Duration::from_millis(initial_backoff_ms),
            max_backoff: Duration::from_millis(max_backoff_ms),
        }
    }

    /// Wraps every oracle role so transient failures are retried before the client sees
    /// them. A policy without retries returns the set unchanged.
    pub fn apply(&self, oracles: OracleSet) -> OracleSet {
        if self.max_retries == 0 {
            return oracles;
        }
        OracleSet::new(
            Arc::new(Retrying {
                inner: oracles.extraction,
                policy: self.clone(),
            }),
            Arc::new(Retrying {
                inner: oracles.skills,
                policy: self.clone(),
            }),
            Arc::new(Retrying {
                inner: oracles.cultural,
                policy: self.clone(),
            }),
        )
    }

    pub async fn retry<F, Fut, T>(&self, operation: &str, mut call: F) -> Result<T, OracleError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, OracleError>>,
    {
        let mut attempt = 0;
        let mut backoff = self.initial_backoff;

        loop {
            match call().await {
                Ok(result) => {
                    if attempt > 0 {
                        info!(
                            operation,
                            attempts = attempt + 1,
                            "oracle call succeeded after retries"
                        );
                    }
                    return Ok(result);
                }
                Err(err) if err.is_transient() && attempt < self.max_retries => {
                    attempt += 1;
                    warn!(
                        operation,
                        attempt,
                        max_retries = self.max_retries,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %err,
                        "oracle call failed, retrying"
                    );
                    sleep(backoff).await;
                    backoff = std::cmp::min(backoff * 2, self.max_backoff);
                }
                Err(err) => return Err(err),
            }
        }
    }
}

struct Retrying<O: ?Sized> {
    inner: Arc<O>,
    policy: RetryPolicy,
}

#[async_trait]
impl ExtractionOracle for Retrying<dyn ExtractionOracle> {
    async fn extract(&self, input: &RawCandidateInput) -> Result<CandidateProfile, OracleError> {
        self.policy
            .retry("extraction", || self.inner.extract(input))
            .await
    }
}

#[async_trait]
impl SkillsOracle for Retrying<dyn SkillsOracle> {
    async fn match_skills(
        &self,
        profile: &CandidateProfile,
        job: &JobDescription,
    ) -> Result<SkillsAssessment, OracleError> {
        self.policy
            .retry("skills", || self.inner.match_skills(profile, job))
            .await
    }
}

#[async_trait]
impl CulturalOracle for Retrying<dyn CulturalOracle> {
    async fn assess_culture(
        &self,
        profile: &CandidateProfile,
        job: &JobDescription,
    ) -> Result<CulturalAssessment, OracleError> {
        self.policy
            .retry("cultural", || self.inner.assess_culture(profile, job))
            .await
    }
}

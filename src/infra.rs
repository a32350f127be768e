use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use talent_ai::config::ScreeningConfig;
use talent_ai::workflows::screening::oracle::heuristic::{
    KeywordSkillsMatcher, ResumeTextExtractor, ValuesCultureMatcher,
};
use talent_ai::workflows::screening::oracle::http::HttpOracle;
use talent_ai::workflows::screening::{
    BatchReport, DispatchError, DispatchRequest, EvaluationRepository, InterviewDispatcher, JobId,
    OracleClient, OracleError, OracleSet, OracleTimeouts, RepositoryError, RetryPolicy,
};
use tracing::info;

const RETRY_INITIAL_BACKOFF_MS: u64 = 500;
const RETRY_MAX_BACKOFF_MS: u64 = 8_000;

#[derive(Default, Clone)]
pub(crate) struct InMemoryEvaluationRepository {
    reports: Arc<Mutex<HashMap<JobId, BatchReport>>>,
}

impl EvaluationRepository for InMemoryEvaluationRepository {
    fn save_report(&self, report: &BatchReport) -> Result<(), RepositoryError> {
        let mut guard = self
            .reports
            .lock()
            .map_err(|_| RepositoryError::Unavailable("repository mutex poisoned".to_string()))?;
        guard.insert(report.job_id.clone(), report.clone());
        Ok(())
    }

    fn fetch_report(&self, job_id: &JobId) -> Result<Option<BatchReport>, RepositoryError> {
        let guard = self
            .reports
            .lock()
            .map_err(|_| RepositoryError::Unavailable("repository mutex poisoned".to_string()))?;
        Ok(guard.get(job_id).cloned())
    }
}

/// Logs dispatch requests in place of a calendar integration.
#[derive(Default, Clone, Copy)]
pub(crate) struct LoggingInterviewDispatcher;

impl InterviewDispatcher for LoggingInterviewDispatcher {
    fn dispatch(&self, request: &DispatchRequest) -> Result<(), DispatchError> {
        info!(
            job_id = %request.job_id.0,
            candidate_id = %request.candidate_id.0,
            rank = request.rank,
            tier = request.tier.label(),
            "interview invitation queued"
        );
        Ok(())
    }
}

/// Oracle set for the configured backend: the HTTP service when a base URL is set,
/// otherwise the offline heuristics.
pub(crate) fn oracle_set(config: &ScreeningConfig) -> Result<OracleSet, OracleError> {
    match &config.oracle_base_url {
        Some(base_url) => {
            info!(%base_url, "using HTTP oracle service");
            let oracle = Arc::new(HttpOracle::new(
                base_url.clone(),
                config.oracle_api_key.clone(),
            )?);
            Ok(OracleSet::new(oracle.clone(), oracle.clone(), oracle))
        }
        None => {
            info!("ORACLE_BASE_URL unset, using offline heuristic oracles");
            Ok(heuristic_oracles())
        }
    }
}

pub(crate) fn heuristic_oracles() -> OracleSet {
    OracleSet::new(
        Arc::new(ResumeTextExtractor),
        Arc::new(KeywordSkillsMatcher::default()),
        Arc::new(ValuesCultureMatcher::default()),
    )
}

/// Client over `oracles` with the configured retries wrapped around each role, so one
/// client invocation stays within `ORACLE_TIMEOUT_SECS` including its retries.
pub(crate) fn oracle_client(oracles: OracleSet, config: &ScreeningConfig) -> OracleClient {
    let retry = RetryPolicy::new(
        config.max_retries,
        RETRY_INITIAL_BACKOFF_MS,
        RETRY_MAX_BACKOFF_MS,
    );
    OracleClient::new(retry.apply(oracles))
        .with_timeouts(OracleTimeouts::uniform(config.oracle_timeout))
}

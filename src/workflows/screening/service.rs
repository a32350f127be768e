use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::domain::{CandidateId, JobDescription, JobId, RawCandidateInput};
use super::gate::{DispatchRequest, QualificationGate};
use super::oracle::OracleTimeouts;
use super::orchestrator::{BatchOptions, BatchOrchestrator};
use super::report::{BatchReport, BatchSummary};
use super::repository::{EvaluationRepository, InterviewDispatcher, RepositoryError};

/// Batch entry point: one job, its candidates, and the run limits.
#[derive(Debug, Clone)]
pub struct ScreeningRequest {
    pub job: JobDescription,
    pub inputs: Vec<RawCandidateInput>,
    pub max_concurrency: usize,
    pub timeouts: Option<OracleTimeouts>,
    pub top_n: Option<usize>,
    pub deadline: Option<Duration>,
}

impl ScreeningRequest {
    pub fn new(
        job: JobDescription,
        inputs: Vec<RawCandidateInput>,
        max_concurrency: usize,
    ) -> Self {
        Self {
            job,
            inputs,
            max_concurrency,
            timeouts: None,
            top_n: None,
            deadline: None,
        }
    }
}

/// A dispatch request the scheduler did not accept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveryFailure {
    pub candidate_id: CandidateId,
    pub reason: String,
}

/// Everything a screening run produced, including side-effect failures.
#[derive(Debug, Clone, Serialize)]
pub struct ScreeningRun {
    pub report: BatchReport,
    pub summary: BatchSummary,
    pub dispatches: Vec<DispatchRequest>,
    pub delivered: Vec<CandidateId>,
    pub delivery_failures: Vec<DeliveryFailure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persistence_error: Option<String>,
}

/// Service composing the orchestrator, the gate, storage, and interview dispatch.
pub struct ScreeningService<R, D> {
    orchestrator: Arc<BatchOrchestrator>,
    gate: QualificationGate,
    repository: Arc<R>,
    dispatcher: Arc<D>,
}

impl<R, D> ScreeningService<R, D>
where
    R: EvaluationRepository + 'static,
    D: InterviewDispatcher + 'static,
{
    pub fn new(
        orchestrator: Arc<BatchOrchestrator>,
        gate: QualificationGate,
        repository: Arc<R>,
        dispatcher: Arc<D>,
    ) -> Self {
        Self {
            orchestrator,
            gate,
            repository,
            dispatcher,
        }
    }

    pub async fn screen(
        &self,
        request: ScreeningRequest,
    ) -> Result<ScreeningRun, ScreeningServiceError> {
        self.screen_with(request, &CancellationToken::new()).await
    }

    /// Evaluate, rank, persist, and dispatch. Storage and dispatch failures are
    /// reported in the run rather than failing the batch.
    pub async fn screen_with(
        &self,
        request: ScreeningRequest,
        cancel: &CancellationToken,
    ) -> Result<ScreeningRun, ScreeningServiceError> {
        if request.max_concurrency == 0 {
            return Err(ScreeningServiceError::InvalidConcurrency);
        }

        let options = BatchOptions {
            max_concurrency: request.max_concurrency,
            timeouts: request.timeouts,
            deadline: request.deadline,
        };
        let report = self
            .orchestrator
            .run_with(&request.job, &request.inputs, &options, cancel)
            .await;

        let persistence_error = match self.repository.save_report(&report) {
            Ok(()) => None,
            Err(err) => {
                warn!(
                    job_id = %report.job_id.0,
                    error = %err,
                    "failed to persist screening report"
                );
                Some(err.to_string())
            }
        };

        let dispatches = self.gate.select(&report, request.top_n);
        let mut delivered = Vec::with_capacity(dispatches.len());
        let mut delivery_failures = Vec::new();
        for dispatch in &dispatches {
            match self.dispatcher.dispatch(dispatch) {
                Ok(()) => delivered.push(dispatch.candidate_id.clone()),
                Err(err) => {
                    warn!(
                        job_id = %dispatch.job_id.0,
                        candidate_id = %dispatch.candidate_id.0,
                        error = %err,
                        "interview dispatch failed"
                    );
                    delivery_failures.push(DeliveryFailure {
                        candidate_id: dispatch.candidate_id.clone(),
                        reason: err.to_string(),
                    });
                }
            }
        }

        let mut summary = report.summary();
        summary.dispatched = delivered.len();
        info!(
            job_id = %report.job_id.0,
            strategy = ?self.gate.strategy(),
            failed = summary.failed(),
            selected = dispatches.len(),
            dispatched = summary.dispatched,
            "screening run complete"
        );

        Ok(ScreeningRun {
            report,
            summary,
            dispatches,
            delivered,
            delivery_failures,
            persistence_error,
        })
    }

    /// Previously persisted report for a job.
    pub fn report(&self, job_id: &JobId) -> Result<Option<BatchReport>, ScreeningServiceError> {
        Ok(self.repository.fetch_report(job_id)?)
    }
}

/// Error raised by the screening service.
#[derive(Debug, thiserror::Error)]
pub enum ScreeningServiceError {
    #[error("max concurrency must be at least 1")]
    InvalidConcurrency,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

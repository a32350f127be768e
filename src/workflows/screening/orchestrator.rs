use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use chrono::Utc;
use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use super::domain::{JobDescription, RawCandidateInput};
use super::oracle::{OracleClient, OracleTimeouts};
use super::pipeline::CandidatePipeline;
use super::report::BatchReport;
use super::scoring::{EvaluationOutcome, ScoringPolicy};

/// Per-run knobs for [`BatchOrchestrator::run_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOptions {
    pub max_concurrency: usize,
    /// Overrides the client's per-call timeouts for this batch only.
    pub timeouts: Option<OracleTimeouts>,
    /// Wall-clock budget for the whole batch.
    pub deadline: Option<Duration>,
}

impl BatchOptions {
    pub fn new(max_concurrency: usize) -> Self {
        Self {
            max_concurrency,
            timeouts: None,
            deadline: None,
        }
    }

    pub fn with_timeouts(mut self, timeouts: OracleTimeouts) -> Self {
        self.timeouts = Some(timeouts);
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// Fans candidate pipelines out over a bounded worker pool and ranks the results.
pub struct BatchOrchestrator {
    client: OracleClient,
    policy: ScoringPolicy,
}

impl BatchOrchestrator {
    pub fn new(client: OracleClient, policy: ScoringPolicy) -> Self {
        Self { client, policy }
    }

    pub fn policy(&self) -> &ScoringPolicy {
        &self.policy
    }

    pub async fn run(
        &self,
        job: &JobDescription,
        inputs: &[RawCandidateInput],
        max_concurrency: usize,
    ) -> BatchReport {
        self.run_with(
            job,
            inputs,
            &BatchOptions::new(max_concurrency),
            &CancellationToken::new(),
        )
        .await
    }

    /// Runs the batch until every pipeline finished, was cancelled, or hit the deadline.
    ///
    /// Cancelling `cancel` (or reaching the deadline) keeps completed outcomes, fails
    /// in-flight pipelines for their current phase, and fails never-started ones at
    /// extraction. The report always holds one outcome per input.
    pub async fn run_with(
        &self,
        job: &JobDescription,
        inputs: &[RawCandidateInput],
        options: &BatchOptions,
        cancel: &CancellationToken,
    ) -> BatchReport {
        let started_at = Utc::now();
        let batch = cancel.child_token();
        let client = match options.timeouts {
            Some(timeouts) => self.client.clone().with_timeouts(timeouts),
            None => self.client.clone(),
        };
        let limit = options.max_concurrency.max(1);

        info!(
            job_id = %job.id.0,
            candidates = inputs.len(),
            max_concurrency = limit,
            "starting screening batch"
        );

        let drive = self.drive(job, inputs, &client, limit, &batch);
        let outcomes = match options.deadline {
            None => drive.await,
            Some(deadline) => {
                tokio::pin!(drive);
                tokio::select! {
                    outcomes = &mut drive => outcomes,
                    _ = tokio::time::sleep(deadline) => {
                        warn!(
                            job_id = %job.id.0,
                            deadline_ms = deadline.as_millis() as u64,
                            "screening batch deadline reached, cancelling in-flight candidates"
                        );
                        batch.cancel();
                        drive.await
                    }
                }
            }
        };

        let report = BatchReport::from_outcomes(
            job.id.clone(),
            started_at,
            outcomes,
            batch.is_cancelled(),
        );
        let summary = report.summary();
        info!(
            job_id = %job.id.0,
            total = summary.total,
            complete = summary.complete,
            partial = summary.partial,
            failed_extraction = summary.failed_extraction,
            failed_evaluation = summary.failed_evaluation,
            qualified = summary.qualified,
            interrupted = report.interrupted,
            "screening batch finished"
        );
        report
    }

    /// Seeds `limit` pipelines, then admits the next input each time one completes.
    async fn drive(
        &self,
        job: &JobDescription,
        inputs: &[RawCandidateInput],
        client: &OracleClient,
        limit: usize,
        cancel: &CancellationToken,
    ) -> Vec<EvaluationOutcome> {
        let mut pending = inputs.iter().enumerate();
        let mut in_flight = FuturesUnordered::new();
        let mut outcomes = Vec::with_capacity(inputs.len());

        for (position, input) in pending.by_ref().take(limit) {
            in_flight.push(self.evaluate(position, input, job, client, cancel));
        }

        while let Some(outcome) = in_flight.next().await {
            outcomes.push(outcome);
            if let Some((position, input)) = pending.next() {
                in_flight.push(self.evaluate(position, input, job, client, cancel));
            }
        }

        outcomes
    }

    async fn evaluate(
        &self,
        position: usize,
        input: &RawCandidateInput,
        job: &JobDescription,
        client: &OracleClient,
        cancel: &CancellationToken,
    ) -> EvaluationOutcome {
        let mut pipeline = CandidatePipeline::new(position, input, job, client, &self.policy);
        let result = AssertUnwindSafe(pipeline.run(cancel)).catch_unwind().await;

        match result {
            Ok(outcome) => outcome,
            Err(panic) => {
                error!(
                    candidate_id = %input.candidate_id.0,
                    reason = panic_message(panic.as_ref()),
                    "candidate pipeline panicked"
                );
                pipeline.abandon()
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic"
    }
}

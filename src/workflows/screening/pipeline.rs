use std::future::Future;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use super::domain::{
    CandidateProfile, FailureCause, FailureStage, JobDescription, RawCandidateInput, StageFailure,
    SubScore,
};
use super::oracle::{OracleClient, OracleError};
use super::scoring::{estimate_experience, EvaluationOutcome, ScoringInput, ScoringPolicy};

/// Lifecycle of a single candidate's evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    Pending,
    Extracting,
    ExtractionFailed,
    Evaluating,
    EvaluationFailed,
    Scoring,
    Done,
}

impl PipelineState {
    pub const fn label(self) -> &'static str {
        match self {
            PipelineState::Pending => "pending",
            PipelineState::Extracting => "extracting",
            PipelineState::ExtractionFailed => "extraction_failed",
            PipelineState::Evaluating => "evaluating",
            PipelineState::EvaluationFailed => "evaluation_failed",
            PipelineState::Scoring => "scoring",
            PipelineState::Done => "done",
        }
    }

    fn in_extraction_phase(self) -> bool {
        matches!(
            self,
            PipelineState::Pending | PipelineState::Extracting | PipelineState::ExtractionFailed
        )
    }
}

/// Drives one candidate through extraction, the two sub-evaluations, and scoring.
///
/// Oracle failures never escape: every path through [`CandidatePipeline::run`] ends in
/// an [`EvaluationOutcome`].
pub struct CandidatePipeline<'a> {
    position: usize,
    input: &'a RawCandidateInput,
    job: &'a JobDescription,
    client: &'a OracleClient,
    policy: &'a ScoringPolicy,
    state: PipelineState,
    profile: Option<CandidateProfile>,
}

impl<'a> CandidatePipeline<'a> {
    pub fn new(
        position: usize,
        input: &'a RawCandidateInput,
        job: &'a JobDescription,
        client: &'a OracleClient,
        policy: &'a ScoringPolicy,
    ) -> Self {
        Self {
            position,
            input,
            job,
            client,
            policy,
            state: PipelineState::Pending,
            profile: None,
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub async fn run(&mut self, cancel: &CancellationToken) -> EvaluationOutcome {
        let mut failures = Vec::new();

        if cancel.is_cancelled() {
            failures.push(StageFailure {
                stage: FailureStage::Extraction,
                cause: FailureCause::Cancelled,
            });
            self.transition(PipelineState::ExtractionFailed);
            return self.finish(Vec::new(), None, failures);
        }

        let client = self.client;
        let job = self.job;
        let input = self.input;

        self.transition(PipelineState::Extracting);
        let candidate = &input.candidate_id.0;
        let extracted = guarded(
            cancel,
            candidate,
            FailureStage::Extraction,
            client.extract(input),
        )
        .await;
        let profile = match extracted {
            Ok(profile) => profile,
            Err(failure) => {
                failures.push(failure);
                self.transition(PipelineState::ExtractionFailed);
                return self.finish(Vec::new(), None, failures);
            }
        };

        self.transition(PipelineState::Evaluating);
        let profile: &CandidateProfile = self.profile.insert(profile);
        let (skills, cultural) = tokio::join!(
            guarded(
                cancel,
                candidate,
                FailureStage::Skills,
                client.assess_skills(profile, job)
            ),
            guarded(
                cancel,
                candidate,
                FailureStage::Cultural,
                client.assess_culture(profile, job)
            ),
        );
        let experience_score = estimate_experience(profile, job);

        let mut subscores = Vec::with_capacity(2);
        for result in [skills, cultural] {
            match result {
                Ok(subscore) => subscores.push(subscore),
                Err(failure) => failures.push(failure),
            }
        }

        if subscores.is_empty() {
            self.transition(PipelineState::EvaluationFailed);
        } else {
            self.transition(PipelineState::Scoring);
        }
        self.finish(subscores, experience_score, failures)
    }

    /// Outcome for a pipeline whose run panicked, failed for the phase it was in.
    pub fn abandon(&mut self) -> EvaluationOutcome {
        let failures = if self.state.in_extraction_phase() {
            self.profile = None;
            self.state = PipelineState::ExtractionFailed;
            vec![StageFailure {
                stage: FailureStage::Extraction,
                cause: FailureCause::Aborted,
            }]
        } else {
            self.state = PipelineState::EvaluationFailed;
            [FailureStage::Skills, FailureStage::Cultural]
                .into_iter()
                .map(|stage| StageFailure {
                    stage,
                    cause: FailureCause::Aborted,
                })
                .collect()
        };

        error!(
            candidate_id = %self.input.candidate_id.0,
            state = self.state.label(),
            "candidate pipeline aborted"
        );
        self.finish(Vec::new(), None, failures)
    }

    fn finish(
        &mut self,
        subscores: Vec<SubScore>,
        experience_score: Option<f64>,
        failures: Vec<StageFailure>,
    ) -> EvaluationOutcome {
        let outcome = self.policy.score(ScoringInput {
            candidate_id: self.input.candidate_id.clone(),
            position: self.position,
            filename: self.input.filename.clone(),
            profile: self.profile.clone(),
            subscores,
            experience_score,
            failures,
        });
        self.transition(PipelineState::Done);
        debug!(
            candidate_id = %outcome.candidate_id.0,
            status = outcome.status.label(),
            overall_score = ?outcome.overall_score,
            "candidate evaluated"
        );
        outcome
    }

    fn transition(&mut self, next: PipelineState) {
        debug!(
            candidate_id = %self.input.candidate_id.0,
            from = self.state.label(),
            to = next.label(),
            "pipeline transition"
        );
        self.state = next;
    }
}

/// Races an oracle call against batch cancellation and folds errors into a stage failure.
async fn guarded<T>(
    cancel: &CancellationToken,
    candidate: &str,
    stage: FailureStage,
    call: impl Future<Output = Result<T, OracleError>>,
) -> Result<T, StageFailure> {
    let result = tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(FailureCause::Cancelled),
        result = call => result.map_err(|err| {
            warn!(candidate_id = candidate, ?stage, error = %err, "oracle call failed");
            FailureCause::from(&err)
        }),
    };

    result.map_err(|cause| StageFailure { stage, cause })
}

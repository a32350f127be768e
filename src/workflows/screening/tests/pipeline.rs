use tokio_util::sync::CancellationToken;

use super::common::*;
use crate::workflows::screening::domain::{FailureCause, FailureStage, PersonalInfo};
use crate::workflows::screening::oracle::OracleError;
use crate::workflows::screening::pipeline::{CandidatePipeline, PipelineState};
use crate::workflows::screening::scoring::{OutcomeStatus, Tier};

#[tokio::test]
async fn healthy_candidate_runs_to_completion() {
    let oracles = Oracles::healthy(1);
    let client = oracles.client();
    let policy = policy();
    let job = job();
    let inputs = inputs(1);

    let mut pipeline = CandidatePipeline::new(0, &inputs[0], &job, &client, &policy);
    assert_eq!(pipeline.state(), PipelineState::Pending);

    let outcome = pipeline.run(&CancellationToken::new()).await;

    assert_eq!(pipeline.state(), PipelineState::Done);
    assert_eq!(outcome.status, OutcomeStatus::Complete);
    assert_eq!(outcome.experience_score, Some(0.5));
    let score = outcome.overall_score.expect("scored");
    assert!((score - 0.83).abs() < 1e-9);
    assert_eq!(outcome.tier, Some(Tier::ModerateMatch));
    assert!(outcome.qualified);
    assert!(outcome.failures.is_empty());
    assert_eq!(outcome.filename, "candidate_0.pdf");
}

#[tokio::test]
async fn extraction_failure_skips_evaluation() {
    let oracles = Oracles::new(
        extractor(1).script(
            "candidate_0",
            Step::Fail(OracleError::Unavailable("503".to_string())),
        ),
        Scripted::new(Step::Return(0.9)),
        Scripted::new(Step::Return(0.8)),
    );
    let client = oracles.client();
    let policy = policy();
    let job = job();
    let inputs = inputs(1);

    let outcome = CandidatePipeline::new(0, &inputs[0], &job, &client, &policy)
        .run(&CancellationToken::new())
        .await;

    assert_eq!(outcome.status, OutcomeStatus::FailedExtraction);
    assert_eq!(
        outcome.failure_for(FailureStage::Extraction),
        Some(FailureCause::Unavailable)
    );
    assert!(outcome.subscores.is_empty());
    assert_eq!(outcome.overall_score, None);
    assert!(!outcome.qualified);
    assert_eq!(oracles.skills.calls(), 0);
    assert_eq!(oracles.cultural.calls(), 0);
}

#[tokio::test]
async fn profile_without_a_name_is_a_failed_extraction() {
    let mut nameless = profile("candidate_0");
    nameless.personal_info = PersonalInfo::default();
    let oracles = Oracles::new(
        extractor(1).script("candidate_0", Step::Return(nameless)),
        Scripted::new(Step::Return(0.9)),
        Scripted::new(Step::Return(0.8)),
    );
    let client = oracles.client();
    let policy = policy();
    let job = job();
    let inputs = inputs(1);

    let outcome = CandidatePipeline::new(0, &inputs[0], &job, &client, &policy)
        .run(&CancellationToken::new())
        .await;

    assert_eq!(outcome.status, OutcomeStatus::FailedExtraction);
    assert_eq!(
        outcome.failure_for(FailureStage::Extraction),
        Some(FailureCause::InvalidResponse)
    );
    assert_eq!(oracles.skills.calls(), 0);
}

#[tokio::test]
async fn one_failed_sub_evaluation_yields_a_partial_outcome() {
    let oracles = Oracles::new(
        extractor(1),
        Scripted::new(Step::Return(0.9)),
        Scripted::new(Step::Fail(OracleError::Rejected("policy".to_string()))),
    );
    let client = oracles.client();
    let policy = policy();
    let job = job();
    let inputs = inputs(1);

    let outcome = CandidatePipeline::new(0, &inputs[0], &job, &client, &policy)
        .run(&CancellationToken::new())
        .await;

    assert_eq!(outcome.status, OutcomeStatus::Partial);
    assert_eq!(
        outcome.failure_for(FailureStage::Cultural),
        Some(FailureCause::Rejected)
    );
    let expected = (0.6 * 0.9 + 0.1 * 0.5) / 0.7;
    let score = outcome.overall_score.expect("scored");
    assert!((score - expected).abs() < 1e-9);
    assert!(!outcome.qualified);
}

#[tokio::test]
async fn both_failed_sub_evaluations_yield_a_failed_evaluation() {
    let oracles = Oracles::new(
        extractor(1),
        Scripted::new(Step::Fail(OracleError::InvalidResponse("schema".to_string()))),
        Scripted::new(Step::Fail(OracleError::Unavailable("down".to_string()))),
    );
    let client = oracles.client();
    let policy = policy();
    let job = job();
    let inputs = inputs(1);

    let mut pipeline = CandidatePipeline::new(0, &inputs[0], &job, &client, &policy);
    let outcome = pipeline.run(&CancellationToken::new()).await;

    assert_eq!(pipeline.state(), PipelineState::Done);
    assert_eq!(outcome.status, OutcomeStatus::FailedEvaluation);
    assert!(outcome.subscores.is_empty());
    assert_eq!(outcome.overall_score, None);
    assert_eq!(outcome.failures.len(), 2);
    assert!(outcome.contact.is_some());
}

#[tokio::test(start_paused = true)]
async fn slow_sub_evaluation_times_out_without_blocking_its_sibling() {
    let oracles = Oracles::new(
        extractor(1),
        Scripted::new(Step::Hang),
        Scripted::new(Step::Return(0.8)),
    );
    let client = oracles.client();
    let policy = policy();
    let job = job();
    let inputs = inputs(1);

    let outcome = CandidatePipeline::new(0, &inputs[0], &job, &client, &policy)
        .run(&CancellationToken::new())
        .await;

    assert_eq!(outcome.status, OutcomeStatus::Partial);
    assert_eq!(
        outcome.failure_for(FailureStage::Skills),
        Some(FailureCause::Timeout)
    );
    assert!(!outcome.qualified);
}

#[tokio::test]
async fn cancelled_before_start_never_calls_an_oracle() {
    let oracles = Oracles::healthy(1);
    let client = oracles.client();
    let policy = policy();
    let job = job();
    let inputs = inputs(1);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let outcome = CandidatePipeline::new(0, &inputs[0], &job, &client, &policy)
        .run(&cancel)
        .await;

    assert_eq!(outcome.status, OutcomeStatus::FailedExtraction);
    assert_eq!(
        outcome.failure_for(FailureStage::Extraction),
        Some(FailureCause::Cancelled)
    );
    assert_eq!(oracles.extraction.calls(), 0);
}

#[test]
fn abandoning_mid_extraction_fails_the_extraction_phase() {
    let oracles = Oracles::healthy(1);
    let client = oracles.client();
    let policy = policy();
    let job = job();
    let inputs = inputs(1);

    let outcome = CandidatePipeline::new(0, &inputs[0], &job, &client, &policy).abandon();

    assert_eq!(outcome.status, OutcomeStatus::FailedExtraction);
    assert_eq!(
        outcome.failure_for(FailureStage::Extraction),
        Some(FailureCause::Aborted)
    );
}

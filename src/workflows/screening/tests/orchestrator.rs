use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::common::*;
use crate::workflows::screening::domain::{FailureCause, FailureStage};
use crate::workflows::screening::oracle::{OracleError, OracleTimeouts};
use crate::workflows::screening::orchestrator::{BatchOptions, BatchOrchestrator};
use crate::workflows::screening::scoring::OutcomeStatus;

fn orchestrator(oracles: &Oracles) -> BatchOrchestrator {
    BatchOrchestrator::new(oracles.client(), policy())
}

fn positions(report: &crate::workflows::screening::report::BatchReport) -> Vec<usize> {
    report.outcomes.iter().map(|outcome| outcome.position).collect()
}

#[tokio::test]
async fn every_input_yields_exactly_one_outcome() {
    let oracles = Oracles::new(
        extractor(6).script(
            "candidate_2",
            Step::Fail(OracleError::Rejected("unreadable".to_string())),
        ),
        Scripted::new(Step::Return(0.9)).script(
            "candidate_4",
            Step::Fail(OracleError::Unavailable("down".to_string())),
        ),
        Scripted::new(Step::Return(0.8)).script(
            "candidate_4",
            Step::Fail(OracleError::Unavailable("down".to_string())),
        ),
    );

    let report = orchestrator(&oracles).run(&job(), &inputs(6), 2).await;

    assert_eq!(report.len(), 6);
    let mut seen = positions(&report);
    seen.sort_unstable();
    assert_eq!(seen, vec![0, 1, 2, 3, 4, 5]);
    assert!(!report.interrupted);

    let summary = report.summary();
    assert_eq!(summary.complete, 4);
    assert_eq!(summary.failed_extraction, 1);
    assert_eq!(summary.failed_evaluation, 1);
}

#[tokio::test]
async fn report_is_sorted_descending_with_unscored_last_and_stable_ties() {
    let oracles = Oracles::new(
        extractor(5).script(
            "candidate_0",
            Step::Fail(OracleError::Rejected("unreadable".to_string())),
        ),
        Scripted::new(Step::Return(0.7))
            .script("candidate_1", Step::Return(0.95))
            .script("candidate_3", Step::Return(0.95)),
        Scripted::new(Step::Return(0.8)),
    );

    let report = orchestrator(&oracles).run(&job(), &inputs(5), 5).await;

    assert_eq!(positions(&report), vec![1, 3, 2, 4, 0]);
    let scores: Vec<Option<f64>> = report
        .outcomes
        .iter()
        .map(|outcome| outcome.overall_score)
        .collect();
    assert!(scores.windows(2).all(|pair| match (pair[0], pair[1]) {
        (Some(left), Some(right)) => left >= right,
        (Some(_), None) | (None, None) => true,
        (None, Some(_)) => false,
    }));
}

#[tokio::test(start_paused = true)]
async fn timed_out_extraction_does_not_affect_other_candidates() {
    let oracles = Oracles::new(
        extractor(4).script("candidate_1", Step::Hang),
        Scripted::new(Step::Return(0.9)),
        Scripted::new(Step::Return(0.8)),
    );

    let report = orchestrator(&oracles).run(&job(), &inputs(4), 4).await;

    assert_eq!(report.len(), 4);
    for outcome in &report.outcomes {
        if outcome.position == 1 {
            assert_eq!(outcome.status, OutcomeStatus::FailedExtraction);
            assert_eq!(
                outcome.failure_for(FailureStage::Extraction),
                Some(FailureCause::Timeout)
            );
        } else {
            assert_eq!(outcome.status, OutcomeStatus::Complete);
        }
    }
    assert_eq!(report.outcomes.last().map(|outcome| outcome.position), Some(1));
}

#[tokio::test(start_paused = true)]
async fn in_flight_pipelines_never_exceed_the_concurrency_bound() {
    let oracles = Oracles::new(
        extractor(10).with_latency(Duration::from_millis(100)),
        Scripted::new(Step::Return(0.9)).with_latency(Duration::from_millis(50)),
        Scripted::new(Step::Return(0.8)).with_latency(Duration::from_millis(50)),
    );

    let report = orchestrator(&oracles).run(&job(), &inputs(10), 3).await;

    assert_eq!(report.len(), 10);
    assert_eq!(oracles.extraction.calls(), 10);
    assert_eq!(oracles.extraction.peak(), 3);
    assert!(oracles.skills.peak() <= 3);
}

#[tokio::test(start_paused = true)]
async fn cancellation_keeps_finished_outcomes_and_fails_the_rest() {
    let oracles = Oracles::new(
        extractor(6).with_latency(Duration::from_secs(1)),
        Scripted::new(Step::Return(0.9)),
        Scripted::new(Step::Return(0.8)),
    );
    let orchestrator = orchestrator(&oracles);
    let job = job();
    let inputs = inputs(6);
    let cancel = CancellationToken::new();
    let options = BatchOptions::new(2);

    let (report, ()) = tokio::join!(
        orchestrator.run_with(&job, &inputs, &options, &cancel),
        async {
            tokio::time::sleep(Duration::from_millis(1_500)).await;
            cancel.cancel();
        }
    );

    assert_eq!(report.len(), 6);
    assert!(report.interrupted);
    let summary = report.summary();
    assert_eq!(summary.complete, 2);
    assert_eq!(summary.failed_extraction, 4);
    assert!(report
        .outcomes
        .iter()
        .filter(|outcome| outcome.status == OutcomeStatus::FailedExtraction)
        .all(|outcome| outcome.failure_for(FailureStage::Extraction)
            == Some(FailureCause::Cancelled)));
}

#[tokio::test(start_paused = true)]
async fn deadline_fails_in_flight_evaluations_for_their_phase() {
    let oracles = Oracles::new(
        extractor(2),
        Scripted::new(Step::Return(0.9)).script("candidate_1", Step::Hang),
        Scripted::new(Step::Return(0.8)),
    );
    let options = BatchOptions::new(2)
        .with_timeouts(OracleTimeouts::uniform(Duration::from_secs(60)))
        .with_deadline(Duration::from_secs(10));

    let report = orchestrator(&oracles)
        .run_with(&job(), &inputs(2), &options, &CancellationToken::new())
        .await;

    assert!(report.interrupted);
    let finished = report.outcomes.iter().find(|o| o.position == 0).expect("0");
    assert_eq!(finished.status, OutcomeStatus::Complete);
    let cut_short = report.outcomes.iter().find(|o| o.position == 1).expect("1");
    assert_eq!(cut_short.status, OutcomeStatus::Partial);
    assert_eq!(
        cut_short.failure_for(FailureStage::Skills),
        Some(FailureCause::Cancelled)
    );
}

#[tokio::test]
async fn panicking_pipeline_becomes_a_failed_outcome() {
    let oracles = Oracles::new(
        extractor(3),
        Scripted::new(Step::Return(0.9)).script("candidate_1", Step::Panic),
        Scripted::new(Step::Return(0.8)),
    );

    let report = orchestrator(&oracles).run(&job(), &inputs(3), 1).await;

    assert_eq!(report.len(), 3);
    let aborted = report.outcomes.iter().find(|o| o.position == 1).expect("1");
    assert_eq!(aborted.status, OutcomeStatus::FailedEvaluation);
    assert_eq!(
        aborted.failure_for(FailureStage::Skills),
        Some(FailureCause::Aborted)
    );
    assert_eq!(report.summary().complete, 2);
}

#[tokio::test]
async fn empty_batch_yields_an_empty_report() {
    let oracles = Oracles::healthy(0);

    let report = orchestrator(&oracles).run(&job(), &[], 4).await;

    assert!(report.is_empty());
    assert_eq!(oracles.extraction.calls(), 0);
}

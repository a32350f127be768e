//! Candidate screening: extraction, dual evaluation, weighted scoring, and ranking.
//!
//! A batch of resumes is evaluated against one job description. Each candidate runs
//! through a [`CandidatePipeline`] under the [`BatchOrchestrator`]'s concurrency bound,
//! the results are ranked into a [`BatchReport`], and the [`QualificationGate`] picks
//! who is forwarded to interview scheduling.

pub mod domain;
pub mod gate;
pub mod oracle;
pub mod orchestrator;
pub mod pipeline;
pub mod report;
pub mod repository;
pub mod scoring;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    CandidateContact, CandidateId, CandidateProfile, Dimension, Education, ExperienceRequirement,
    FailureCause, FailureStage, JobDescription, JobId, PersonalInfo, ProfileConfidence,
    RawCandidateInput, StageFailure, SubScore, SubScoreDetail, WorkExperience,
};
pub use gate::{DispatchRequest, QualificationGate, SelectionStrategy};
pub use oracle::{
    CulturalAssessment, CulturalOracle, ExtractionOracle, OracleClient, OracleError, OracleSet,
    OracleTimeouts, RetryPolicy, SkillsAssessment, SkillsOracle,
};
pub use orchestrator::{BatchOptions, BatchOrchestrator};
pub use pipeline::{CandidatePipeline, PipelineState};
pub use report::{BatchReport, BatchSummary};
pub use repository::{DispatchError, EvaluationRepository, InterviewDispatcher, RepositoryError};
pub use scoring::{
    EvaluationOutcome, OutcomeStatus, QualificationThresholds, ScoringConfig, ScoringConfigError,
    ScoringInput, ScoringPolicy, ScoringWeights, Tier, TierBoundaries,
};
pub use service::{
    DeliveryFailure, ScreeningRequest, ScreeningRun, ScreeningService, ScreeningServiceError,
};

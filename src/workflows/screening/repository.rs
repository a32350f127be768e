use super::domain::JobId;
use super::gate::DispatchRequest;
use super::report::BatchReport;

/// Storage abstraction for screening results; the pipeline itself never touches it.
pub trait EvaluationRepository: Send + Sync {
    fn save_report(&self, report: &BatchReport) -> Result<(), RepositoryError>;
    fn fetch_report(&self, job_id: &JobId) -> Result<Option<BatchReport>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Outbound hook that turns a dispatch request into an interview invitation.
pub trait InterviewDispatcher: Send + Sync {
    fn dispatch(&self, request: &DispatchRequest) -> Result<(), DispatchError>;
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("scheduling transport unavailable: {0}")]
    Transport(String),
    #[error("scheduler declined the request: {0}")]
    Declined(String),
}

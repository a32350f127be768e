use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{
    CulturalAssessment, CulturalOracle, ExtractionOracle, OracleError, SkillsAssessment,
    SkillsOracle,
};
use crate::workflows::screening::domain::{CandidateProfile, JobDescription, RawCandidateInput};

const USER_AGENT: &str = concat!("talent-ai/", env!("CARGO_PKG_VERSION"));

/// JSON-over-HTTP adapter implementing all three oracle roles.
///
/// Expects `POST {base}/extract`, `POST {base}/skills`, and `POST {base}/culture`.
/// Timeouts are enforced by [`super::OracleClient`], not by the HTTP client.
#[derive(Clone)]
pub struct HttpOracle {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct ExtractRequest<'a> {
    candidate_id: &'a str,
    filename: &'a str,
    document_text: &'a str,
}

#[derive(Serialize)]
struct EvaluationRequest<'a> {
    profile: &'a CandidateProfile,
    job: &'a JobDescription,
}

impl HttpOracle {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Result<Self, OracleError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|err| OracleError::Unavailable(err.to_string()))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, OracleError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, path);
        tracing::debug!(%url, "calling oracle service");

        let mut request = self.client.post(&url).json(body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(classify_status(status, &detail));
        }

        response
            .json::<T>()
            .await
            .map_err(|err| OracleError::InvalidResponse(err.to_string()))
    }
}

#[async_trait]
impl ExtractionOracle for HttpOracle {
    async fn extract(&self, input: &RawCandidateInput) -> Result<CandidateProfile, OracleError> {
        let body = ExtractRequest {
            candidate_id: &input.candidate_id.0,
            filename: &input.filename,
            document_text: &input.document_text,
        };
        self.post("extract", &body).await
    }
}

#[async_trait]
impl SkillsOracle for HttpOracle {
    async fn match_skills(
        &self,
        profile: &CandidateProfile,
        job: &JobDescription,
    ) -> Result<SkillsAssessment, OracleError> {
        self.post("skills", &EvaluationRequest { profile, job }).await
    }
}

#[async_trait]
impl CulturalOracle for HttpOracle {
    async fn assess_culture(
        &self,
        profile: &CandidateProfile,
        job: &JobDescription,
    ) -> Result<CulturalAssessment, OracleError> {
        self.post("culture", &EvaluationRequest { profile, job }).await
    }
}

fn transport_error(err: reqwest::Error) -> OracleError {
    if err.is_timeout() {
        OracleError::Timeout
    } else if err.is_decode() {
        OracleError::InvalidResponse(err.to_string())
    } else {
        OracleError::Unavailable(err.to_string())
    }
}

/// Maps a non-success status to the normalized error kinds.
pub(crate) fn classify_status(status: StatusCode, detail: &str) -> OracleError {
    let message = if detail.trim().is_empty() {
        status.to_string()
    } else {
        format!("{status}: {}", detail.trim())
    };

    match status {
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => OracleError::Timeout,
        StatusCode::TOO_MANY_REQUESTS => OracleError::Unavailable(message),
        status if status.is_server_error() => OracleError::Unavailable(message),
        _ => OracleError::Rejected(message),
    }
}

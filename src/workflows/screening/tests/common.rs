use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use crate::workflows::screening::domain::{
    CandidateId, CandidateProfile, ExperienceRequirement, JobDescription, JobId, PersonalInfo,
    RawCandidateInput, StageFailure, SubScore, SubScoreDetail, WorkExperience,
};
use crate::workflows::screening::gate::DispatchRequest;
use crate::workflows::screening::oracle::{
    CulturalAssessment, CulturalOracle, ExtractionOracle, OracleClient, OracleError, OracleSet,
    OracleTimeouts, SkillsAssessment, SkillsOracle,
};
use crate::workflows::screening::report::BatchReport;
use crate::workflows::screening::repository::{
    DispatchError, EvaluationRepository, InterviewDispatcher, RepositoryError,
};
use crate::workflows::screening::scoring::{
    EvaluationOutcome, OutcomeStatus, ScoringConfig, ScoringPolicy, Tier,
};

pub(super) const ORACLE_TIMEOUT: Duration = Duration::from_secs(5);

pub(super) fn job() -> JobDescription {
    JobDescription {
        id: JobId("job-backend".to_string()),
        title: "Backend Engineer".to_string(),
        required_skills: ["Rust", "PostgreSQL"]
            .into_iter()
            .map(str::to_string)
            .collect(),
        preferred_skills: ["Kubernetes".to_string()].into_iter().collect(),
        culture_values: ["Ownership".to_string()].into_iter().collect(),
        experience: ExperienceRequirement {
            minimum_years: Some(4.0),
            level: Some("senior".to_string()),
        },
    }
}

pub(super) fn candidate_key(position: usize) -> String {
    format!("candidate_{position}")
}

pub(super) fn inputs(count: usize) -> Vec<RawCandidateInput> {
    (0..count)
        .map(|position| RawCandidateInput {
            candidate_id: CandidateId(candidate_key(position)),
            document_text: format!("Name: {}", candidate_key(position)),
            filename: format!("{}.pdf", candidate_key(position)),
        })
        .collect()
}

/// Profile named after its candidate id so evaluation fakes can be scripted per candidate.
pub(super) fn profile(name: &str) -> CandidateProfile {
    CandidateProfile {
        personal_info: PersonalInfo {
            name: name.to_string(),
            email: Some(format!("{name}@example.com")),
            phone: None,
            location: None,
        },
        work_experience: vec![WorkExperience {
            company: "Initech".to_string(),
            role: "Engineer".to_string(),
            duration_months: Some(24),
            highlights: Vec::new(),
            technologies: Vec::new(),
        }],
        education: Vec::new(),
        skills: ["Rust".to_string()].into_iter().collect(),
        certifications: Vec::new(),
        summary: None,
    }
}

pub(super) fn policy() -> ScoringPolicy {
    ScoringPolicy::new(ScoringConfig::default()).expect("default policy is valid")
}

pub(super) fn skills(value: f64) -> SubScore {
    SubScore {
        value,
        detail: SubScoreDetail::Skills {
            matched_skills: Vec::new(),
            missing_skills: Vec::new(),
            rationale: None,
        },
    }
}

pub(super) fn cultural(value: f64) -> SubScore {
    SubScore {
        value,
        detail: SubScoreDetail::Cultural {
            dimensions: Default::default(),
            rationale: None,
        },
    }
}

/// How a scripted oracle answers one call.
#[derive(Debug, Clone)]
pub(super) enum Step<T> {
    Return(T),
    Fail(OracleError),
    Hang,
    Panic,
}

/// Fake oracle answering per candidate key, with optional latency and in-flight tracking.
pub(super) struct Scripted<T> {
    steps: Mutex<HashMap<String, Step<T>>>,
    fallback: Step<T>,
    latency: Duration,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl<T: Clone> Scripted<T> {
    pub(super) fn new(fallback: Step<T>) -> Self {
        Self {
            steps: Mutex::new(HashMap::new()),
            fallback,
            latency: Duration::ZERO,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    pub(super) fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub(super) fn script(self, key: &str, step: Step<T>) -> Self {
        self.steps
            .lock()
            .expect("steps lock")
            .insert(key.to_string(), step);
        self
    }

    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(super) fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    async fn respond(&self, key: &str) -> Result<T, OracleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        let _guard = InFlight(&self.in_flight);
        self.peak.fetch_max(now, Ordering::SeqCst);

        let step = self
            .steps
            .lock()
            .expect("steps lock")
            .get(key)
            .cloned()
            .unwrap_or_else(|| self.fallback.clone());

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        match step {
            Step::Return(value) => Ok(value),
            Step::Fail(err) => Err(err),
            Step::Hang => std::future::pending().await,
            Step::Panic => panic!("scripted oracle panic for {key}"),
        }
    }
}

/// Extraction fake that returns `profile(candidate_id)` for each of `count` inputs.
pub(super) fn extractor(count: usize) -> Scripted<CandidateProfile> {
    (0..count).fold(
        Scripted::new(Step::Fail(OracleError::Rejected(
            "unknown document".to_string(),
        ))),
        |scripted, position| {
            let key = candidate_key(position);
            let profile = profile(&key);
            scripted.script(&key, Step::Return(profile))
        },
    )
}

#[async_trait]
impl ExtractionOracle for Scripted<CandidateProfile> {
    async fn extract(&self, input: &RawCandidateInput) -> Result<CandidateProfile, OracleError> {
        self.respond(&input.candidate_id.0).await
    }
}

#[async_trait]
impl SkillsOracle for Scripted<f64> {
    async fn match_skills(
        &self,
        profile: &CandidateProfile,
        _job: &JobDescription,
    ) -> Result<SkillsAssessment, OracleError> {
        let score = self.respond(&profile.personal_info.name).await?;
        Ok(SkillsAssessment {
            score,
            matched_skills: vec!["Rust".to_string()],
            missing_skills: vec!["PostgreSQL".to_string()],
            rationale: None,
        })
    }
}

#[async_trait]
impl CulturalOracle for Scripted<f64> {
    async fn assess_culture(
        &self,
        profile: &CandidateProfile,
        _job: &JobDescription,
    ) -> Result<CulturalAssessment, OracleError> {
        let score = self.respond(&profile.personal_info.name).await?;
        Ok(CulturalAssessment {
            score,
            dimensions: [("Ownership".to_string(), score)].into_iter().collect(),
            rationale: None,
        })
    }
}

/// The three fakes behind an [`OracleClient`], kept for call-count assertions.
pub(super) struct Oracles {
    pub(super) extraction: Arc<Scripted<CandidateProfile>>,
    pub(super) skills: Arc<Scripted<f64>>,
    pub(super) cultural: Arc<Scripted<f64>>,
}

impl Oracles {
    pub(super) fn new(
        extraction: Scripted<CandidateProfile>,
        skills: Scripted<f64>,
        cultural: Scripted<f64>,
    ) -> Self {
        Self {
            extraction: Arc::new(extraction),
            skills: Arc::new(skills),
            cultural: Arc::new(cultural),
        }
    }

    /// Every candidate extracts and scores skills 0.9 and cultural 0.8.
    pub(super) fn healthy(count: usize) -> Self {
        Self::new(
            extractor(count),
            Scripted::new(Step::Return(0.9)),
            Scripted::new(Step::Return(0.8)),
        )
    }

    pub(super) fn client(&self) -> OracleClient {
        OracleClient::new(OracleSet::new(
            self.extraction.clone(),
            self.skills.clone(),
            self.cultural.clone(),
        ))
        .with_timeouts(OracleTimeouts::uniform(ORACLE_TIMEOUT))
    }
}

/// Hand-built outcome for report and gate tests.
pub(super) fn outcome(
    position: usize,
    overall_score: Option<f64>,
    tier: Option<Tier>,
    qualified: bool,
) -> EvaluationOutcome {
    let key = candidate_key(position);
    EvaluationOutcome {
        candidate_id: CandidateId(key.clone()),
        position,
        filename: format!("{key}.pdf"),
        status: if overall_score.is_some() {
            OutcomeStatus::Complete
        } else {
            OutcomeStatus::FailedExtraction
        },
        contact: Some(profile(&key).contact()),
        confidence: None,
        subscores: Vec::new(),
        experience_score: None,
        overall_score,
        tier,
        qualified,
        failures: Vec::<StageFailure>::new(),
    }
}

pub(super) fn report(outcomes: Vec<EvaluationOutcome>) -> BatchReport {
    BatchReport::from_outcomes(job().id, Utc::now(), outcomes, false)
}

#[derive(Default)]
pub(super) struct MemoryRepository {
    reports: Mutex<HashMap<JobId, BatchReport>>,
    unavailable: bool,
}

impl MemoryRepository {
    pub(super) fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }
}

impl EvaluationRepository for MemoryRepository {
    fn save_report(&self, report: &BatchReport) -> Result<(), RepositoryError> {
        if self.unavailable {
            return Err(RepositoryError::Unavailable("disk full".to_string()));
        }
        self.reports
            .lock()
            .expect("repository lock")
            .insert(report.job_id.clone(), report.clone());
        Ok(())
    }

    fn fetch_report(&self, job_id: &JobId) -> Result<Option<BatchReport>, RepositoryError> {
        if self.unavailable {
            return Err(RepositoryError::Unavailable("disk full".to_string()));
        }
        Ok(self
            .reports
            .lock()
            .expect("repository lock")
            .get(job_id)
            .cloned())
    }
}

#[derive(Default)]
pub(super) struct MemoryDispatcher {
    events: Mutex<Vec<DispatchRequest>>,
    declined: Vec<CandidateId>,
}

impl MemoryDispatcher {
    pub(super) fn declining(candidate: &str) -> Self {
        Self {
            declined: vec![CandidateId(candidate.to_string())],
            ..Self::default()
        }
    }

    pub(super) fn events(&self) -> Vec<DispatchRequest> {
        self.events.lock().expect("dispatcher lock").clone()
    }
}

impl InterviewDispatcher for MemoryDispatcher {
    fn dispatch(&self, request: &DispatchRequest) -> Result<(), DispatchError> {
        if self.declined.contains(&request.candidate_id) {
            return Err(DispatchError::Declined("calendar full".to_string()));
        }
        self.events
            .lock()
            .expect("dispatcher lock")
            .push(request.clone());
        Ok(())
    }
}

use crate::cli::{OutputFormat, StrategyArg};
use crate::infra::{
    heuristic_oracles, oracle_client, oracle_set, InMemoryEvaluationRepository,
    LoggingInterviewDispatcher,
};
use clap::Args;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use talent_ai::config::AppConfig;
use talent_ai::error::AppError;
use talent_ai::workflows::screening::{
    BatchOrchestrator, CandidateId, ExperienceRequirement, JobDescription, JobId, OracleClient,
    OracleTimeouts, QualificationGate, RawCandidateInput, ScreeningRequest, ScreeningRun,
    ScreeningService,
};

#[derive(Args, Debug)]
pub(crate) struct ScreenArgs {
    /// Job description JSON file
    #[arg(long)]
    pub(crate) job: PathBuf,
    /// Directory of .txt/.md resumes, or a JSON array of candidate inputs
    #[arg(long)]
    pub(crate) candidates: PathBuf,
    /// Maximum candidates evaluated at once (defaults to SCREENING_MAX_CONCURRENCY)
    #[arg(long)]
    pub(crate) concurrency: Option<usize>,
    /// Forward at most this many qualified candidates to scheduling
    #[arg(long)]
    pub(crate) top_n: Option<usize>,
    /// Per-call oracle timeout in seconds (defaults to ORACLE_TIMEOUT_SECS)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub(crate) timeout_secs: Option<u64>,
    /// Wall-clock budget for the whole batch in seconds
    #[arg(long)]
    pub(crate) deadline_secs: Option<u64>,
    #[arg(long, value_enum, default_value_t = StrategyArg::AllQualified)]
    pub(crate) strategy: StrategyArg,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub(crate) format: OutputFormat,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Maximum candidates evaluated at once (defaults to SCREENING_MAX_CONCURRENCY)
    #[arg(long)]
    pub(crate) concurrency: Option<usize>,
    /// Forward at most this many qualified candidates to scheduling
    #[arg(long)]
    pub(crate) top_n: Option<usize>,
    #[arg(long, value_enum, default_value_t = StrategyArg::AllQualified)]
    pub(crate) strategy: StrategyArg,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub(crate) format: OutputFormat,
}

type CliService = ScreeningService<InMemoryEvaluationRepository, LoggingInterviewDispatcher>;

fn build_service(client: OracleClient, config: &AppConfig, strategy: StrategyArg) -> CliService {
    ScreeningService::new(
        Arc::new(BatchOrchestrator::new(client, config.scoring.clone())),
        QualificationGate::new(strategy.into()),
        Arc::new(InMemoryEvaluationRepository::default()),
        Arc::new(LoggingInterviewDispatcher),
    )
}

pub(crate) async fn run_screen(args: ScreenArgs, config: &AppConfig) -> Result<(), AppError> {
    let ScreenArgs {
        job,
        candidates,
        concurrency,
        top_n,
        timeout_secs,
        deadline_secs,
        strategy,
        format,
    } = args;

    let job: JobDescription = serde_json::from_str(&tokio::fs::read_to_string(&job).await?)?;
    let inputs = load_candidates(&candidates).await?;

    let client = oracle_client(oracle_set(&config.screening)?, &config.screening);
    let service = build_service(client, config, strategy);

    let mut request = ScreeningRequest::new(
        job.clone(),
        inputs,
        concurrency.unwrap_or(config.screening.max_concurrency),
    );
    request.top_n = top_n;
    request.timeouts = timeout_secs.map(|secs| OracleTimeouts::uniform(Duration::from_secs(secs)));
    request.deadline = deadline_secs.map(Duration::from_secs);

    let run = service.screen(request).await?;
    render(&job, &run, format)
}

pub(crate) async fn run_demo(args: DemoArgs, config: &AppConfig) -> Result<(), AppError> {
    let DemoArgs {
        concurrency,
        top_n,
        strategy,
        format,
    } = args;

    let client = oracle_client(heuristic_oracles(), &config.screening);
    let service = build_service(client, config, strategy);

    let job = sample_job();
    let mut request = ScreeningRequest::new(
        job.clone(),
        sample_candidates(),
        concurrency.unwrap_or(config.screening.max_concurrency),
    );
    request.top_n = top_n;

    if format == OutputFormat::Text {
        println!("Candidate screening demo (offline heuristic oracles)");
    }
    let run = service.screen(request).await?;
    render(&job, &run, format)
}

pub(crate) fn run_policy(config: &AppConfig) -> Result<(), AppError> {
    let screening = &config.screening;
    let view = json!({
        "environment": format!("{:?}", config.environment).to_lowercase(),
        "scoring": config.scoring.config(),
        "screening": {
            "max_concurrency": screening.max_concurrency,
            "oracle_timeout_secs": screening.oracle_timeout.as_secs(),
            "max_retries": screening.max_retries,
            "oracle_backend": screening.oracle_base_url.as_deref().unwrap_or("offline-heuristics"),
        },
    });
    println!("{}", serde_json::to_string_pretty(&view)?);
    Ok(())
}

async fn load_candidates(path: &Path) -> Result<Vec<RawCandidateInput>, AppError> {
    let metadata = tokio::fs::metadata(path).await?;
    if !metadata.is_dir() {
        let raw = tokio::fs::read_to_string(path).await?;
        return Ok(serde_json::from_str(&raw)?);
    }

    let mut files = Vec::new();
    let mut entries = tokio::fs::read_dir(path).await?;
    while let Some(entry) = entries.next_entry().await? {
        let file = entry.path();
        let is_resume = file
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| matches!(ext, "txt" | "md"));
        if is_resume {
            files.push(file);
        }
    }
    files.sort();

    let mut inputs = Vec::with_capacity(files.len());
    for file in files {
        let document_text = tokio::fs::read_to_string(&file).await?;
        let stem = file
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let filename = file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        inputs.push(RawCandidateInput {
            candidate_id: CandidateId(stem),
            document_text,
            filename,
        });
    }
    Ok(inputs)
}

fn render(job: &JobDescription, run: &ScreeningRun, format: OutputFormat) -> Result<(), AppError> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(run)?);
        }
        OutputFormat::Text => render_text(job, run),
    }
    Ok(())
}

fn render_text(job: &JobDescription, run: &ScreeningRun) {
    let summary = &run.summary;
    println!("\nScreening report for {} ({})", job.title, job.id.0);
    println!(
        "- {} candidates | {} complete | {} partial | {} failed extraction | {} failed evaluation",
        summary.total,
        summary.complete,
        summary.partial,
        summary.failed_extraction,
        summary.failed_evaluation
    );
    println!(
        "- Tiers: {} strong | {} moderate | {} weak | {} qualified",
        summary.strong_match, summary.moderate_match, summary.weak_match, summary.qualified
    );
    if run.report.interrupted {
        println!("- Batch was interrupted before every candidate finished");
    }

    println!("Ranking:");
    for (index, outcome) in run.report.outcomes.iter().enumerate() {
        let name = outcome
            .contact
            .as_ref()
            .map(|contact| contact.name.as_str())
            .unwrap_or(outcome.filename.as_str());
        println!(
            "  {:>2}. {} [{}] {}",
            index + 1,
            name,
            outcome.status.label(),
            outcome.summary()
        );
    }

    if run.dispatches.is_empty() {
        println!("No candidates forwarded to interview scheduling");
    } else {
        println!("Interview dispatch:");
        for dispatch in &run.dispatches {
            let delivered = run.delivered.contains(&dispatch.candidate_id);
            println!(
                "  - #{} {} {} {:.1}% ({})",
                dispatch.rank,
                dispatch.candidate_id.0,
                dispatch.tier.label(),
                dispatch.overall_score * 100.0,
                if delivered { "queued" } else { "not delivered" }
            );
        }
    }
    for failure in &run.delivery_failures {
        println!(
            "  ! dispatch failed for {}: {}",
            failure.candidate_id.0, failure.reason
        );
    }
    if let Some(error) = &run.persistence_error {
        println!("  ! report was not persisted: {error}");
    }
}

fn sample_job() -> JobDescription {
    JobDescription {
        id: JobId("job-platform-001".to_string()),
        title: "Senior Platform Engineer".to_string(),
        required_skills: ["Rust", "PostgreSQL", "Kubernetes"]
            .into_iter()
            .map(str::to_string)
            .collect(),
        preferred_skills: ["Terraform", "Kafka"]
            .into_iter()
            .map(str::to_string)
            .collect(),
        culture_values: ["Ownership", "Collaboration", "Customer focus"]
            .into_iter()
            .map(str::to_string)
            .collect(),
        experience: ExperienceRequirement {
            minimum_years: Some(5.0),
            level: Some("senior".to_string()),
        },
    }
}

fn sample_candidates() -> Vec<RawCandidateInput> {
    let resumes = [
        (
            "amara_okafor.txt",
            "Name: Amara Okafor\nEmail: amara@example.com\nSkills: Rust, PostgreSQL, Kubernetes, Terraform, Kafka\nExperience: Staff Engineer | Northwind | 48 | Took ownership of the billing platform\nExperience: Engineer | Contoso | 30 | Close collaboration with customer support\nSummary: Platform engineer with a customer focus.",
        ),
        (
            "li_wei.txt",
            "Name: Li Wei\nEmail: li.wei@example.com\nSkills: Rust, PostgreSQL, Kubernetes\nExperience: Senior Engineer | Fabrikam | 60 | Led collaboration across three teams\nSummary: Builds reliable services and mentors peers.",
        ),
        (
            "diego_ramos.txt",
            "Name: Diego Ramos\nSkills: Java, Spring, PostgreSQL\nExperience: Backend Developer | Tailspin | 24\nSummary: Enjoys ownership of end-to-end features.",
        ),
        ("scan_0042.txt", "   "),
        (
            "priya_nair.txt",
            "Name: Priya Nair\nEmail: priya@example.com\nSkills: Kubernetes, Terraform, Go\nExperience: SRE | Litware | 72 | Ownership of on-call and incident reviews\nSummary: Customer focus through reliability work.",
        ),
    ];

    resumes
        .into_iter()
        .map(|(filename, text)| RawCandidateInput {
            candidate_id: CandidateId(filename.trim_end_matches(".txt").to_string()),
            document_text: text.to_string(),
            filename: filename.to_string(),
        })
        .collect()
}

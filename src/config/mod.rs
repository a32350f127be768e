use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::workflows::screening::scoring::{
    QualificationThresholds, ScoringConfig, ScoringConfigError, ScoringPolicy, ScoringWeights,
    TierBoundaries,
};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub telemetry: TelemetryConfig,
    pub scoring: ScoringPolicy,
    pub screening: ScreeningConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );
        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let defaults = ScoringConfig::default();
        let scoring = ScoringConfig {
            weights: ScoringWeights {
                skills: read_var("SKILLS_WEIGHT", defaults.weights.skills)?,
                cultural: read_var("CULTURAL_FIT_WEIGHT", defaults.weights.cultural)?,
                experience: read_var("EXPERIENCE_WEIGHT", defaults.weights.experience)?,
            },
            thresholds: QualificationThresholds {
                skills: read_var("SKILLS_MATCH_THRESHOLD", defaults.thresholds.skills)?,
                cultural: read_var("CULTURAL_FIT_THRESHOLD", defaults.thresholds.cultural)?,
            },
            tiers: TierBoundaries {
                strong: read_var("STRONG_MATCH_BOUNDARY", defaults.tiers.strong)?,
                moderate: read_var("MODERATE_MATCH_BOUNDARY", defaults.tiers.moderate)?,
            },
        };
        let scoring = ScoringPolicy::new(scoring)?;

        let max_concurrency: usize = read_var("SCREENING_MAX_CONCURRENCY", 4)?;
        if max_concurrency == 0 {
            return Err(ConfigError::InvalidConcurrency);
        }
        let oracle_timeout_secs: u64 = read_var("ORACLE_TIMEOUT_SECS", 30)?;
        if oracle_timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout);
        }
        let oracle_timeout = Duration::from_secs(oracle_timeout_secs);
        let max_retries = read_var("ORACLE_MAX_RETRIES", 0)?;
        let oracle_base_url = env::var("ORACLE_BASE_URL")
            .ok()
            .map(|value| value.trim().trim_end_matches('/').to_string())
            .filter(|value| !value.is_empty());
        let oracle_api_key = env::var("ORACLE_API_KEY")
            .ok()
            .filter(|value| !value.trim().is_empty());

        Ok(Self {
            environment,
            telemetry: TelemetryConfig { log_level },
            scoring,
            screening: ScreeningConfig {
                max_concurrency,
                oracle_timeout,
                max_retries,
                oracle_base_url,
                oracle_api_key,
            },
        })
    }
}

fn read_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidNumber { var: name }),
        _ => Ok(default),
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Batch execution settings and the oracle service location.
#[derive(Debug, Clone)]
pub struct ScreeningConfig {
    pub max_concurrency: usize,
    pub oracle_timeout: Duration,
    pub max_retries: usize,
    /// Unset selects the offline heuristic oracles.
    pub oracle_base_url: Option<String>,
    pub oracle_api_key: Option<String>,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidNumber { var: &'static str },
    InvalidConcurrency,
    InvalidTimeout,
    Scoring(ScoringConfigError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidNumber { var } => write!(f, "{var} must be a valid number"),
            ConfigError::InvalidConcurrency => {
                write!(f, "SCREENING_MAX_CONCURRENCY must be at least 1")
            }
            ConfigError::InvalidTimeout => write!(f, "ORACLE_TIMEOUT_SECS must be at least 1"),
            ConfigError::Scoring(err) => write!(f, "invalid scoring policy: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidNumber { .. }
            | ConfigError::InvalidConcurrency
            | ConfigError::InvalidTimeout => None,
            ConfigError::Scoring(err) => Some(err),
        }
    }
}

impl From<ScoringConfigError> for ConfigError {
    fn from(value: ScoringConfigError) -> Self {
        Self::Scoring(value)
    }
}

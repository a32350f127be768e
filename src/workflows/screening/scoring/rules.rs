use super::super::domain::{CandidateProfile, Dimension, JobDescription};
use super::config::ScoringWeights;

/// Years that count as a full experience score when the job states no minimum.
const DEFAULT_FULL_CREDIT_YEARS: f64 = 10.0;

/// Weighted mean over the dimensions that are present.
///
/// Absent dimensions drop out of both numerator and denominator, so the weights of
/// the present ones are renormalized to sum to one. Returns `None` when the present
/// dimensions carry no weight at all.
pub(crate) fn weighted_score(
    weights: &ScoringWeights,
    present: &[(Dimension, f64)],
) -> Option<f64> {
    let total_weight: f64 = present
        .iter()
        .map(|(dimension, _)| weights.weight(*dimension))
        .sum();

    if present.is_empty() || total_weight <= 0.0 {
        return None;
    }

    let score = present
        .iter()
        .map(|(dimension, value)| weights.weight(*dimension) / total_weight * value)
        .sum::<f64>();

    Some(score.clamp(0.0, 1.0))
}

/// Experience input derived from the profile's work history.
///
/// With a stated minimum the score is the fraction of it covered; otherwise ten years
/// earns full credit. No history and no stated minimum means there is no evidence.
pub(crate) fn estimate_experience(
    profile: &CandidateProfile,
    job: &JobDescription,
) -> Option<f64> {
    let minimum = job
        .experience
        .minimum_years
        .filter(|years| years.is_finite() && *years > 0.0);

    if profile.work_experience.is_empty() && minimum.is_none() {
        return None;
    }

    let years = profile.years_of_experience();
    let full_credit = minimum.unwrap_or(DEFAULT_FULL_CREDIT_YEARS);
    Some((years / full_credit).clamp(0.0, 1.0))
}

/// Drops non-finite values and clamps the rest into [0, 1].
pub(crate) fn sanitize(value: f64) -> Option<f64> {
    value.is_finite().then(|| value.clamp(0.0, 1.0))
}

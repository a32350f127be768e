//! Offline oracles used for demos and when no oracle service is configured.
//!
//! They read a line-oriented resume format (`Name: ...`, `Skills: a, b`,
//! `Experience: role | company | months`) and score by keyword overlap.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;

use super::{
    CulturalAssessment, CulturalOracle, ExtractionOracle, OracleError, SkillsAssessment,
    SkillsOracle,
};
use crate::workflows::screening::domain::{
    CandidateProfile, Education, JobDescription, PersonalInfo, RawCandidateInput, WorkExperience,
};

/// Parses `Key: value` resume lines into a profile.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResumeTextExtractor;

#[async_trait]
impl ExtractionOracle for ResumeTextExtractor {
    async fn extract(&self, input: &RawCandidateInput) -> Result<CandidateProfile, OracleError> {
        parse_resume(&input.document_text)
    }
}

pub fn parse_resume(text: &str) -> Result<CandidateProfile, OracleError> {
    if text.trim().is_empty() {
        return Err(OracleError::Rejected("document is empty".to_string()));
    }

    let mut personal_info = PersonalInfo::default();
    let mut work_experience = Vec::new();
    let mut education = Vec::new();
    let mut skills = BTreeSet::new();
    let mut certifications = Vec::new();
    let mut summary: Vec<String> = Vec::new();
    let mut recognized = false;

    for line in text.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        if value.is_empty() {
            continue;
        }

        match key.trim().to_ascii_lowercase().as_str() {
            "name" => personal_info.name = value.to_string(),
            "email" => personal_info.email = Some(value.to_string()),
            "phone" => personal_info.phone = Some(value.to_string()),
            "location" => personal_info.location = Some(value.to_string()),
            "skills" => skills.extend(split_list(value)),
            "certifications" => certifications.extend(split_list(value)),
            "summary" => summary.push(value.to_string()),
            "experience" => work_experience.push(parse_experience(value)),
            "education" => education.push(parse_education(value)),
            _ => continue,
        }
        recognized = true;
    }

    if !recognized {
        return Err(OracleError::InvalidResponse(
            "no structured fields found in document".to_string(),
        ));
    }

    Ok(CandidateProfile {
        personal_info,
        work_experience,
        education,
        skills,
        certifications,
        summary: (!summary.is_empty()).then(|| summary.join(" ")),
    })
}

fn split_list(value: &str) -> impl Iterator<Item = String> + '_ {
    value
        .split([',', ';'])
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
}

fn parse_experience(value: &str) -> WorkExperience {
    let mut parts = value.split('|').map(str::trim);
    let role = parts.next().unwrap_or_default().to_string();
    let company = parts.next().unwrap_or_default().to_string();
    let duration_months = parts.next().and_then(|months| months.parse::<u32>().ok());
    let highlights = parts
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect();

    WorkExperience {
        company,
        role,
        duration_months,
        highlights,
        technologies: Vec::new(),
    }
}

fn parse_education(value: &str) -> Education {
    let mut parts = value.split('|').map(str::trim);
    Education {
        degree: parts.next().unwrap_or_default().to_string(),
        institution: parts.next().unwrap_or_default().to_string(),
        graduation_year: parts.next().and_then(|year| year.parse::<u16>().ok()),
    }
}

/// Scores the share of required and preferred skills found in the profile.
#[derive(Debug, Clone, Copy)]
pub struct KeywordSkillsMatcher {
    required_weight: f64,
}

impl Default for KeywordSkillsMatcher {
    fn default() -> Self {
        Self {
            required_weight: 0.8,
        }
    }
}

#[async_trait]
impl SkillsOracle for KeywordSkillsMatcher {
    async fn match_skills(
        &self,
        profile: &CandidateProfile,
        job: &JobDescription,
    ) -> Result<SkillsAssessment, OracleError> {
        if job.required_skills.is_empty() && job.preferred_skills.is_empty() {
            return Err(OracleError::Rejected("job lists no skills to match".to_string()));
        }

        let held: BTreeSet<String> = profile
            .skills
            .iter()
            .chain(
                profile
                    .work_experience
                    .iter()
                    .flat_map(|entry| entry.technologies.iter()),
            )
            .map(|skill| normalize(skill))
            .collect();

        let (required_matched, missing): (Vec<&String>, Vec<&String>) = job
            .required_skills
            .iter()
            .partition(|skill| held.contains(&normalize(skill)));
        let preferred_matched: Vec<&String> = job
            .preferred_skills
            .iter()
            .filter(|skill| held.contains(&normalize(skill)))
            .collect();

        let required_ratio = ratio(required_matched.len(), job.required_skills.len());
        let preferred_ratio = ratio(preferred_matched.len(), job.preferred_skills.len());
        let score = match (
            job.required_skills.is_empty(),
            job.preferred_skills.is_empty(),
        ) {
            (false, true) => required_ratio,
            (true, false) => preferred_ratio,
            _ => {
                self.required_weight * required_ratio
                    + (1.0 - self.required_weight) * preferred_ratio
            }
        };

        Ok(SkillsAssessment {
            score,
            rationale: Some(format!(
                "{} of {} required and {} of {} preferred skills present",
                required_matched.len(),
                job.required_skills.len(),
                preferred_matched.len(),
                job.preferred_skills.len()
            )),
            matched_skills: required_matched
                .into_iter()
                .chain(preferred_matched)
                .cloned()
                .collect(),
            missing_skills: missing.into_iter().cloned().collect(),
        })
    }
}

/// Looks for evidence of each culture value in the candidate's summary and history.
#[derive(Debug, Clone, Copy)]
pub struct ValuesCultureMatcher {
    evidenced: f64,
    unevidenced: f64,
}

impl Default for ValuesCultureMatcher {
    fn default() -> Self {
        Self {
            evidenced: 1.0,
            unevidenced: 0.5,
        }
    }
}

#[async_trait]
impl CulturalOracle for ValuesCultureMatcher {
    async fn assess_culture(
        &self,
        profile: &CandidateProfile,
        job: &JobDescription,
    ) -> Result<CulturalAssessment, OracleError> {
        if job.culture_values.is_empty() {
            return Err(OracleError::Rejected("job lists no culture values".to_string()));
        }

        let evidence = profile
            .summary
            .iter()
            .cloned()
            .chain(profile.work_experience.iter().flat_map(|entry| {
                std::iter::once(entry.role.clone()).chain(entry.highlights.iter().cloned())
            }))
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();

        let dimensions: BTreeMap<String, f64> = job
            .culture_values
            .iter()
            .map(|value| {
                let score = if shows_value(&evidence, value) {
                    self.evidenced
                } else {
                    self.unevidenced
                };
                (value.clone(), score)
            })
            .collect();

        let evidenced = dimensions
            .values()
            .filter(|score| **score >= self.evidenced)
            .count();
        let score = dimensions.values().sum::<f64>() / dimensions.len() as f64;

        Ok(CulturalAssessment {
            score,
            rationale: Some(format!(
                "evidence found for {} of {} culture values",
                evidenced,
                dimensions.len()
            )),
            dimensions,
        })
    }
}

fn shows_value(evidence: &str, value: &str) -> bool {
    let value = normalize(value);
    evidence.contains(&value)
        || value
            .split_whitespace()
            .filter(|word| word.len() >= 4)
            .any(|word| evidence.contains(word))
}

fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

fn ratio(matched: usize, total: usize) -> f64 {
    if total == 0 {
        1.0
    } else {
        matched as f64 / total as f64
    }
}

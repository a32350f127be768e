use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Identifier wrapper for a candidate within a batch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CandidateId(pub String);

/// Identifier wrapper for job postings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JobId(pub String);

/// Read-only description of the role candidates are screened against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobDescription {
    pub id: JobId,
    pub title: String,
    #[serde(default)]
    pub required_skills: BTreeSet<String>,
    #[serde(default)]
    pub preferred_skills: BTreeSet<String>,
    #[serde(default)]
    pub culture_values: BTreeSet<String>,
    #[serde(default)]
    pub experience: ExperienceRequirement,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperienceRequirement {
    #[serde(default)]
    pub minimum_years: Option<f64>,
    #[serde(default)]
    pub level: Option<String>,
}

/// One batch entry: the document text of a resume and where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCandidateInput {
    pub candidate_id: CandidateId,
    pub document_text: String,
    pub filename: String,
}

/// Structured fields produced by the extraction oracle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub personal_info: PersonalInfo,
    #[serde(default)]
    pub work_experience: Vec<WorkExperience>,
    #[serde(default)]
    pub education: Vec<Education>,
    #[serde(default)]
    pub skills: BTreeSet<String>,
    #[serde(default)]
    pub certifications: Vec<String>,
    #[serde(default)]
    pub summary: Option<String>,
}

impl CandidateProfile {
    /// Names the first mandatory field that is missing, if any.
    pub fn missing_mandatory_field(&self) -> Option<&'static str> {
        if self.personal_info.name.trim().is_empty() {
            return Some("personal_info.name");
        }
        if self.skills.iter().all(|skill| skill.trim().is_empty()) {
            return Some("skills");
        }
        None
    }

    /// Total years of work history. Entries without a duration count as two years.
    pub fn years_of_experience(&self) -> f64 {
        self.work_experience
            .iter()
            .map(|entry| match entry.duration_months {
                Some(months) => f64::from(months) / 12.0,
                None => 2.0,
            })
            .sum()
    }

    pub fn contact(&self) -> CandidateContact {
        CandidateContact {
            name: self.personal_info.name.clone(),
            email: self.personal_info.email.clone(),
            phone: self.personal_info.phone.clone(),
        }
    }

    pub fn confidence(&self) -> ProfileConfidence {
        let personal = &self.personal_info;
        let identifying = [
            !personal.name.trim().is_empty(),
            personal.email.as_deref().is_some_and(|email| !email.is_empty()),
        ];
        let present = identifying.iter().filter(|present| **present).count();

        ProfileConfidence {
            personal_info: present as f64 / identifying.len() as f64,
            work_experience: presence(!self.work_experience.is_empty()),
            education: presence(!self.education.is_empty()),
            skills: presence(!self.skills.is_empty()),
        }
    }
}

fn presence(present: bool) -> f64 {
    if present {
        1.0
    } else {
        0.0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalInfo {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkExperience {
    pub company: String,
    pub role: String,
    #[serde(default)]
    pub duration_months: Option<u32>,
    #[serde(default)]
    pub highlights: Vec<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Education {
    pub institution: String,
    pub degree: String,
    #[serde(default)]
    pub graduation_year: Option<u16>,
}

/// Minimal contact data forwarded with a dispatch request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateContact {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Completeness of each extracted section, in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfileConfidence {
    pub personal_info: f64,
    pub work_experience: f64,
    pub education: f64,
    pub skills: f64,
}

/// Dimensions that contribute to the overall score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Skills,
    Cultural,
    Experience,
}

impl Dimension {
    pub const fn label(self) -> &'static str {
        match self {
            Dimension::Skills => "skills",
            Dimension::Cultural => "cultural",
            Dimension::Experience => "experience",
        }
    }
}

/// A validated oracle judgment for one dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubScore {
    pub value: f64,
    pub detail: SubScoreDetail,
}

impl SubScore {
    pub fn dimension(&self) -> Dimension {
        match self.detail {
            SubScoreDetail::Skills { .. } => Dimension::Skills,
            SubScoreDetail::Cultural { .. } => Dimension::Cultural,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "dimension", rename_all = "snake_case")]
pub enum SubScoreDetail {
    Skills {
        matched_skills: Vec<String>,
        missing_skills: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        rationale: Option<String>,
    },
    Cultural {
        dimensions: BTreeMap<String, f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        rationale: Option<String>,
    },
}

/// Which step of a candidate's evaluation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    Extraction,
    Skills,
    Cultural,
}

/// Coarse failure cause, safe to show to reviewers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCause {
    Timeout,
    InvalidResponse,
    Unavailable,
    Rejected,
    Cancelled,
    Aborted,
}

impl FailureCause {
    pub const fn label(self) -> &'static str {
        match self {
            FailureCause::Timeout => "timed out",
            FailureCause::InvalidResponse => "returned an invalid response",
            FailureCause::Unavailable => "was unavailable",
            FailureCause::Rejected => "rejected the request",
            FailureCause::Cancelled => "was cancelled",
            FailureCause::Aborted => "aborted unexpectedly",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageFailure {
    pub stage: FailureStage,
    pub cause: FailureCause,
}

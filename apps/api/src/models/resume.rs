use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::lenient::opt_year;

/// A resume uploaded by the user. Owned by the upload service; read-only here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ResumeDocument {
    pub id: Uuid,
    pub user_id: Uuid,
    #[sqlx(rename = "resume_url")]
    pub url: String,
    #[sqlx(rename = "resume_name")]
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ResumeDocument {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Untitled Resume")
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Structured resume profile extracted by the model
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeProject {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeExperience {
    #[serde(default)]
    pub job_title: String,
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeEducation {
    #[serde(default)]
    pub degree: String,
    #[serde(default)]
    pub institution: String,
    #[serde(default, deserialize_with = "opt_year")]
    pub year: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeCertification {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub issuing_organization: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeAward {
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "opt_year")]
    pub year: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeVolunteering {
    #[serde(default)]
    pub organization_name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumePublication {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub publication_name: String,
    #[serde(default, deserialize_with = "opt_year")]
    pub year: Option<i32>,
}

/// Structured resume content. Field names follow the JSON schema the model is
/// prompted with, including the two keys that contain spaces.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedResumeProfile {
    #[serde(rename = "languages and technologies", default)]
    pub languages_and_technologies: Vec<String>,
    #[serde(default)]
    pub projects: Vec<ResumeProject>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub qualifications: Vec<String>,
    #[serde(default)]
    pub experience: Vec<ResumeExperience>,
    #[serde(default)]
    pub education: Vec<ResumeEducation>,
    #[serde(default)]
    pub certifications: Vec<ResumeCertification>,
    #[serde(default)]
    pub awards: Vec<ResumeAward>,
    #[serde(rename = "volunteer experience", default)]
    pub volunteer_experience: Vec<ResumeVolunteering>,
    #[serde(default)]
    pub publications: Vec<ResumePublication>,
    #[serde(default)]
    pub summary: String,
}

impl ParsedResumeProfile {
    /// True when no section carries anything, which is what any JSON object
    /// without schema keys decodes to.
    pub fn is_empty(&self) -> bool {
        self.languages_and_technologies.is_empty()
            && self.projects.is_empty()
            && self.skills.is_empty()
            && self.qualifications.is_empty()
            && self.experience.is_empty()
            && self.education.is_empty()
            && self.certifications.is_empty()
            && self.awards.is_empty()
            && self.volunteer_experience.is_empty()
            && self.publications.is_empty()
            && self.summary.trim().is_empty()
    }
}

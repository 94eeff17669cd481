use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::jobs::identity::JobFingerprint;
use crate::models::lenient::bool_or_string;

/// Separator used to flatten highlight lists into a single column.
/// Lossy when an item itself contains ", ".
pub const HIGHLIGHT_DELIMITER: &str = ", ";

/// The three highlight lists a job-search source attaches to a listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobHighlights {
    #[serde(rename = "Qualifications", default)]
    pub qualifications: Vec<String>,
    #[serde(rename = "Benefits", default)]
    pub benefits: Vec<String>,
    #[serde(rename = "Responsibilities", default)]
    pub responsibilities: Vec<String>,
}

/// A job listing as delivered by the external job-search source.
/// No unique id is supplied; identity is derived with [`JobFingerprint`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobListing {
    pub employer_name: String,
    #[serde(default)]
    pub employer_website: Option<String>,
    #[serde(default)]
    pub job_publisher: Option<String>,
    #[serde(default)]
    pub job_employment_type: Option<String>,
    pub job_title: String,
    #[serde(default)]
    pub job_apply_link: Option<String>,
    #[serde(default)]
    pub job_description: Option<String>,
    #[serde(default, deserialize_with = "bool_or_string")]
    pub job_is_remote: bool,
    #[serde(default)]
    pub job_posted_at_datetime_utc: Option<String>,
    #[serde(default)]
    pub job_location: String,
    #[serde(default)]
    pub job_highlights: JobHighlights,
}

impl JobListing {
    pub fn fingerprint(&self) -> JobFingerprint {
        JobFingerprint::of(self)
    }
}

/// Lifecycle label stored next to the two flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    #[default]
    Saved,
    Favorited,
    Applied,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Saved => "saved",
            JobStatus::Favorited => "favorited",
            JobStatus::Applied => "applied",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "saved" => Ok(JobStatus::Saved),
            "favorited" => Ok(JobStatus::Favorited),
            "applied" => Ok(JobStatus::Applied),
            other => Err(format!("unknown job status '{other}'")),
        }
    }
}

/// One of the two independent booleans on a job record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobFlag {
    Favorite,
    Applied,
}

impl JobFlag {
    pub fn column(&self) -> &'static str {
        match self {
            JobFlag::Favorite => "is_favorite",
            JobFlag::Applied => "is_applied",
        }
    }

    pub fn other(&self) -> JobFlag {
        match self {
            JobFlag::Favorite => JobFlag::Applied,
            JobFlag::Applied => JobFlag::Favorite,
        }
    }

    /// Status a record carries when this flag alone keeps it alive.
    pub fn status(&self) -> JobStatus {
        match self {
            JobFlag::Favorite => JobStatus::Favorited,
            JobFlag::Applied => JobStatus::Applied,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            JobFlag::Favorite => "favorites",
            JobFlag::Applied => "applied",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobRecordRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub fingerprint: String,
    pub employer_name: String,
    pub employer_website: Option<String>,
    pub job_publisher: Option<String>,
    pub job_employment_type: Option<String>,
    pub job_title: String,
    pub job_apply_link: Option<String>,
    pub job_description: Option<String>,
    pub job_is_remote: bool,
    pub job_posted_at_datetime_utc: Option<String>,
    pub job_location: String,
    pub job_highlights_qualifications: Option<String>,
    pub job_highlights_responsibilities: Option<String>,
    pub job_highlights_benefits: Option<String>,
    pub status: String,
    pub is_favorite: bool,
    pub is_applied: bool,
    pub created_at: DateTime<Utc>,
}

impl JobRecordRow {
    pub fn flag(&self, flag: JobFlag) -> bool {
        match flag {
            JobFlag::Favorite => self.is_favorite,
            JobFlag::Applied => self.is_applied,
        }
    }
}

/// Insert payload: a listing flattened for storage plus its initial flags.
#[derive(Debug, Clone)]
pub struct NewJobRecord {
    pub user_id: Uuid,
    pub fingerprint: String,
    pub employer_name: String,
    pub employer_website: Option<String>,
    pub job_publisher: Option<String>,
    pub job_employment_type: Option<String>,
    pub job_title: String,
    pub job_apply_link: Option<String>,
    pub job_description: Option<String>,
    pub job_is_remote: bool,
    pub job_posted_at_datetime_utc: Option<String>,
    pub job_location: String,
    pub job_highlights_qualifications: Option<String>,
    pub job_highlights_responsibilities: Option<String>,
    pub job_highlights_benefits: Option<String>,
    pub status: JobStatus,
    pub is_favorite: bool,
    pub is_applied: bool,
}

impl NewJobRecord {
    /// A fresh record carrying only `flag`.
    pub fn flagged(user_id: Uuid, listing: &JobListing, flag: JobFlag) -> Self {
        let highlights = &listing.job_highlights;
        Self {
            user_id,
            fingerprint: listing.fingerprint().into_string(),
            employer_name: listing.employer_name.clone(),
            employer_website: listing.employer_website.clone(),
            job_publisher: listing.job_publisher.clone(),
            job_employment_type: listing.job_employment_type.clone(),
            job_title: listing.job_title.clone(),
            job_apply_link: listing.job_apply_link.clone(),
            job_description: listing.job_description.clone(),
            job_is_remote: listing.job_is_remote,
            job_posted_at_datetime_utc: listing.job_posted_at_datetime_utc.clone(),
            job_location: listing.job_location.clone(),
            job_highlights_qualifications: join_highlights(&highlights.qualifications),
            job_highlights_responsibilities: join_highlights(&highlights.responsibilities),
            job_highlights_benefits: join_highlights(&highlights.benefits),
            status: flag.status(),
            is_favorite: flag == JobFlag::Favorite,
            is_applied: flag == JobFlag::Applied,
        }
    }
}

/// Partial update; `None` leaves the column untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct JobRecordPatch {
    pub is_favorite: Option<bool>,
    pub is_applied: Option<bool>,
    pub status: Option<JobStatus>,
}

impl JobRecordPatch {
    pub fn set_flag(flag: JobFlag, value: bool) -> Self {
        match flag {
            JobFlag::Favorite => Self {
                is_favorite: Some(value),
                ..Self::default()
            },
            JobFlag::Applied => Self {
                is_applied: Some(value),
                ..Self::default()
            },
        }
    }

    pub fn with_status(mut self, status: JobStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Whether applying this patch to `row` would change anything.
    pub fn changes(&self, row: &JobRecordRow) -> bool {
        self.is_favorite.is_some_and(|v| v != row.is_favorite)
            || self.is_applied.is_some_and(|v| v != row.is_applied)
            || self.status.is_some_and(|s| s.as_str() != row.status)
    }

    pub fn apply_to(&self, row: &mut JobRecordRow) {
        if let Some(v) = self.is_favorite {
            row.is_favorite = v;
        }
        if let Some(v) = self.is_applied {
            row.is_applied = v;
        }
        if let Some(s) = self.status {
            row.status = s.as_str().to_string();
        }
    }
}

/// A stored job as returned to callers: the original listing shape plus flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: Uuid,
    pub fingerprint: String,
    #[serde(flatten)]
    pub listing: JobListing,
    pub status: JobStatus,
    pub is_favorite: bool,
    pub is_applied: bool,
    pub created_at: DateTime<Utc>,
}

impl From<JobRecordRow> for JobRecord {
    fn from(row: JobRecordRow) -> Self {
        let status = row.status.parse().unwrap_or_else(|e| {
            tracing::warn!("Job record {} has {e}; reporting as saved", row.id);
            JobStatus::Saved
        });
        Self {
            id: row.id,
            fingerprint: row.fingerprint,
            listing: JobListing {
                employer_name: row.employer_name,
                employer_website: row.employer_website,
                job_publisher: row.job_publisher,
                job_employment_type: row.job_employment_type,
                job_title: row.job_title,
                job_apply_link: row.job_apply_link,
                job_description: row.job_description,
                job_is_remote: row.job_is_remote,
                job_posted_at_datetime_utc: row.job_posted_at_datetime_utc,
                job_location: row.job_location,
                job_highlights: JobHighlights {
                    qualifications: split_highlights(row.job_highlights_qualifications.as_deref()),
                    benefits: split_highlights(row.job_highlights_benefits.as_deref()),
                    responsibilities: split_highlights(
                        row.job_highlights_responsibilities.as_deref(),
                    ),
                },
            },
            status,
            is_favorite: row.is_favorite,
            is_applied: row.is_applied,
            created_at: row.created_at,
        }
    }
}

/// Empty lists are stored as NULL.
pub fn join_highlights(items: &[String]) -> Option<String> {
    if items.is_empty() {
        None
    } else {
        Some(items.join(HIGHLIGHT_DELIMITER))
    }
}

pub fn split_highlights(stored: Option<&str>) -> Vec<String> {
    match stored {
        Some(s) if !s.is_empty() => s.split(HIGHLIGHT_DELIMITER).map(String::from).collect(),
        _ => Vec::new(),
    }
}

//! Job identity: the only place a listing's fingerprint is derived.
//!
//! The job-search source supplies no stable id, so a job is identified by
//! employer, title and location. Distinct postings sharing all three collapse
//! onto one fingerprint; that collision is accepted.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::job::JobListing;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobFingerprint(String);

impl JobFingerprint {
    /// `normalize(employer) + "-" + normalize(title) + "-" + normalize(location)`.
    pub fn of(listing: &JobListing) -> Self {
        Self::from_parts(
            &listing.employer_name,
            &listing.job_title,
            &listing.job_location,
        )
    }

    pub fn from_parts(employer_name: &str, job_title: &str, job_location: &str) -> Self {
        Self(format!(
            "{}-{}-{}",
            normalize(employer_name),
            normalize(job_title),
            normalize(job_location)
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for JobFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lowercase, with every whitespace run collapsed to a single hyphen.
fn normalize(part: &str) -> String {
    part.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(employer: &str, title: &str, location: &str) -> JobListing {
        JobListing {
            employer_name: employer.to_string(),
            job_title: title.to_string(),
            job_location: location.to_string(),
            ..JobListing::default()
        }
    }

    #[test]
    fn test_basic_fingerprint() {
        let fp = JobFingerprint::of(&listing("Acme", "Senior Engineer", "New York, NY"));
        assert_eq!(fp.as_str(), "acme-senior-engineer-new-york,-ny");
    }

    #[test]
    fn test_case_and_whitespace_insensitive() {
        let a = JobFingerprint::of(&listing("Acme Corp", "Engineer", "Remote"));
        let b = JobFingerprint::of(&listing("ACME   corp", "engineer\t", "  remote"));
        assert_eq!(a, b);
    }

    #[test]
    fn test_other_fields_do_not_affect_identity() {
        let a = listing("Acme", "Engineer", "Remote");
        let mut b = a.clone();
        b.job_description = Some("Totally different text".to_string());
        b.job_is_remote = true;
        b.job_apply_link = Some("https://acme.example/jobs/1".to_string());
        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn test_stable_across_calls() {
        let l = listing("Initech", "TPS Analyst", "Austin, TX");
        assert_eq!(JobFingerprint::of(&l), JobFingerprint::of(&l));
    }

    #[test]
    fn test_distinct_jobs_differ() {
        let a = JobFingerprint::of(&listing("Acme", "Engineer", "Remote"));
        let b = JobFingerprint::of(&listing("Acme", "Engineer", "Berlin"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_empty_location() {
        let fp = JobFingerprint::of(&listing("Acme", "Engineer", ""));
        assert_eq!(fp.to_string(), "acme-engineer-");
    }
}

//! In-memory `JobRepository` with the same semantics as the Postgres one.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::errors::AppError;
use crate::jobs::repository::JobRepository;
use crate::models::job::{JobFlag, JobListing, JobRecordPatch, JobRecordRow, NewJobRecord};

#[derive(Default)]
pub struct InMemoryJobRepository {
    rows: Mutex<Vec<JobRecordRow>>,
    fail_writes: AtomicBool,
}

impl InMemoryJobRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent write fail like a lost database connection.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn rows(&self) -> Vec<JobRecordRow> {
        self.rows.lock().unwrap().clone()
    }

    fn check_writable(&self) -> Result<(), AppError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            Err(AppError::Database(sqlx::Error::PoolTimedOut))
        } else {
            Ok(())
        }
    }
}

fn same_identity(row: &JobRecordRow, user_id: Uuid, title: &str, employer: &str, location: &str) -> bool {
    row.user_id == user_id
        && row.job_title == title
        && row.employer_name == employer
        && row.job_location == location
}

#[async_trait]
impl JobRepository for InMemoryJobRepository {
    async fn find_by_identity(
        &self,
        user_id: Uuid,
        listing: &JobListing,
    ) -> Result<Option<JobRecordRow>, AppError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|r| {
                same_identity(
                    r,
                    user_id,
                    &listing.job_title,
                    &listing.employer_name,
                    &listing.job_location,
                )
            })
            .cloned())
    }

    async fn find_flagged(
        &self,
        user_id: Uuid,
        flag: JobFlag,
    ) -> Result<Vec<JobRecordRow>, AppError> {
        let mut found: Vec<JobRecordRow> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.user_id == user_id && r.flag(flag))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }

    async fn create(&self, record: NewJobRecord) -> Result<JobRecordRow, AppError> {
        self.check_writable()?;
        let mut rows = self.rows.lock().unwrap();

        if let Some(existing) = rows.iter_mut().find(|r| {
            same_identity(
                r,
                record.user_id,
                &record.job_title,
                &record.employer_name,
                &record.job_location,
            )
        }) {
            existing.is_favorite |= record.is_favorite;
            existing.is_applied |= record.is_applied;
            if record.is_applied {
                existing.status = record.status.as_str().to_string();
            }
            return Ok(existing.clone());
        }

        // Strictly increasing timestamps keep newest-first ordering deterministic.
        let created_at = rows
            .iter()
            .map(|r| r.created_at)
            .max()
            .map(|latest| latest + Duration::milliseconds(1))
            .unwrap_or_else(Utc::now);

        let row = JobRecordRow {
            id: Uuid::new_v4(),
            user_id: record.user_id,
            fingerprint: record.fingerprint,
            employer_name: record.employer_name,
            employer_website: record.employer_website,
            job_publisher: record.job_publisher,
            job_employment_type: record.job_employment_type,
            job_title: record.job_title,
            job_apply_link: record.job_apply_link,
            job_description: record.job_description,
            job_is_remote: record.job_is_remote,
            job_posted_at_datetime_utc: record.job_posted_at_datetime_utc,
            job_location: record.job_location,
            job_highlights_qualifications: record.job_highlights_qualifications,
            job_highlights_responsibilities: record.job_highlights_responsibilities,
            job_highlights_benefits: record.job_highlights_benefits,
            status: record.status.as_str().to_string(),
            is_favorite: record.is_favorite,
            is_applied: record.is_applied,
            created_at,
        };
        rows.push(row.clone());
        Ok(row)
    }

    async fn update(&self, id: Uuid, patch: JobRecordPatch) -> Result<(), AppError> {
        self.check_writable()?;
        if let Some(row) = self.rows.lock().unwrap().iter_mut().find(|r| r.id == id) {
            patch.apply_to(row);
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        self.check_writable()?;
        self.rows.lock().unwrap().retain(|r| r.id != id);
        Ok(())
    }

    async fn delete_if_unflagged(&self, id: Uuid) -> Result<bool, AppError> {
        self.check_writable()?;
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|r| r.id != id || r.is_favorite || r.is_applied);
        Ok(rows.len() < before)
    }

    async fn update_flagged(
        &self,
        user_id: Uuid,
        flag: JobFlag,
        patch: JobRecordPatch,
    ) -> Result<u64, AppError> {
        self.check_writable()?;
        let mut updated = 0;
        for row in self
            .rows
            .lock()
            .unwrap()
            .iter_mut()
            .filter(|r| r.user_id == user_id && r.flag(flag))
        {
            patch.apply_to(row);
            updated += 1;
        }
        Ok(updated)
    }

    async fn delete_unflagged(&self, user_id: Uuid) -> Result<u64, AppError> {
        self.check_writable()?;
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|r| r.user_id != user_id || r.is_favorite || r.is_applied);
        Ok((before - rows.len()) as u64)
    }
}

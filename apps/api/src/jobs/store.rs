//! Job record store: the favorite / applied dual-flag lifecycle.
//!
//! Invariant: a record exists for (user, job) iff at least one of its flags
//! is true. The moment both fall false the row is deleted.
//!
//! Toggles are lookup-then-write with no concurrency token. Two concurrent
//! toggles on the same job can lose one flag flip (last write wins per row).
//! Concurrent creates are merged by the repository's conflict handling, and a
//! clear that keeps a row always follows up with a conditional delete so two
//! racing clears cannot leave a flagless record behind.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::jobs::cache::RecordCache;
use crate::jobs::identity::JobFingerprint;
use crate::jobs::repository::JobRepository;
use crate::models::job::{
    JobFlag, JobListing, JobRecord, JobRecordPatch, JobStatus, NewJobRecord,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppliedStats {
    pub total_applied: usize,
    pub unique_companies: usize,
}

#[derive(Clone)]
pub struct JobRecordStore {
    repo: Arc<dyn JobRepository>,
    cache: Arc<dyn RecordCache>,
}

impl JobRecordStore {
    pub fn new(repo: Arc<dyn JobRepository>, cache: Arc<dyn RecordCache>) -> Self {
        Self { repo, cache }
    }

    pub async fn favorite(
        &self,
        user: &CurrentUser,
        listing: &JobListing,
    ) -> Result<JobFingerprint, AppError> {
        self.mutate(user, self.set_flag(user, listing, JobFlag::Favorite)).await
    }

    pub async fn unfavorite(
        &self,
        user: &CurrentUser,
        listing: &JobListing,
    ) -> Result<JobFingerprint, AppError> {
        self.mutate(user, self.clear_flag(user, listing, JobFlag::Favorite)).await
    }

    pub async fn apply(
        &self,
        user: &CurrentUser,
        listing: &JobListing,
    ) -> Result<JobFingerprint, AppError> {
        self.mutate(user, self.set_flag(user, listing, JobFlag::Applied)).await
    }

    pub async fn unapply(
        &self,
        user: &CurrentUser,
        listing: &JobListing,
    ) -> Result<JobFingerprint, AppError> {
        self.mutate(user, self.clear_flag(user, listing, JobFlag::Applied)).await
    }

    pub async fn list_favorites(&self, user: &CurrentUser) -> Result<Vec<JobRecord>, AppError> {
        self.list(user, JobFlag::Favorite).await
    }

    pub async fn list_applied(&self, user: &CurrentUser) -> Result<Vec<JobRecord>, AppError> {
        self.list(user, JobFlag::Applied).await
    }

    pub async fn is_favorite(
        &self,
        user: &CurrentUser,
        listing: &JobListing,
    ) -> Result<bool, AppError> {
        self.has_flag(user, listing, JobFlag::Favorite).await
    }

    pub async fn is_applied(
        &self,
        user: &CurrentUser,
        listing: &JobListing,
    ) -> Result<bool, AppError> {
        self.has_flag(user, listing, JobFlag::Applied).await
    }

    pub async fn clear_favorites(&self, user: &CurrentUser) -> Result<(), AppError> {
        self.mutate(user, self.clear_all(user, JobFlag::Favorite)).await
    }

    pub async fn clear_applied(&self, user: &CurrentUser) -> Result<(), AppError> {
        self.mutate(user, self.clear_all(user, JobFlag::Applied)).await
    }

    pub async fn applied_stats(&self, user: &CurrentUser) -> Result<AppliedStats, AppError> {
        let applied = self.list_applied(user).await?;
        let companies: HashSet<&str> = applied
            .iter()
            .map(|r| r.listing.employer_name.as_str())
            .collect();
        Ok(AppliedStats {
            total_applied: applied.len(),
            unique_companies: companies.len(),
        })
    }

    // ────────────────────────────────────────────────────────────────────────
    // Lifecycle primitives
    // ────────────────────────────────────────────────────────────────────────

    /// Runs a mutation and drops the user's cached lists afterwards, whether
    /// or not the write went through.
    async fn mutate<T>(
        &self,
        user: &CurrentUser,
        op: impl std::future::Future<Output = Result<T, AppError>>,
    ) -> Result<T, AppError> {
        let result = op.await;
        self.cache.invalidate(user.id).await;
        result
    }

    async fn set_flag(
        &self,
        user: &CurrentUser,
        listing: &JobListing,
        flag: JobFlag,
    ) -> Result<JobFingerprint, AppError> {
        let fingerprint = listing.fingerprint();

        match self.repo.find_by_identity(user.id, listing).await? {
            Some(existing) => {
                let mut patch = JobRecordPatch::set_flag(flag, true);
                // Applying promotes the label; favoriting an applied job keeps "applied".
                if flag == JobFlag::Applied {
                    patch = patch.with_status(JobStatus::Applied);
                }
                if patch.changes(&existing) {
                    self.repo.update(existing.id, patch).await?;
                    info!("User {} set {:?} on {fingerprint}", user.id, flag);
                } else {
                    debug!("User {} already has {:?} on {fingerprint}", user.id, flag);
                }
            }
            None => {
                let record = NewJobRecord::flagged(user.id, listing, flag);
                let row = self.repo.create(record).await?;
                info!(
                    "User {} created job record {} ({fingerprint}) with {:?}",
                    user.id, row.id, flag
                );
            }
        }

        Ok(fingerprint)
    }

    async fn clear_flag(
        &self,
        user: &CurrentUser,
        listing: &JobListing,
        flag: JobFlag,
    ) -> Result<JobFingerprint, AppError> {
        let fingerprint = listing.fingerprint();

        let Some(existing) = self.repo.find_by_identity(user.id, listing).await? else {
            debug!("User {} cleared {:?} on untracked {fingerprint}", user.id, flag);
            return Ok(fingerprint);
        };

        let survivor = flag.other();
        if existing.flag(survivor) {
            let patch = JobRecordPatch::set_flag(flag, false).with_status(survivor.status());
            self.repo.update(existing.id, patch).await?;
            // A concurrent clear of the survivor may have read the row before
            // this update landed; whichever update lands last sweeps the row.
            if self.repo.delete_if_unflagged(existing.id).await? {
                info!(
                    "User {} cleared {:?} on {fingerprint}; record deleted after concurrent clear",
                    user.id, flag
                );
            } else {
                info!(
                    "User {} cleared {:?} on {fingerprint}; record kept as {}",
                    user.id,
                    flag,
                    survivor.status()
                );
            }
        } else {
            self.repo.delete(existing.id).await?;
            info!("User {} cleared {:?} on {fingerprint}; record deleted", user.id, flag);
        }

        Ok(fingerprint)
    }

    /// Drops `flag` from every record, then deletes the rows left with no flag.
    /// Surviving rows are labelled "saved" even though the other flag is still set.
    async fn clear_all(&self, user: &CurrentUser, flag: JobFlag) -> Result<(), AppError> {
        let patch = JobRecordPatch::set_flag(flag, false).with_status(JobStatus::Saved);
        let cleared = self.repo.update_flagged(user.id, flag, patch).await?;
        let deleted = self.repo.delete_unflagged(user.id).await?;
        info!(
            "User {} cleared {}: {cleared} records unflagged, {deleted} deleted",
            user.id,
            flag.label()
        );
        Ok(())
    }

    async fn list(&self, user: &CurrentUser, flag: JobFlag) -> Result<Vec<JobRecord>, AppError> {
        if let Some(cached) = self.cache.get(user.id, flag).await {
            return Ok(cached);
        }
        // Sampled before the read so a write landing mid-read voids the put.
        let generation = self.cache.generation(user.id).await;
        let records: Vec<JobRecord> = self
            .repo
            .find_flagged(user.id, flag)
            .await?
            .into_iter()
            .map(JobRecord::from)
            .collect();
        if let Some(generation) = generation {
            self.cache.put(user.id, flag, &records, generation).await;
        }
        Ok(records)
    }

    async fn has_flag(
        &self,
        user: &CurrentUser,
        listing: &JobListing,
        flag: JobFlag,
    ) -> Result<bool, AppError> {
        Ok(self
            .repo
            .find_by_identity(user.id, listing)
            .await?
            .is_some_and(|row| row.flag(flag)))
    }
}

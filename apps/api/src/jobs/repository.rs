//! Persistence boundary for job records.
//!
//! `JobRecordStore` only speaks to this trait. `PgJobRepository` is the
//! production backend; tests use the in-memory one in `jobs::memory`.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::job::{JobFlag, JobListing, JobRecordPatch, JobRecordRow, NewJobRecord};

#[async_trait]
pub trait JobRepository: Send + Sync {
    /// Exact match on (user, title, employer, location).
    async fn find_by_identity(
        &self,
        user_id: Uuid,
        listing: &JobListing,
    ) -> Result<Option<JobRecordRow>, AppError>;

    /// All records with `flag` set, newest first.
    async fn find_flagged(&self, user_id: Uuid, flag: JobFlag)
        -> Result<Vec<JobRecordRow>, AppError>;

    /// Inserts a record. If a concurrent request created the same identity
    /// first, the flags are merged into that row instead.
    async fn create(&self, record: NewJobRecord) -> Result<JobRecordRow, AppError>;

    async fn update(&self, id: Uuid, patch: JobRecordPatch) -> Result<(), AppError>;

    async fn delete(&self, id: Uuid) -> Result<(), AppError>;

    /// Deletes the record only if both flags are false. Returns whether a row
    /// was removed.
    async fn delete_if_unflagged(&self, id: Uuid) -> Result<bool, AppError>;

    /// Applies `patch` to every record of the user with `flag` set.
    async fn update_flagged(
        &self,
        user_id: Uuid,
        flag: JobFlag,
        patch: JobRecordPatch,
    ) -> Result<u64, AppError>;

    /// Removes every record of the user with both flags false.
    async fn delete_unflagged(&self, user_id: Uuid) -> Result<u64, AppError>;
}

#[derive(Clone)]
pub struct PgJobRepository {
    pool: PgPool,
}

impl PgJobRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobRepository for PgJobRepository {
    async fn find_by_identity(
        &self,
        user_id: Uuid,
        listing: &JobListing,
    ) -> Result<Option<JobRecordRow>, AppError> {
        Ok(sqlx::query_as::<_, JobRecordRow>(
            r#"
            SELECT * FROM job_records
            WHERE user_id = $1 AND job_title = $2 AND employer_name = $3 AND job_location = $4
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(&listing.job_title)
        .bind(&listing.employer_name)
        .bind(&listing.job_location)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn find_flagged(
        &self,
        user_id: Uuid,
        flag: JobFlag,
    ) -> Result<Vec<JobRecordRow>, AppError> {
        let sql = format!(
            "SELECT * FROM job_records WHERE user_id = $1 AND {} ORDER BY created_at DESC",
            flag.column()
        );
        Ok(sqlx::query_as::<_, JobRecordRow>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn create(&self, record: NewJobRecord) -> Result<JobRecordRow, AppError> {
        // On conflict the flags are OR-ed; an incoming apply also takes over the status.
        Ok(sqlx::query_as::<_, JobRecordRow>(
            r#"
            INSERT INTO job_records
                (user_id, fingerprint, employer_name, employer_website, job_publisher,
                 job_employment_type, job_title, job_apply_link, job_description,
                 job_is_remote, job_posted_at_datetime_utc, job_location,
                 job_highlights_qualifications, job_highlights_responsibilities,
                 job_highlights_benefits, status, is_favorite, is_applied)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            ON CONFLICT ON CONSTRAINT job_records_identity DO UPDATE SET
                is_favorite = job_records.is_favorite OR EXCLUDED.is_favorite,
                is_applied  = job_records.is_applied OR EXCLUDED.is_applied,
                status = CASE WHEN EXCLUDED.is_applied THEN EXCLUDED.status ELSE job_records.status END
            RETURNING *
            "#,
        )
        .bind(record.user_id)
        .bind(&record.fingerprint)
        .bind(&record.employer_name)
        .bind(&record.employer_website)
        .bind(&record.job_publisher)
        .bind(&record.job_employment_type)
        .bind(&record.job_title)
        .bind(&record.job_apply_link)
        .bind(&record.job_description)
        .bind(record.job_is_remote)
        .bind(&record.job_posted_at_datetime_utc)
        .bind(&record.job_location)
        .bind(&record.job_highlights_qualifications)
        .bind(&record.job_highlights_responsibilities)
        .bind(&record.job_highlights_benefits)
        .bind(record.status.as_str())
        .bind(record.is_favorite)
        .bind(record.is_applied)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn update(&self, id: Uuid, patch: JobRecordPatch) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE job_records SET
                is_favorite = COALESCE($2, is_favorite),
                is_applied  = COALESCE($3, is_applied),
                status      = COALESCE($4, status)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(patch.is_favorite)
        .bind(patch.is_applied)
        .bind(patch.status.map(|s| s.as_str()))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM job_records WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_if_unflagged(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(
            "DELETE FROM job_records WHERE id = $1 AND NOT is_favorite AND NOT is_applied",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn update_flagged(
        &self,
        user_id: Uuid,
        flag: JobFlag,
        patch: JobRecordPatch,
    ) -> Result<u64, AppError> {
        let sql = format!(
            r#"
            UPDATE job_records SET
                is_favorite = COALESCE($2, is_favorite),
                is_applied  = COALESCE($3, is_applied),
                status      = COALESCE($4, status)
            WHERE user_id = $1 AND {}
            "#,
            flag.column()
        );
        let result = sqlx::query(&sql)
            .bind(user_id)
            .bind(patch.is_favorite)
            .bind(patch.is_applied)
            .bind(patch.status.map(|s| s.as_str()))
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn delete_unflagged(&self, user_id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query(
            "DELETE FROM job_records WHERE user_id = $1 AND NOT is_favorite AND NOT is_applied",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}

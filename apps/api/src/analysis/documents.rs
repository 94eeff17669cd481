//! Read-only access to the caller's stored resume documents.
//!
//! Uploads happen elsewhere; this service never writes `resume_documents`.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::models::resume::ResumeDocument;

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// All documents owned by `user_id`, newest first.
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<ResumeDocument>, AppError>;
}

pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<ResumeDocument>, AppError> {
        let documents = sqlx::query_as::<_, ResumeDocument>(
            r#"
            SELECT id, user_id, resume_url, resume_name, created_at
            FROM resume_documents
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(documents)
    }
}

/// Resolves `resume_id` among the caller's own documents.
/// Another user's resume is indistinguishable from a missing one.
pub async fn find_owned(
    store: &dyn DocumentStore,
    user: &CurrentUser,
    resume_id: Uuid,
) -> Result<ResumeDocument, AppError> {
    store
        .list_for_user(user.id)
        .await?
        .into_iter()
        .find(|d| d.id == resume_id)
        .ok_or_else(|| AppError::NotFound(format!("Resume {resume_id} not found")))
}

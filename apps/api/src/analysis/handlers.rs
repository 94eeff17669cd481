//! Axum route handlers for resume documents and AI analysis.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::analysis::comparison::{self, ComparisonOutcome, ComparisonRequest};
use crate::analysis::extract::{self, ExtractedText};
use crate::analysis::ingestion::{self, IngestOutcome};
use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::models::resume::ResumeDocument;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ResumesResponse {
    pub resumes: Vec<ResumeDocument>,
}

/// GET /api/v1/resumes
pub async fn handle_list_resumes(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<ResumesResponse>, AppError> {
    let resumes = state.documents.list_for_user(user.id).await?;
    Ok(Json(ResumesResponse { resumes }))
}

/// POST /api/v1/resumes/:id/parse
///
/// Answers the parsed profile, the raw model text as a JSON string, or
/// `{"error": ...}`. Only ownership and store failures are HTTP errors.
pub async fn handle_parse_resume(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(resume_id): Path<Uuid>,
) -> Result<Json<IngestOutcome>, AppError> {
    let outcome = ingestion::ingest(
        &user,
        resume_id,
        state.documents.as_ref(),
        state.fetcher.as_ref(),
        state.model.as_ref(),
    )
    .await?;
    Ok(Json(outcome))
}

/// POST /api/v1/resumes/:id/text
pub async fn handle_extract_text(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(resume_id): Path<Uuid>,
) -> Result<Json<ExtractedText>, AppError> {
    let extracted = extract::extract_text(
        &user,
        resume_id,
        state.documents.as_ref(),
        state.fetcher.as_ref(),
    )
    .await?;
    Ok(Json(extracted))
}

/// POST /api/v1/analysis/compare
pub async fn handle_compare(
    State(state): State<AppState>,
    Json(request): Json<ComparisonRequest>,
) -> Result<Json<ComparisonOutcome>, AppError> {
    let outcome = comparison::compare(
        state.model.as_ref(),
        &request.resume,
        &request.job_description,
        request.is_structured_data,
    )
    .await?;
    Ok(Json(outcome))
}

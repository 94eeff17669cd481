//! Axum route handlers for the favorites / applied API.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::jobs::identity::JobFingerprint;
use crate::jobs::store::AppliedStats;
use crate::models::job::{JobListing, JobRecord};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct MutationResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<JobFingerprint>,
}

impl MutationResponse {
    fn for_job(fingerprint: JobFingerprint) -> Json<Self> {
        Json(Self {
            success: true,
            fingerprint: Some(fingerprint),
        })
    }

    fn done() -> Json<Self> {
        Json(Self {
            success: true,
            fingerprint: None,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct FavoritesResponse {
    pub favorites: Vec<JobRecord>,
}

#[derive(Debug, Serialize)]
pub struct AppliedResponse {
    pub applied: Vec<JobRecord>,
}

#[derive(Debug, Serialize)]
pub struct FlagCheckResponse {
    pub fingerprint: JobFingerprint,
    pub flagged: bool,
}

fn require_identity(listing: &JobListing) -> Result<(), AppError> {
    if listing.employer_name.trim().is_empty() || listing.job_title.trim().is_empty() {
        return Err(AppError::Validation(
            "employer_name and job_title are required".to_string(),
        ));
    }
    Ok(())
}

/// GET /api/v1/jobs/favorites
pub async fn handle_list_favorites(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<FavoritesResponse>, AppError> {
    let favorites = state.jobs.list_favorites(&user).await?;
    Ok(Json(FavoritesResponse { favorites }))
}

/// POST /api/v1/jobs/favorites
pub async fn handle_favorite(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(listing): Json<JobListing>,
) -> Result<Json<MutationResponse>, AppError> {
    require_identity(&listing)?;
    let fingerprint = state.jobs.favorite(&user, &listing).await?;
    Ok(MutationResponse::for_job(fingerprint))
}

/// POST /api/v1/jobs/favorites/remove
pub async fn handle_unfavorite(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(listing): Json<JobListing>,
) -> Result<Json<MutationResponse>, AppError> {
    let fingerprint = state.jobs.unfavorite(&user, &listing).await?;
    Ok(MutationResponse::for_job(fingerprint))
}

/// POST /api/v1/jobs/favorites/check
pub async fn handle_check_favorite(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(listing): Json<JobListing>,
) -> Result<Json<FlagCheckResponse>, AppError> {
    let flagged = state.jobs.is_favorite(&user, &listing).await?;
    Ok(Json(FlagCheckResponse {
        fingerprint: listing.fingerprint(),
        flagged,
    }))
}

/// DELETE /api/v1/jobs/favorites
pub async fn handle_clear_favorites(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<MutationResponse>, AppError> {
    state.jobs.clear_favorites(&user).await?;
    Ok(MutationResponse::done())
}

/// GET /api/v1/jobs/applied
pub async fn handle_list_applied(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<AppliedResponse>, AppError> {
    let applied = state.jobs.list_applied(&user).await?;
    Ok(Json(AppliedResponse { applied }))
}

/// POST /api/v1/jobs/applied
pub async fn handle_apply(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(listing): Json<JobListing>,
) -> Result<Json<MutationResponse>, AppError> {
    require_identity(&listing)?;
    let fingerprint = state.jobs.apply(&user, &listing).await?;
    Ok(MutationResponse::for_job(fingerprint))
}

/// POST /api/v1/jobs/applied/remove
pub async fn handle_unapply(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(listing): Json<JobListing>,
) -> Result<Json<MutationResponse>, AppError> {
    let fingerprint = state.jobs.unapply(&user, &listing).await?;
    Ok(MutationResponse::for_job(fingerprint))
}

/// POST /api/v1/jobs/applied/check
pub async fn handle_check_applied(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(listing): Json<JobListing>,
) -> Result<Json<FlagCheckResponse>, AppError> {
    let flagged = state.jobs.is_applied(&user, &listing).await?;
    Ok(Json(FlagCheckResponse {
        fingerprint: listing.fingerprint(),
        flagged,
    }))
}

/// DELETE /api/v1/jobs/applied
pub async fn handle_clear_applied(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<MutationResponse>, AppError> {
    state.jobs.clear_applied(&user).await?;
    Ok(MutationResponse::done())
}

/// GET /api/v1/jobs/applied/stats
pub async fn handle_applied_stats(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<AppliedStats>, AppError> {
    Ok(Json(state.jobs.applied_stats(&user).await?))
}

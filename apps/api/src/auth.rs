//! Caller identity.
//!
//! Sessions are issued upstream; the gateway forwards the authenticated user
//! id in `x-user-id`. Core operations take `&CurrentUser`, so they cannot be
//! invoked without one.

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::errors::AppError;

pub const USER_ID_HEADER: &str = "x-user-id";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: Uuid,
}

impl CurrentUser {
    /// Absent or malformed ids are `Unauthenticated`.
    pub fn from_session(raw: Option<&str>) -> Result<Self, AppError> {
        raw.map(str::trim)
            .filter(|s| !s.is_empty())
            .and_then(|s| Uuid::parse_str(s).ok())
            .map(|id| CurrentUser { id })
            .ok_or(AppError::Unauthorized)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok());
        CurrentUser::from_session(raw)
    }
}

//! Caller identity extractors
//!
//! User identity is resolved upstream and forwarded in a trusted header;
//! administrative calls present a shared token.

use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::debug;
use uuid::Uuid;

use crate::{
    constants::{ADMIN_TOKEN_HEADER, USER_ID_HEADER},
    error::AppError,
    state::AppState,
    utils::secrets_match,
};

/// Participant identified by the forwarded user id header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Participant {
    pub id: Uuid,
}

impl<S> FromRequestParts<S> for Participant
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| {
                debug!(path = %parts.uri.path(), "Missing user id header");
                AppError::Unauthorized
            })?;

        let id = Uuid::parse_str(raw.trim()).map_err(|_| {
            AppError::Validation(format!("{} must be a UUID", USER_ID_HEADER))
        })?;

        Ok(Participant { id })
    }
}

/// Proof that the caller presented the administrative token
#[derive(Debug, Clone, Copy)]
pub struct Admin;

impl FromRequestParts<AppState> for Admin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // No configured token means the admin surface is disabled
        let Some(expected) = state.config().admin.reset_token.as_deref() else {
            debug!("Admin call rejected: no admin token configured");
            return Err(AppError::Unauthorized);
        };

        let presented = parts
            .headers
            .get(ADMIN_TOKEN_HEADER)
            .and_then(|h| h.to_str().ok())
            .ok_or(AppError::Unauthorized)?;

        if !secrets_match(presented, expected) {
            debug!(path = %parts.uri.path(), "Admin call rejected: token mismatch");
            return Err(AppError::Unauthorized);
        }

        Ok(Admin)
    }
}

//! Authentication extractor
//!
//! Extracts and validates bearer tokens from the Authorization header.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use warden_core::{Permissions, Snowflake};

use crate::response::ApiError;
use crate::state::AppState;

/// Authenticated actor extracted from the bearer token
#[derive(Debug, Clone)]
pub struct AuthActor {
    /// Actor ID from the token subject
    pub actor_id: Snowflake,
    /// Permission scopes carried by the token
    pub permissions: Permissions,
}

impl AuthActor {
    /// Create a new AuthActor
    pub fn new(actor_id: Snowflake, permissions: Permissions) -> Self {
        Self {
            actor_id,
            permissions,
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthActor
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // Extract the Authorization header
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::MissingAuth)?;

        // Get the app state to access the verifier
        let app_state = AppState::from_ref(state);

        // Validate the token
        let claims = app_state
            .verifier()
            .validate_access_token(bearer.token())
            .map_err(|e| {
                tracing::warn!(error = %e, "Invalid access token");
                ApiError::InvalidAuthFormat
            })?;

        // Extract actor ID from claims
        let actor_id = claims.actor_id().map_err(|e| {
            tracing::warn!(error = %e, "Invalid actor ID in token");
            ApiError::InvalidAuthFormat
        })?;

        Ok(AuthActor::new(actor_id, claims.permissions()))
    }
}

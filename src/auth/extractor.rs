use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::warn;

use crate::shared::{AppError, AppState};

/// Identity of the caller, taken from an `Authorization: Bearer` token.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthenticatedUser(pub String);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|header| header.to_str().ok())
            .ok_or_else(|| {
                warn!("Missing Authorization header in request");
                AppError::Unauthorized("Missing authorization header".to_string())
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            warn!("Invalid Authorization header format (expected Bearer token)");
            AppError::Unauthorized("Invalid authorization header format".to_string())
        })?;

        let claims = state.token_config.validate_token(token).map_err(|e| {
            warn!(error = %e, "JWT authentication failed");
            AppError::Unauthorized("Invalid token".to_string())
        })?;

        Ok(AuthenticatedUser(claims.sub))
    }
}

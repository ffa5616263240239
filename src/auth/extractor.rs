use axum::extract::{FromRef, FromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::auth::config::AuthConfig;
use crate::auth::models::AuthenticatedUser;
use crate::auth::token::verify_token;
use crate::error::AppError;

/// Resolves the calling user from an `Authorization: Bearer <token>` header.
///
/// Rejects with [`AppError::Auth`] (401) when the header is missing,
/// malformed, or carries a token that does not verify.
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    AuthConfig: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Auth("Authentication required".into()))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Auth("Invalid authorization header format".into()))?;

        let config = AuthConfig::from_ref(state);
        verify_token(&config.jwt_secret, token.trim())
    }
}

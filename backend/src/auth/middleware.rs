//! Bearer-token extractor for protected routes

use super::jwt::TokenKind;
use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::FromRef,
    http::{header::AUTHORIZATION, request::Parts},
};
use fitness_coach_shared::errors::AuthError;
use uuid::Uuid;

/// Signed-in account, taken from a valid access token
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub account_id: Uuid,
}

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(AuthError::MissingToken)?
            .strip_prefix("Bearer ")
            .ok_or(AuthError::InvalidToken)?;

        let claims = app_state
            .jwt()
            .validate(token, TokenKind::Access)
            .map_err(|e| ApiError::Unauthorized(format!("Invalid token: {}", e)))?;

        let account_id = claims
            .account_id()
            .map_err(|_| ApiError::from(AuthError::InvalidToken))?;

        Ok(AuthUser { account_id })
    }
}

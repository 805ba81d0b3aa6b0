//! Account service: sign-up, login, refresh and lookup
//!
//! Credentials are checked by the configured user store; this layer only
//! validates input and issues the session tokens.

use crate::auth::{JwtService, TokenKind};
use crate::error::ApiError;
use crate::users::UserStore;
use fitness_coach_shared::errors::AuthError;
use fitness_coach_shared::types::{
    Account, AuthTokens, LoginRequest, SessionResponse, SignupRequest,
};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

pub struct UserService;

impl UserService {
    /// Create an account and sign it in
    pub async fn sign_up(
        users: &dyn UserStore,
        jwt: &JwtService,
        request: SignupRequest,
    ) -> Result<SessionResponse, ApiError> {
        request.validate()?;
        let account = users
            .sign_up(&request.name, &request.email, &request.password)
            .await?;
        let tokens = jwt.issue_pair(account.id)?;
        Ok(SessionResponse {
            user: account,
            tokens,
        })
    }

    pub async fn login(
        users: &dyn UserStore,
        jwt: &JwtService,
        request: LoginRequest,
    ) -> Result<SessionResponse, ApiError> {
        request.validate()?;
        let account = users.sign_in(&request.email, &request.password).await?;
        info!(account_id = %account.id, "Signed in");
        let tokens = jwt.issue_pair(account.id)?;
        Ok(SessionResponse {
            user: account,
            tokens,
        })
    }

    /// Exchange a refresh token for a new pair
    pub async fn refresh(
        users: &dyn UserStore,
        jwt: &JwtService,
        refresh_token: &str,
    ) -> Result<AuthTokens, ApiError> {
        let claims = jwt
            .validate(refresh_token, TokenKind::Refresh)
            .map_err(|e| ApiError::Unauthorized(format!("Invalid refresh token: {}", e)))?;
        let account_id = claims
            .account_id()
            .map_err(|_| ApiError::from(AuthError::InvalidToken))?;

        // Deleted accounts cannot keep refreshing
        Self::account(users, account_id).await?;

        Ok(jwt.issue_pair(account_id)?)
    }

    /// Look up the signed-in account
    pub async fn account(users: &dyn UserStore, account_id: Uuid) -> Result<Account, ApiError> {
        users
            .find_by_id(account_id)
            .await?
            .ok_or_else(|| ApiError::Unauthorized("Account not found".to_string()))
    }
}

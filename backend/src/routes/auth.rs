//! Authentication routes: sign-up, login, token refresh and the current
//! account.

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::services::UserService;
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use fitness_coach_shared::types::{
    Account, AuthTokens, LoginRequest, RefreshRequest, SessionResponse, SignupRequest,
};

/// Create auth routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/me", get(me))
}

/// POST /api/v1/auth/signup
async fn signup(
    State(state): State<AppState>,
    body: Result<Json<SignupRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<SessionResponse>)> {
    let Json(req) = body.map_err(ApiError::from)?;
    let session = UserService::sign_up(state.users(), state.jwt(), req).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// POST /api/v1/auth/login
async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<SessionResponse>> {
    let Json(req) = body.map_err(ApiError::from)?;
    let session = UserService::login(state.users(), state.jwt(), req).await?;
    Ok(Json(session))
}

/// POST /api/v1/auth/refresh
async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<Json<AuthTokens>> {
    let tokens = UserService::refresh(state.users(), state.jwt(), &req.refresh_token).await?;
    Ok(Json(tokens))
}

/// GET /api/v1/auth/me
async fn me(State(state): State<AppState>, auth: AuthUser) -> ApiResult<Json<Account>> {
    let account = UserService::account(state.users(), auth.account_id).await?;
    Ok(Json(account))
}

//! Plan routes: generation, the current plan and its exports

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::services::{ExportService, PlanService};
use crate::state::AppState;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use fitness_coach_shared::models::UserProfile;
use fitness_coach_shared::pdf::PDF_FILENAME;
use fitness_coach_shared::types::{
    CurrentPlanResponse, GeneratePlanResponse, NarrationQuery, NarrationResponse,
};

pub fn plan_routes() -> Router<AppState> {
    Router::new()
        .route("/generate", post(generate))
        .route("/current", get(current).delete(clear))
        .route("/current/pdf", get(pdf))
        .route("/current/narration", get(narration))
}

/// POST /api/v1/plans/generate
async fn generate(
    State(state): State<AppState>,
    auth: AuthUser,
    body: Result<Json<UserProfile>, JsonRejection>,
) -> ApiResult<Json<GeneratePlanResponse>> {
    let Json(profile) = body.map_err(ApiError::from)?;
    let response = PlanService::generate(&state, auth.account_id, profile).await?;
    Ok(Json(response))
}

/// GET /api/v1/plans/current
async fn current(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<CurrentPlanResponse>> {
    Ok(Json(PlanService::current(&state, auth.account_id).await?))
}

/// DELETE /api/v1/plans/current
async fn clear(State(state): State<AppState>, auth: AuthUser) -> ApiResult<StatusCode> {
    PlanService::clear(&state, auth.account_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/plans/current/pdf
async fn pdf(State(state): State<AppState>, auth: AuthUser) -> ApiResult<impl IntoResponse> {
    let bytes = ExportService::pdf(&state, auth.account_id).await?;

    let disposition = format!("attachment; filename=\"{}\"", PDF_FILENAME);
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/pdf"),
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&disposition)
            .map_err(|e| ApiError::Internal(anyhow::anyhow!("Bad header value: {}", e)))?,
    );

    Ok((headers, bytes))
}

/// GET /api/v1/plans/current/narration?view=workout|diet
async fn narration(
    State(state): State<AppState>,
    auth: AuthUser,
    query: Result<Query<NarrationQuery>, QueryRejection>,
) -> ApiResult<Json<NarrationResponse>> {
    let Query(query) = query.map_err(|e| ApiError::validation(e.body_text()))?;
    Ok(Json(ExportService::narration(&state, auth.account_id, query.view).await?))
}

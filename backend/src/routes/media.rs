//! Illustration and motivation routes

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::services::MediaService;
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use fitness_coach_shared::types::{ImageRequest, ImageResponse, QuoteResponse};

pub fn media_routes() -> Router<AppState> {
    Router::new()
        .route("/images", post(illustrate))
        .route("/motivation", get(motivation))
}

/// POST /api/v1/images
async fn illustrate(
    State(state): State<AppState>,
    _auth: AuthUser,
    body: Result<Json<ImageRequest>, JsonRejection>,
) -> ApiResult<Json<ImageResponse>> {
    let Json(req) = body.map_err(|_| ApiError::BadRequest("Prompt missing".to_string()))?;
    Ok(Json(MediaService::illustration(&state.config().images, &req.prompt)?))
}

/// GET /api/v1/motivation
async fn motivation(State(state): State<AppState>) -> Json<QuoteResponse> {
    Json(MediaService::motivation(state.completion()).await)
}

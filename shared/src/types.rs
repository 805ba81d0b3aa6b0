//! API request and response types

use crate::models::{Plan, PlanShape, StoredPlan};
use crate::render::Tab;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

/// Authentication tokens response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Sign-up request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub password: String,
}

/// Refresh request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Account as returned by the user store, without credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Sign-up and login response: the account plus a session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    pub user: Account,
    #[serde(flatten)]
    pub tokens: AuthTokens,
}

/// Plan generation response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratePlanResponse {
    pub plan: Plan,
    /// Day counts against the 7/7 contract; not enforced
    pub shape: PlanShape,
}

/// Current plan response
pub type CurrentPlanResponse = StoredPlan;

/// Narration query
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NarrationQuery {
    #[serde(default)]
    pub view: Tab,
}

/// Narration response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NarrationResponse {
    pub view: Tab,
    pub text: String,
}

/// Illustration request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageRequest {
    pub prompt: String,
}

/// Illustration response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageResponse {
    pub image_url: String,
    /// Shown until the image has loaded
    pub placeholder: String,
    pub error_placeholder: String,
}

/// Motivation quote response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteResponse {
    pub quote: String,
}

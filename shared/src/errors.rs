//! Error types for the AI Fitness Coach application

use crate::validation::ValidationError;
use thiserror::Error;

/// Failures of the plan generation pipeline
///
/// Every variant aborts the pipeline. None of them are retried, and none of
/// them leave a partial plan behind.
#[derive(Error, Debug)]
pub enum PlanError {
    /// No credential configured for the completion endpoint
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Non-success status or unexpected response shape from a collaborator
    #[error("Upstream error ({status}): {body}")]
    Upstream { status: u16, body: String },

    /// The model output could not be parsed as a plan
    #[error("Malformed plan: {0}")]
    MalformedPlan(String),

    #[error("Validation error: {}", .0.user_message())]
    Validation(ValidationError),
}

impl PlanError {
    /// Upstream failure that never produced an HTTP status (connect, read)
    pub fn transport(message: impl Into<String>) -> Self {
        PlanError::Upstream {
            status: 0,
            body: message.into(),
        }
    }
}

impl From<ValidationError> for PlanError {
    fn from(err: ValidationError) -> Self {
        PlanError::Validation(err)
    }
}

/// Plan Store failures
#[derive(Error, Debug, PartialEq, Eq)]
pub enum StoreError {
    /// The durable mirror could not be read or written
    #[error("Plan mirror error: {0}")]
    Mirror(String),

    /// The durable mirror holds something that is not a stored plan
    #[error("Stored plan is corrupt: {0}")]
    Corrupt(String),

    /// A newer generation was started (or the plan was cleared) after this one
    #[error("Generation {ticket} was superseded by generation {latest}")]
    StaleGeneration { ticket: u64, latest: u64 },
}

/// Authentication error types
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Email already registered")]
    EmailTaken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Missing token")]
    MissingToken,
}

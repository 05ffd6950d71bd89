use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

use crate::services::eligibility::EligibilityVerdict;

#[derive(Debug, Clone, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// One or more access predicates failed; the full verdict is returned so
    /// the caller can see which.
    #[error("Not eligible to attempt this quiz")]
    NotEligible(EligibilityVerdict),

    /// A consumed ticket already exists for this (student, quiz) pair.
    #[error("Quiz has already been submitted: {0}")]
    DuplicateSubmission(String),

    /// The attempt ticket expired or was cleaned up before submission.
    #[error("Attempt session has expired: {0}")]
    AttemptExpired(String),

    /// The persistence layer was unavailable or timed out before any state
    /// was committed; the whole operation is safe to retry.
    #[error("Transient storage error: {0}")]
    TransientError(String),

    /// The ticket was consumed but the result write failed. Not retryable:
    /// a retry would hit `DuplicateSubmission`. Operators reconcile from the
    /// answers logged at consumption time.
    #[error("Submission accepted but result could not be stored: {0}")]
    PostConsumptionFailure(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl AppError {
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::NotEligible(_) => "NOT_ELIGIBLE",
            AppError::DuplicateSubmission(_) => "DUPLICATE_SUBMISSION",
            AppError::AttemptExpired(_) => "ATTEMPT_EXPIRED",
            AppError::TransientError(_) => "TRANSIENT_ERROR",
            AppError::PostConsumptionFailure(_) => "POST_CONSUMPTION_PERSISTENCE_FAILURE",
            AppError::InternalError(_) => "INTERNAL_ERROR",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
    pub error_code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasons: Option<EligibilityVerdict>,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotEligible(_) => StatusCode::FORBIDDEN,
            AppError::DuplicateSubmission(_) => StatusCode::CONFLICT,
            AppError::AttemptExpired(_) => StatusCode::FORBIDDEN,
            AppError::TransientError(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::PostConsumptionFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let reasons = match self {
            AppError::NotEligible(verdict) => Some(verdict.clone()),
            _ => None,
        };

        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.to_string(),
            code: self.status_code().as_u16(),
            error_code: self.error_code(),
            reasons,
        })
    }
}

impl From<mongodb::error::Error> for AppError {
    fn from(err: mongodb::error::Error) -> Self {
        AppError::TransientError(err.to_string())
    }
}

impl From<mongodb::bson::error::Error> for AppError {
    fn from(err: mongodb::bson::error::Error) -> Self {
        AppError::InternalError(format!("BSON serialization error: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::ValidationError(err.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;

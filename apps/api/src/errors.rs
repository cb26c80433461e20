use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::classifier::ClassifierError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    /// The source document could not be read or contained no text.
    #[error("Document extraction failed: {0}")]
    DocumentExtraction(String),

    /// A mandatory profile attribute is still missing after every fallback.
    #[error("Profile assembly failed: {reason}")]
    ProfileAssembly { reason: String },

    /// The remote classifier failed. Fatal only to the field (or step) that asked.
    #[error("Field classification failed: {0}")]
    FieldClassification(#[from] ClassifierError),

    #[error("Submission cancelled by user")]
    VerificationCancelled,

    #[error("Verification timed out after {elapsed_secs}s (limit {limit_secs}s)")]
    VerificationTimeout { elapsed_secs: u64, limit_secs: u64 },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Short, friendly text for terminal front ends.
    pub fn user_message(&self) -> String {
        match self {
            AppError::DocumentExtraction(_) => {
                "Could not read the profile document. Check that it is a text-based PDF export."
                    .to_string()
            }
            AppError::ProfileAssembly { reason } => {
                format!("Could not build a profile from this document: {reason}.")
            }
            AppError::VerificationCancelled => {
                "Application cancelled. Nothing was submitted.".to_string()
            }
            AppError::VerificationTimeout { limit_secs, .. } => {
                format!("Verification took longer than {limit_secs} seconds. Please start again.")
            }
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::DocumentExtraction(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "DOCUMENT_EXTRACTION_FAILED",
                msg.clone(),
            ),
            AppError::ProfileAssembly { reason } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "PROFILE_ASSEMBLY_FAILED",
                reason.clone(),
            ),
            AppError::FieldClassification(e) => {
                tracing::error!("Classifier error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "FIELD_CLASSIFICATION_FAILED",
                    "The classification service could not be reached".to_string(),
                )
            }
            AppError::VerificationCancelled => (
                StatusCode::CONFLICT,
                "VERIFICATION_CANCELLED",
                self.user_message(),
            ),
            AppError::VerificationTimeout { .. } => (
                StatusCode::REQUEST_TIMEOUT,
                "VERIFICATION_TIMEOUT",
                self.to_string(),
            ),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Browser(msg) => {
                tracing::error!("Browser error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "BROWSER_ERROR",
                    "The browser session failed".to_string(),
                )
            }
            AppError::Storage(msg) => {
                tracing::error!("Storage error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE_ERROR",
                    "A storage error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::intake::IntakeError;
use crate::screening::batch::InputError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Intake(#[from] IntakeError),

    #[error("Malformed form data: {0}")]
    Multipart(#[from] MultipartError),

    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Message safe to show on the page. Internal details stay in the logs.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::Input(e) => e.to_string(),
            AppError::Intake(e) => e.to_string(),
            AppError::Multipart(e) => format!("Could not read the submitted form: {e}"),
            AppError::Template(_) | AppError::Internal(_) => {
                "An internal server error occurred".to_string()
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AppError::Input(_) => (StatusCode::BAD_REQUEST, "INPUT_ERROR"),
            AppError::Intake(IntakeError::Io { .. }) => {
                tracing::error!("Intake error: {self}");
                (StatusCode::INTERNAL_SERVER_ERROR, "INTAKE_ERROR")
            }
            AppError::Intake(_) => (StatusCode::BAD_REQUEST, "INTAKE_ERROR"),
            AppError::Multipart(_) => (StatusCode::BAD_REQUEST, "MULTIPART_ERROR"),
            AppError::Template(e) => {
                tracing::error!("Template error: {e}");
                (StatusCode::INTERNAL_SERVER_ERROR, "TEMPLATE_ERROR")
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": self.user_message()
            }
        }));

        (status, body).into_response()
    }
}

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::models::ValidationError;

const DELIVERY_SUGGESTION: &str = "Email could not be delivered through any configured provider. \
     Check RESEND_API_KEY or SMTP_USER/SMTP_PASS (Gmail needs an app password), \
     and whether the host blocks outbound SMTP ports.";

const NOT_CONFIGURED_SUGGESTION: &str =
    "Set RESEND_API_KEY, or SMTP_USER and SMTP_PASS, and restart the service.";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Missing required fields")]
    Validation(#[from] ValidationError),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Email service not configured")]
    NotConfigured,

    #[error("Failed to send email after {attempts} attempt(s)")]
    DeliveryFailed { attempts: usize },

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::Validation(err) => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": "Missing required fields",
                    "missing": err.missing,
                }),
            ),
            AppError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": msg, "code": 400 }),
            ),
            AppError::NotConfigured => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({
                    "success": false,
                    "error": "Email service not configured",
                    "suggestion": NOT_CONFIGURED_SUGGESTION,
                }),
            ),
            AppError::DeliveryFailed { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({
                    "success": false,
                    "error": "Failed to send email",
                    "suggestion": DELIVERY_SUGGESTION,
                }),
            ),
            AppError::InternalError(detail) => {
                tracing::error!(error = %detail, "Unhandled error while serving request");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal server error", "code": 500 }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::InternalError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

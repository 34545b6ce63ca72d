//! HTTP error response conversion
//!
//! This module provides HTTP-specific error response conversion for AppError.
//!
//! **Preferred handler pattern:** Return `Result<impl IntoResponse, HttpAppError>`. Use
//! `AppError` (or types that implement `Into<AppError>`) for errors and `.map_err(Into::into)`
//! so they become `HttpAppError` and render consistently (status, body, logging).

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use carbazar_core::{AppError, ErrorMetadata, LogLevel};
use carbazar_storage::{PublishError, StageError};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Always false; mirrors the `success` flag of the happy-path body so
    /// clients can branch on one field.
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    /// Machine-readable error code for programmatic handling
    pub code: String,
    /// Whether this error is recoverable (can be retried)
    pub recoverable: bool,
    /// Suggested action for the client (e.g., "Reduce attachment size")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
}

/// Wrapper type for AppError to implement IntoResponse
/// This is necessary because of Rust's orphan rules - we can't implement
/// IntoResponse (external trait) for AppError (external type from carbazar-core)
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        })
    }
}

/// Malformed multipart bodies render as a 400 in our ErrorResponse format.
impl From<MultipartError> for HttpAppError {
    fn from(err: MultipartError) -> Self {
        HttpAppError(AppError::BadRequest(format!(
            "Invalid multipart body: {}",
            err.body_text()
        )))
    }
}

// Convert domain errors to HttpAppError (avoids orphan rule: we impl for local HttpAppError)

impl From<StageError> for HttpAppError {
    fn from(err: StageError) -> Self {
        let app = match err {
            StageError::Io(e) => AppError::Internal(format!("IO error: {}", e)),
            StageError::TooManyFiles { .. }
            | StageError::FileTooLarge { .. }
            | StageError::InvalidFilename(_) => AppError::Staging(err.to_string()),
        };
        HttpAppError(app)
    }
}

impl From<PublishError> for HttpAppError {
    fn from(err: PublishError) -> Self {
        let app = match err {
            PublishError::UploadFailed(msg) | PublishError::InvalidResponse(msg) => {
                AppError::Publish(msg)
            }
            PublishError::IoError(e) => AppError::Internal(format!("IO error: {}", e)),
            PublishError::ConfigError(msg) => AppError::Internal(msg),
        };
        HttpAppError(app)
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_type = error_type, "Error occurred");
        }
    }
}

fn is_production_env() -> bool {
    std::env::var("ENVIRONMENT")
        .or_else(|_| std::env::var("APP_ENV"))
        .map(|env| env.to_lowercase() == "production" || env.to_lowercase() == "prod")
        .unwrap_or(false)
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;
        let is_production = is_production_env();

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        // Always hide details in production for security; in non-production, only show details for non-sensitive errors.
        let body = if is_production || app_error.is_sensitive() {
            Json(ErrorResponse {
                success: false,
                error: app_error.client_message(),
                details: None,
                error_type: None,
                code: app_error.error_code().to_string(),
                recoverable: app_error.is_recoverable(),
                suggested_action: app_error.suggested_action().map(String::from),
            })
        } else {
            Json(ErrorResponse {
                success: false,
                error: app_error.client_message(),
                details: Some(app_error.detailed_message()),
                error_type: Some(app_error.error_type().to_string()),
                code: app_error.error_code().to_string(),
                recoverable: app_error.is_recoverable(),
                suggested_action: app_error.suggested_action().map(String::from),
            })
        };

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_stage_error_too_many_files() {
        let stage_err = StageError::TooManyFiles { count: 11, max: 10 };
        let HttpAppError(app_err) = stage_err.into();
        match app_err {
            AppError::Staging(msg) => {
                assert!(msg.contains("11"));
                assert!(msg.contains("10"));
            }
            _ => panic!("Expected Staging variant"),
        }
    }

    /// Any staging rejection renders as a 500: the submission endpoint
    /// reserves non-200 statuses for "staging itself failed".
    #[test]
    fn test_from_stage_error_file_too_large() {
        let stage_err = StageError::FileTooLarge {
            filename: "car.jpg".to_string(),
            size: 20_000_000,
            max: 10_485_760,
        };
        let HttpAppError(app_err) = stage_err.into();
        match &app_err {
            AppError::Staging(msg) => assert!(msg.contains("car.jpg")),
            _ => panic!("Expected Staging variant"),
        }
        assert_eq!(app_err.http_status_code(), 500);
    }

    #[test]
    fn test_from_publish_error_upload_failed() {
        let publish_err = PublishError::UploadFailed("status 401: bad signature".to_string());
        let HttpAppError(app_err) = publish_err.into();
        match &app_err {
            AppError::Publish(msg) => assert!(msg.contains("401")),
            _ => panic!("Expected Publish variant"),
        }
        // Provider text stays internal
        assert_eq!(app_err.client_message(), "Failed to publish attachment");
    }

    /// Verifies the public error response contract: serialized ErrorResponse has "success"
    /// (always false), "error", "code", "recoverable", and optionally "details" /
    /// "error_type" / "suggested_action".
    #[test]
    fn test_error_response_shape() {
        let response = ErrorResponse {
            success: false,
            error: "Not found".to_string(),
            details: Some("Resource not found".to_string()),
            error_type: Some("NotFound".to_string()),
            code: "NOT_FOUND".to_string(),
            recoverable: false,
            suggested_action: None,
        };
        let json = serde_json::to_value(&response).expect("serialize");
        assert_eq!(json.get("success").and_then(|v| v.as_bool()), Some(false));
        assert!(json.get("error").and_then(|v| v.as_str()).is_some());
        assert!(json.get("code").and_then(|v| v.as_str()).is_some());
        assert!(json.get("recoverable").and_then(|v| v.as_bool()).is_some());
        assert_eq!(json.get("code").and_then(|v| v.as_str()), Some("NOT_FOUND"));
    }
}

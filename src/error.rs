// SPDX-License-Identifier: MIT

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The user has no stored Strava credential. Recoverable by
    /// re-authorizing from the profile page.
    #[error("User not connected to Strava")]
    NotConnected,

    /// Strava rejected the authorization code exchange.
    #[error("Token exchange failed: {0}")]
    ExchangeFailed(String),

    /// Strava rejected the token refresh. The user must re-authorize;
    /// no retry is attempted for the current request.
    #[error("Token refresh failed: {0}")]
    RefreshFailed(String),

    /// An external call exceeded the configured timeout.
    #[error("Upstream request timed out")]
    Timeout,

    #[error("Resource not found: {0}")]
    NotFound(String),

    /// The caller is not allowed to perform the operation (e.g. deleting
    /// a challenge they did not create).
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Strava API error: {0}")]
    StravaApi(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Map a reqwest transport error, keeping timeouts distinguishable
    /// from other upstream failures.
    pub fn from_reqwest(err: &reqwest::Error, context: &str) -> Self {
        if err.is_timeout() {
            return AppError::Timeout;
        }
        AppError::StravaApi(format!("{}: {}", context, err))
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::NotConnected => (StatusCode::BAD_REQUEST, "not_connected", None),
            AppError::ExchangeFailed(msg) => (
                StatusCode::BAD_REQUEST,
                "exchange_failed",
                Some(msg.clone()),
            ),
            AppError::RefreshFailed(msg) => {
                (StatusCode::BAD_GATEWAY, "refresh_failed", Some(msg.clone()))
            }
            AppError::Timeout => (StatusCode::GATEWAY_TIMEOUT, "timeout", None),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", Some(msg.clone())),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", Some(msg.clone())),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
            AppError::StravaApi(msg) => {
                (StatusCode::BAD_GATEWAY, "strava_error", Some(msg.clone()))
            }
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;

// Error handling types for the API

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::fmt;

/// API error types. Every handler failure is converted into one of these
/// at the boundary; nothing propagates to clients as a raw error.
#[derive(Debug)]
pub enum ApiError {
    MissingInput(String),
    InvalidToken(String),
    ExchangeFailed(String),
    Unavailable(String),
    Internal(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::MissingInput(msg) => write!(f, "Missing Input: {}", msg),
            ApiError::InvalidToken(msg) => write!(f, "Invalid Token: {}", msg),
            ApiError::ExchangeFailed(msg) => write!(f, "Exchange Failed: {}", msg),
            ApiError::Unavailable(msg) => write!(f, "Upstream Unavailable: {}", msg),
            ApiError::Internal(msg) => write!(f, "Internal Server Error: {}", msg),
        }
    }
}

/// JSON error response structure: `{"success": false, "error": "..."}`
#[derive(Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_message) = match self {
            ApiError::MissingInput(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::InvalidToken(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::ExchangeFailed(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Unavailable(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let error_response = ErrorResponse {
            success: false,
            error: error_message,
        };

        (status, Json(error_response)).into_response()
    }
}

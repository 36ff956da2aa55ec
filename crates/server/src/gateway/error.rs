//! Mapping of cache failures to HTTP responses

use super::wire::ErrorBody;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use bcached_cache::{CacheError, ErrorCode};

/// A caller-visible failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
    pub retryable: bool,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            retryable: matches!(code, ErrorCode::Timeout | ErrorCode::Unavailable),
        }
    }

    pub fn not_found(key: &str) -> Self {
        Self::new(ErrorCode::NotFound, format!("key '{key}' not found"))
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadRequest, message)
    }

    pub fn status(&self) -> StatusCode {
        match self.code {
            ErrorCode::NotFound | ErrorCode::UnknownRoute => StatusCode::NOT_FOUND,
            ErrorCode::PreconditionFailed => StatusCode::CONFLICT,
            ErrorCode::InvalidKey | ErrorCode::BadRequest => StatusCode::BAD_REQUEST,
            ErrorCode::Timeout => StatusCode::GATEWAY_TIMEOUT,
            ErrorCode::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::DecodeError | ErrorCode::IoError | ErrorCode::InternalError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<CacheError> for ApiError {
    fn from(error: CacheError) -> Self {
        if error.is_corruption() {
            tracing::warn!(
                error = %error,
                hint = ?error.recovery_hint(),
                "corrupt record reported to client"
            );
        }
        Self {
            code: error.code(),
            message: error.to_string(),
            retryable: error.is_transient(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            code: self.code,
            message: self.message,
            retryable: self.retryable,
        };
        (status, Json(body)).into_response()
    }
}

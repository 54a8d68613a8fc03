use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ShortenerError {
    #[error("Malformed url: {0}")]
    InvalidUrl(String),
    #[error("Shortcode must be 1-20 alphanumeric characters")]
    InvalidShortcodeFormat,
    #[error("Shortcode '{0}' is already in use")]
    ShortcodeCollision(String),
    #[error("Short link not found or expired")]
    NotFound,
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
    #[error("Validity must be a positive number of minutes")]
    InvalidValidity,
    #[error("Malformed request body: {0}")]
    MalformedBody(String),
    #[error("Could not allocate a unique shortcode after {0} attempts")]
    AllocationExhausted(u32),
    #[error("Internal server error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl ShortenerError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ShortenerError::InvalidUrl(_)
            | ShortenerError::InvalidShortcodeFormat
            | ShortenerError::MissingField(_)
            | ShortenerError::InvalidValidity
            | ShortenerError::MalformedBody(_) => StatusCode::BAD_REQUEST,
            ShortenerError::ShortcodeCollision(_) => StatusCode::CONFLICT,
            ShortenerError::NotFound => StatusCode::NOT_FOUND,
            ShortenerError::AllocationExhausted(_) | ShortenerError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Stable tag reported in the `error` field of the response body.
    pub fn kind(&self) -> &'static str {
        match self {
            ShortenerError::InvalidUrl(_) => "invalid_url",
            ShortenerError::InvalidShortcodeFormat => "invalid_shortcode_format",
            ShortenerError::ShortcodeCollision(_) => "shortcode_collision",
            ShortenerError::NotFound => "not_found",
            ShortenerError::MissingField(_) => "missing_field",
            ShortenerError::InvalidValidity => "invalid_validity",
            ShortenerError::MalformedBody(_) => "malformed_body",
            ShortenerError::AllocationExhausted(_) => "allocation_exhausted",
            ShortenerError::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for ShortenerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }
        let body = ErrorBody {
            error: self.kind(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

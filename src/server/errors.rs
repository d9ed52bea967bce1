//! HTTP error payloads and status mapping

use crate::error::FaceSegError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};

/// JSON error body returned on every non-2xx response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    /// Stable machine-readable category
    pub error_type: String,
    /// Human-readable message
    pub message: String,
}

/// Error as seen at the request boundary
///
/// Client-input problems map to 400, a degenerate prediction (no pixels
/// selected) maps to 422 so callers can tell "you gave bad input" from
/// "the threshold produced no match", everything else maps to 500.
#[derive(Debug)]
pub enum ApiError {
    InvalidRequest(String),
    EmptyMask(String),
    Internal(String),
}

impl ApiError {
    pub fn invalid_request<S: Into<String>>(msg: S) -> Self {
        Self::InvalidRequest(msg.into())
    }

    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::EmptyMask(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_type(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "invalid_request",
            Self::EmptyMask(_) => "empty_mask",
            Self::Internal(_) => "internal_error",
        }
    }

    fn message(&self) -> &str {
        match self {
            Self::InvalidRequest(msg) | Self::EmptyMask(msg) | Self::Internal(msg) => msg,
        }
    }
}

impl From<FaceSegError> for ApiError {
    fn from(err: FaceSegError) -> Self {
        match err {
            FaceSegError::InvalidInput(msg) => Self::InvalidRequest(msg),
            FaceSegError::EmptyMask { .. } => Self::EmptyMask(err.to_string()),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error_type: self.error_type().to_string(),
            message: self.message().to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

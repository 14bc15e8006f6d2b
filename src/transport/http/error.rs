//! Error responses for the dispatch endpoint.
//!
//! Every failure category maps to its own status code and [`ErrorCode`]; the
//! router never recovers locally.

use crate::app::library_service::LibraryError;
use crate::transport::wire::{ApiErrorBody, ApiErrorDetail, ErrorCode};
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("method '{0}' is not registered")]
    UnknownMethod(String),

    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("{0}")]
    NotFound(String),

    #[error("handler failed: {0}")]
    HandlerError(String),
}

impl ApiError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ApiError::UnknownMethod(_) => ErrorCode::UnknownMethod,
            ApiError::InvalidParameters(_) => ErrorCode::InvalidParameters,
            ApiError::NotFound(_) => ErrorCode::NotFound,
            ApiError::HandlerError(_) => ErrorCode::HandlerError,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::UnknownMethod(_) | ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidParameters(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::HandlerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn body(&self) -> ApiErrorBody {
        ApiErrorBody {
            error: ApiErrorDetail {
                code: self.code(),
                message: self.to_string(),
            },
        }
    }
}

impl From<LibraryError> for ApiError {
    fn from(err: LibraryError) -> Self {
        match err {
            LibraryError::NotFound(_) => ApiError::NotFound(err.to_string()),
            LibraryError::InvalidParameters(msg) => ApiError::InvalidParameters(msg),
            LibraryError::Store(_) => ApiError::HandlerError(err.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(err: JsonRejection) -> Self {
        ApiError::InvalidParameters(format!(
            "invalid JSON body: {} (expected: {{\"method\": \"...\", \"parameters\": {{...}}}})",
            err.body_text()
        ))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = %status, code = %self.code(), error = %self, "request failed");
        } else {
            tracing::warn!(status = %status, code = %self.code(), error = %self, "request rejected");
        }
        (status, Json(self.body())).into_response()
    }
}

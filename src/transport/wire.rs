//! JSON shapes exchanged between [`LibraryClient`](crate::transport::client::LibraryClient)
//! and the dispatch endpoint.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use utoipa::ToSchema;

/// Inbound call: a method name plus its parameters.
#[derive(Deserialize, Serialize, Debug, Clone, ToSchema)]
pub struct RpcRequest {
    /// Registered method name, e.g. `getLibraryNodes`.
    pub method: String,
    /// Omitted or `null` means "use the method's defaults".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub parameters: Option<JsonValue>,
}

/// Wrapper around every successful payload.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ApiEnvelope<T> {
    pub data: T,
}

impl<T> ApiEnvelope<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    UnknownMethod,
    InvalidParameters,
    NotFound,
    HandlerError,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::UnknownMethod => "UNKNOWN_METHOD",
            ErrorCode::InvalidParameters => "INVALID_PARAMETERS",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::HandlerError => "HANDLER_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct ApiErrorDetail {
    pub code: ErrorCode,
    pub message: String,
}

/// Body of every failed call.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct ApiErrorBody {
    pub error: ApiErrorDetail,
}

//! Typed client for the dispatch endpoint.
//!
//! Each call is one POST with no retry and no caching. The response type is
//! fixed by the method's [`ApiMethod`] contract, so a mismatched call does not
//! compile.

use crate::domain::library::{LibraryNode, LibraryNodesPage, LibraryNodesWithPostsPage, SlugRequest};
use crate::domain::method::{
    ApiMethod, GetLibraryNodeBySlug, GetLibraryNodes,
    GetLibraryNodesWithLibraryPostsWithLatestVersions,
};
use crate::domain::pagination::PaginationRequest;
use crate::infra::config::ClientConfig;
use crate::transport::wire::{ApiEnvelope, ApiErrorBody, ErrorCode};
use reqwest::header::{HeaderMap, HeaderValue, CACHE_CONTROL};
use reqwest::StatusCode;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Connection, TLS or timeout failure.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a structured error.
    #[error("{code} ({status}): {message}")]
    Api {
        status: StatusCode,
        code: ErrorCode,
        message: String,
    },

    /// The server answered with a non-success status and no error body.
    #[error("unexpected status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("failed to decode {method} response: {source}")]
    Decode {
        method: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl ClientError {
    /// The server-side error category, if the server reported one.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            ClientError::Api { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.code() == Some(ErrorCode::NotFound)
    }
}

#[derive(Serialize)]
struct OutboundRequest<'a, P: Serialize> {
    method: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parameters: Option<&'a P>,
}

/// Holds only an immutable HTTP client; clone it freely across tasks.
#[derive(Clone, Debug)]
pub struct LibraryClient {
    http: reqwest::Client,
    endpoint: String,
}

impl LibraryClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self::with_http_client(http, config))
    }

    /// Uses a caller-supplied `reqwest::Client` (its own timeout settings apply).
    pub fn with_http_client(http: reqwest::Client, config: &ClientConfig) -> Self {
        Self {
            http,
            endpoint: config.endpoint_url(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn request<M: ApiMethod>(&self, parameters: M::Parameters) -> Result<M::Response, ClientError> {
        self.send::<M>(Some(&parameters), HeaderMap::new()).await
    }

    pub async fn request_with_headers<M: ApiMethod>(
        &self,
        parameters: M::Parameters,
        headers: HeaderMap,
    ) -> Result<M::Response, ClientError> {
        self.send::<M>(Some(&parameters), headers).await
    }

    /// Sends no `parameters` field; the server applies the method's defaults.
    pub async fn request_without_parameters<M: ApiMethod>(&self) -> Result<M::Response, ClientError> {
        self.send::<M>(None, HeaderMap::new()).await
    }

    pub async fn get_library_nodes(&self, page: PaginationRequest) -> Result<LibraryNodesPage, ClientError> {
        self.request::<GetLibraryNodes>(page).await
    }

    pub async fn get_library_nodes_with_latest_versions(
        &self,
        page: PaginationRequest,
    ) -> Result<LibraryNodesWithPostsPage, ClientError> {
        self.request::<GetLibraryNodesWithLibraryPostsWithLatestVersions>(page)
            .await
    }

    pub async fn get_library_node_by_slug(&self, slug: &str) -> Result<LibraryNode, ClientError> {
        self.request::<GetLibraryNodeBySlug>(SlugRequest::new(slug)).await
    }

    async fn send<M: ApiMethod>(
        &self,
        parameters: Option<&M::Parameters>,
        mut headers: HeaderMap,
    ) -> Result<M::Response, ClientError> {
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
        let body = OutboundRequest {
            method: M::NAME,
            parameters,
        };

        tracing::debug!(method = M::NAME, endpoint = %self.endpoint, "sending request");
        let response = self
            .http
            .post(&self.endpoint)
            .headers(headers)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let err = match serde_json::from_slice::<ApiErrorBody>(&bytes) {
                Ok(body) => ClientError::Api {
                    status,
                    code: body.error.code,
                    message: body.error.message,
                },
                Err(_) => ClientError::Status {
                    status,
                    body: String::from_utf8_lossy(&bytes).into_owned(),
                },
            };
            tracing::debug!(method = M::NAME, error = %err, "request failed");
            return Err(err);
        }

        let envelope: ApiEnvelope<M::Response> = serde_json::from_slice(&bytes)
            .map_err(|source| ClientError::Decode {
                method: M::NAME,
                source,
            })?;
        Ok(envelope.data)
    }
}

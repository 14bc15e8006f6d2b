//! The single dispatch endpoint.
//!
//! A request moves through: method resolved → parameters decoded → handler
//! invoked → response wrapped in `{ "data": ... }`. Any step can fail with its
//! own [`ApiError`]; nothing is retried.

use crate::app::library_service::LibraryError;
use crate::domain::library::SlugRequest;
use crate::domain::method::{
    ApiMethod, GetLibraryNodeBySlug, GetLibraryNodes,
    GetLibraryNodesWithLibraryPostsWithLatestVersions, Method,
};
use crate::domain::pagination::PaginationRequest;
use crate::transport::http::error::ApiError;
use crate::transport::http::types::AppState;
use crate::transport::wire::{ApiEnvelope, RpcRequest};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::Value as JsonValue;
use std::future::Future;
use std::time::Instant;
use tracing::Instrument;

#[utoipa::path(
    post,
    path = "/api",
    request_body = RpcRequest,
    responses(
        (status = 200, description = "`{ \"data\": ... }` carrying the method's response type"),
        (status = 404, description = "Unknown method or slug not found", body = crate::transport::wire::ApiErrorBody),
        (status = 422, description = "Malformed body or invalid parameters", body = crate::transport::wire::ApiErrorBody),
        (status = 500, description = "Handler failure", body = crate::transport::wire::ApiErrorBody)
    )
)]
pub async fn rpc_handler(
    State(state): State<AppState>,
    request: Result<Json<RpcRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match request {
        Ok(v) => v,
        Err(e) => return ApiError::from(e).into_response(),
    };

    let span = tracing::info_span!("rpc", method = %request.method);
    async move {
        match dispatch(&state, request).await {
            Ok(body) => (StatusCode::OK, Json(body)).into_response(),
            Err(e) => e.into_response(),
        }
    }
    .instrument(span)
    .await
}

/// Resolves `request.method` and runs the bound handler.
///
/// Returns the serialized envelope so callers outside axum can reuse it.
pub async fn dispatch(state: &AppState, request: RpcRequest) -> Result<JsonValue, ApiError> {
    let method = Method::from_name(&request.method)
        .ok_or_else(|| ApiError::UnknownMethod(request.method.clone()))?;
    let library = &state.library;
    let started = Instant::now();

    let result = match method {
        Method::GetLibraryNodes => {
            invoke::<GetLibraryNodes, _, _>(request.parameters, |p: PaginationRequest| async move {
                library.list_library_nodes(&p).await
            })
            .await
        }
        Method::GetLibraryNodesWithLibraryPostsWithLatestVersions => {
            invoke::<GetLibraryNodesWithLibraryPostsWithLatestVersions, _, _>(
                request.parameters,
                |p: PaginationRequest| async move {
                    library.list_library_nodes_with_latest_versions(&p).await
                },
            )
            .await
        }
        Method::GetLibraryNodeBySlug => {
            invoke::<GetLibraryNodeBySlug, _, _>(request.parameters, |p: SlugRequest| async move {
                library.get_library_node_by_slug(&p.slug).await
            })
            .await
        }
    };

    if result.is_ok() {
        tracing::info!(
            method = %method,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "dispatched"
        );
    }
    result
}

async fn invoke<M, F, Fut>(parameters: Option<JsonValue>, handler: F) -> Result<JsonValue, ApiError>
where
    M: ApiMethod,
    F: FnOnce(M::Parameters) -> Fut,
    Fut: Future<Output = Result<M::Response, LibraryError>>,
{
    let parameters = decode_parameters::<M>(parameters)?;
    let response = handler(parameters).await?;
    serde_json::to_value(ApiEnvelope::new(response)).map_err(|e| {
        ApiError::HandlerError(format!("failed to serialize {} response: {}", M::NAME, e))
    })
}

/// Missing or `null` parameters decode from `{}` so that defaults apply.
fn decode_parameters<M: ApiMethod>(parameters: Option<JsonValue>) -> Result<M::Parameters, ApiError> {
    let raw = match parameters {
        None | Some(JsonValue::Null) => JsonValue::Object(serde_json::Map::new()),
        Some(v) => v,
    };
    serde_json::from_value(raw)
        .map_err(|e| ApiError::InvalidParameters(format!("{}: {}", M::NAME, e)))
}

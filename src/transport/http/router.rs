use crate::domain::library::{
    LibraryNode, LibraryNodeWithPosts, LibraryNodesPage, LibraryNodesWithPostsPage, LibraryPostVersion,
    LibraryPostWithLatestVersion, SlugRequest,
};
use crate::domain::pagination::{PaginationRequest, PaginationResult};
use crate::infra::config::DEFAULT_API_PATH;
use crate::transport::http::handlers::{health, rpc};
use crate::transport::http::types::{AppState, HealthEnvelope, HealthResponse};
use crate::transport::wire::{ApiErrorBody, ApiErrorDetail, ErrorCode, RpcRequest};
use axum::routing::{get, post};
use axum::Router;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(health::healthcheck_handler, rpc::rpc_handler),
    components(schemas(
        RpcRequest,
        ApiErrorBody,
        ApiErrorDetail,
        ErrorCode,
        HealthEnvelope,
        HealthResponse,
        PaginationRequest,
        PaginationResult,
        SlugRequest,
        LibraryNode,
        LibraryNodeWithPosts,
        LibraryPostWithLatestVersion,
        LibraryPostVersion,
        LibraryNodesPage,
        LibraryNodesWithPostsPage
    ))
)]
pub struct ApiDoc;

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::healthcheck_handler))
        .route(DEFAULT_API_PATH, post(rpc::rpc_handler))
        .with_state(app_state)
}

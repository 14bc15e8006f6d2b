// src/bin/api_server.rs

use library_api::infra::{config, logging};
use library_api::storage::{open_store, OpenMode};
use library_api::transport;
use library_api::LibraryService;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    logging::init();

    // --- Store Initialization ---
    let store_config = config::StoreConfig::from_env()?;
    tracing::info!(store = %store_config.describe(), "opening library store");
    let store = open_store(&store_config, OpenMode::Serve).await?;
    if let Err(e) = store.ping().await {
        tracing::warn!(error = %e, "library store did not answer the startup ping");
    }

    let app_state = transport::http::AppState::new(LibraryService::new(store));

    // --- API Server Initialization ---
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);
    let app = transport::http::create_router(app_state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", transport::http::ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr = config::bind_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "library API listening");
    tracing::info!("Swagger UI available at /swagger-ui");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("shutdown signal received");
            }
        })
        .await?;

    tracing::info!("graceful shutdown complete");
    Ok(())
}

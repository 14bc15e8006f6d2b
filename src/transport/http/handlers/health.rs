use crate::transport::http::types::{AppState, HealthEnvelope, HealthResponse};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy (store reachable)", body = HealthEnvelope),
        (status = 503, description = "Service is unhealthy (store unreachable)", body = HealthEnvelope)
    )
)]
pub async fn healthcheck_handler(State(state): State<AppState>) -> impl IntoResponse {
    let store = state.library.store();
    let backend = store.backend_name().to_string();

    match store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthEnvelope {
                data: HealthResponse {
                    status: "ok".to_string(),
                    backend,
                    error: None,
                },
            }),
        ),
        Err(e) => {
            tracing::error!(backend = %backend, error = %e, "store ping failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthEnvelope {
                    data: HealthResponse {
                        status: "unhealthy".to_string(),
                        backend,
                        error: Some(format!("store ping failed: {}", e)),
                    },
                }),
            )
        }
    }
}

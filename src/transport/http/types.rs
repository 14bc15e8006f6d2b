use crate::app::library_service::LibraryService;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

/// Shared, read-only state handed to every request.
#[derive(Clone)]
pub struct AppState {
    pub library: Arc<LibraryService>,
}

impl AppState {
    pub fn new(library: LibraryService) -> Self {
        Self {
            library: Arc::new(library),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct HealthResponse {
    /// `ok` or `unhealthy`.
    pub status: String,
    /// Store backend label (`memory`, `postgres`).
    pub backend: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// `GET /health` body, wrapped like every other payload.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct HealthEnvelope {
    pub data: HealthResponse,
}

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use crate::routes::sessions::AppState;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Service status, always "ok" while the process is serving
    pub status: String,
    /// API version
    pub version: String,
    /// Chat model used for schedule generation
    pub model: String,
    /// Number of live sessions
    pub active_sessions: usize,
}

/// Health check endpoint.
///
/// Does not call the upstream APIs; reports the configured model and the
/// number of sessions held in memory.
#[utoipa::path(
    get,
    path = "/api/v1/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        model: state.chat_client.model().to_string(),
        active_sessions: state.sessions.len().await,
    })
}

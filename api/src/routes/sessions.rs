//! Session lifecycle endpoints.
//!
//! - POST   /api/v1/sessions
//! - GET    /api/v1/sessions/:id
//! - DELETE /api/v1/sessions/:id

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::errors::{AppError, ErrorResponse};
use crate::models::{IrrigationDayRecord, TranscriptEntry};
use crate::services::chat::ChatClient;
use crate::services::session::{SessionStore, SharedSession};
use crate::services::weather::WeatherClient;

/// Shared application state.
#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) weather_client: WeatherClient,
    pub(crate) chat_client: ChatClient,
    pub(crate) sessions: SessionStore,
}

impl AppState {
    pub(crate) async fn session(&self, id: Uuid) -> Result<SharedSession, AppError> {
        self.sessions
            .get(id)
            .await
            .ok_or_else(|| AppError::NotFound(format!("Session {} not found", id)))
    }
}

/// Returned when a session is created.
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionCreatedResponse {
    /// Session UUID, used in all further requests
    pub id: Uuid,
    /// Creation time (ISO 8601)
    pub created_at: DateTime<Utc>,
}

/// Full session readout: transcript plus latest schedule.
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    /// Whether a schedule reply has been received in this session
    pub has_reply: bool,
    /// User and assistant messages in the order they were exchanged
    pub history: Vec<TranscriptEntry>,
    /// Latest successfully extracted schedule
    pub schedule: Vec<IrrigationDayRecord>,
}

/// Start a new session.
#[utoipa::path(
    post,
    path = "/api/v1/sessions",
    tag = "Sessions",
    responses(
        (status = 201, description = "Session created", body = SessionCreatedResponse),
    )
)]
pub async fn create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<SessionCreatedResponse>) {
    let (id, created_at) = state.sessions.create().await;

    (
        StatusCode::CREATED,
        Json(SessionCreatedResponse { id, created_at }),
    )
}

/// Get a session's transcript and latest schedule.
#[utoipa::path(
    get,
    path = "/api/v1/sessions/{id}",
    tag = "Sessions",
    params(("id" = Uuid, Path, description = "Session UUID")),
    responses(
        (status = 200, description = "Session state", body = SessionResponse),
        (status = 404, description = "Session not found", body = ErrorResponse),
    )
)]
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionResponse>, AppError> {
    let shared = state.session(id).await?;
    let session = shared.lock().await;

    Ok(Json(SessionResponse {
        id: session.id,
        created_at: session.created_at,
        has_reply: session.has_reply(),
        history: session.history().to_vec(),
        schedule: session.schedule().to_vec(),
    }))
}

/// End a session and discard its state.
#[utoipa::path(
    delete,
    path = "/api/v1/sessions/{id}",
    tag = "Sessions",
    params(("id" = Uuid, Path, description = "Session UUID")),
    responses(
        (status = 204, description = "Session ended"),
        (status = 404, description = "Session not found", body = ErrorResponse),
    )
)]
pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.sessions.remove(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Session {} not found", id)))
    }
}

/// App state whose upstream clients point at a mock server.
#[cfg(test)]
pub(crate) fn test_state(server: &wiremock::MockServer) -> AppState {
    AppState {
        weather_client: WeatherClient::new(&format!("{}/weather", server.uri()), "owm-key")
            .unwrap(),
        chat_client: ChatClient::new(
            &format!("{}/chat/completions", server.uri()),
            "gsk-test",
            "llama-3.1-8b-instant",
        )
        .unwrap(),
        sessions: SessionStore::new(chrono::Duration::hours(1)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;
    use wiremock::MockServer;

    #[tokio::test]
    async fn test_create_session_returns_201() {
        let server = MockServer::start().await;
        let state = test_state(&server);

        let (status, Json(created)) = create_session(State(state.clone())).await;

        assert_eq!(status, StatusCode::CREATED);
        let session = state.sessions.get(created.id).await.unwrap();
        assert_eq!(session.lock().await.created_at, created.created_at);
    }

    #[tokio::test]
    async fn test_get_session_readout() {
        let server = MockServer::start().await;
        let state = test_state(&server);
        let (_, Json(created)) = create_session(State(state.clone())).await;

        let Json(body) = get_session(State(state.clone()), Path(created.id))
            .await
            .unwrap();

        assert_eq!(body.id, created.id);
        assert!(!body.has_reply);
        assert!(body.history.is_empty());
        assert!(body.schedule.is_empty());
    }

    #[tokio::test]
    async fn test_get_unknown_session_is_404() {
        let server = MockServer::start().await;
        let state = test_state(&server);

        let err = get_session(State(state), Path(Uuid::new_v4()))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_session_twice() {
        let server = MockServer::start().await;
        let state = test_state(&server);
        let (_, Json(created)) = create_session(State(state.clone())).await;

        let status = delete_session(State(state.clone()), Path(created.id))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);

        let again = delete_session(State(state.clone()), Path(created.id))
            .await
            .unwrap_err();
        assert_eq!(again.into_response().status(), StatusCode::NOT_FOUND);

        let gone = get_session(State(state), Path(created.id))
            .await
            .unwrap_err();
        assert_eq!(gone.into_response().status(), StatusCode::NOT_FOUND);
    }
}

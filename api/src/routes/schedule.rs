//! Schedule endpoints.
//!
//! - GET  /api/v1/schedule/form
//! - POST /api/v1/sessions/:id/schedule
//! - POST /api/v1/sessions/:id/schedule/extract

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::errors::{AppError, ErrorResponse};
use crate::models::{ScheduleForm, SoilType, LAND_SIZE_STEP_ACRES, MIN_LAND_SIZE_ACRES};
use crate::routes::sessions::AppState;
use crate::services::submission::{
    apply_extraction, run_submission, ExtractionOutcome, SubmissionOutcome,
};

/// Defaults and choices for rendering the schedule form.
#[derive(Debug, Serialize, ToSchema)]
pub struct FormOptionsResponse {
    /// Pre-filled values
    pub defaults: ScheduleForm,
    /// Allowed soil types, in display order
    pub soil_types: Vec<SoilType>,
    /// Smallest accepted land size in acres
    pub land_size_min_acres: f64,
    /// Input step for the land size field
    pub land_size_step_acres: f64,
}

/// Get form defaults and options.
#[utoipa::path(
    get,
    path = "/api/v1/schedule/form",
    tag = "Schedule",
    responses(
        (status = 200, description = "Form defaults and options", body = FormOptionsResponse),
    )
)]
pub async fn get_form_options() -> Json<FormOptionsResponse> {
    Json(FormOptionsResponse {
        defaults: ScheduleForm::default(),
        soil_types: SoilType::ALL.to_vec(),
        land_size_min_acres: MIN_LAND_SIZE_ACRES,
        land_size_step_acres: LAND_SIZE_STEP_ACRES,
    })
}

/// Submit the form and generate a 5-day irrigation schedule.
///
/// Looks up current weather, asks the chat model for a schedule and extracts
/// it. A weather failure is reported in `weather_error` and the request still
/// goes to the model. An unparseable reply is reported in `extraction_error`
/// and the session keeps its previous schedule.
#[utoipa::path(
    post,
    path = "/api/v1/sessions/{id}/schedule",
    tag = "Schedule",
    params(("id" = Uuid, Path, description = "Session UUID")),
    request_body = ScheduleForm,
    responses(
        (status = 200, description = "Schedule generated", body = SubmissionOutcome),
        (status = 400, description = "Invalid form values", body = ErrorResponse),
        (status = 404, description = "Session not found", body = ErrorResponse),
        (status = 502, description = "Chat completion failed", body = ErrorResponse),
    )
)]
pub async fn submit_schedule(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(form): Json<ScheduleForm>,
) -> Result<Json<SubmissionOutcome>, AppError> {
    form.validate().map_err(AppError::BadRequest)?;

    let shared = state.session(id).await?;
    let mut session = shared.lock().await;

    tracing::info!(
        "Session {}: schedule requested for {} in {} soil at '{}' ({} acres)",
        id,
        form.crop_type,
        form.soil_type,
        form.location,
        form.land_size_acres
    );

    let outcome = run_submission(
        &state.weather_client,
        &state.chat_client,
        &mut session,
        form,
    )
    .await?;

    Ok(Json(outcome))
}

/// Re-run extraction on the session's last assistant reply.
#[utoipa::path(
    post,
    path = "/api/v1/sessions/{id}/schedule/extract",
    tag = "Schedule",
    params(("id" = Uuid, Path, description = "Session UUID")),
    responses(
        (status = 200, description = "Extraction result", body = ExtractionOutcome),
        (status = 400, description = "No reply to extract from yet", body = ErrorResponse),
        (status = 404, description = "Session not found", body = ErrorResponse),
    )
)]
pub async fn reextract_schedule(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ExtractionOutcome>, AppError> {
    let shared = state.session(id).await?;
    let mut session = shared.lock().await;

    if !session.has_reply() {
        return Err(AppError::BadRequest(
            "No schedule has been requested in this session yet".to_string(),
        ));
    }

    let reply = session.last_reply().unwrap_or_default().to_string();
    Ok(Json(apply_extraction(&mut session, &reply)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::sessions::test_state;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const REPLY: &str = "Day 1 Time Slot Morning Watering Depth 2.5 Water Volume per Hour 750 \
                         Total Water Volume 7500 Additional Tips Water early. \
                         Day 2 Time Slot Evening Watering Depth 1.5 Water Volume per Hour 500 \
                         Total Water Volume 4000 Additional Tips Avoid midday heat.";

    async fn mount_upstreams(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "main": { "temp": 27.5, "humidity": 70 }
            })))
            .mount(server)
            .await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{ "message": { "role": "assistant", "content": REPLY } }]
            })))
            .mount(server)
            .await;
    }

    fn form_with_land_size(acres: f64) -> ScheduleForm {
        ScheduleForm {
            land_size_acres: acres,
            ..ScheduleForm::default()
        }
    }

    #[tokio::test]
    async fn test_form_options() {
        let Json(body) = get_form_options().await;
        assert_eq!(body.defaults.crop_type, "carrot");
        assert_eq!(body.defaults.location, "Coimbatore");
        assert_eq!(body.defaults.soil_type, SoilType::Alluvial);
        assert_eq!(body.defaults.land_size_acres, 0.5);
        assert_eq!(body.soil_types.len(), 6);
        assert_eq!(body.land_size_min_acres, 0.1);
    }

    #[tokio::test]
    async fn test_submit_rejects_bad_land_size() {
        let server = MockServer::start().await;
        let state = test_state(&server);
        let (id, _) = state.sessions.create().await;

        for acres in [0.05, -2.0, f64::NAN, f64::INFINITY] {
            let err = submit_schedule(
                State(state.clone()),
                Path(id),
                Json(form_with_land_size(acres)),
            )
            .await
            .unwrap_err();
            assert!(matches!(err, AppError::BadRequest(_)), "acres = {}", acres);
            assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
        }

        // Nothing reached the upstreams or the session.
        assert!(server.received_requests().await.unwrap().is_empty());
        let session = state.sessions.get(id).await.unwrap();
        assert!(session.lock().await.history().is_empty());
    }

    #[tokio::test]
    async fn test_submit_unknown_session_is_404() {
        let server = MockServer::start().await;
        let state = test_state(&server);

        let err = submit_schedule(
            State(state),
            Path(Uuid::new_v4()),
            Json(ScheduleForm::default()),
        )
        .await
        .unwrap_err();

        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_submit_then_reextract() {
        let server = MockServer::start().await;
        mount_upstreams(&server).await;
        let state = test_state(&server);
        let (id, _) = state.sessions.create().await;

        let Json(outcome) = submit_schedule(
            State(state.clone()),
            Path(id),
            Json(ScheduleForm::default()),
        )
        .await
        .unwrap();
        assert_eq!(outcome.extraction.schedule.len(), 2);
        assert!(outcome
            .user_prompt
            .contains("carrot crop in Alluvial soil, located in Coimbatore, with a land size of 0.5 acres"));

        let Json(again) = reextract_schedule(State(state.clone()), Path(id))
            .await
            .unwrap();
        assert_eq!(again.schedule, outcome.extraction.schedule);
        assert!(again.extraction_error.is_none());
    }

    #[tokio::test]
    async fn test_reextract_before_first_submission_is_400() {
        let server = MockServer::start().await;
        let state = test_state(&server);
        let (id, _) = state.sessions.create().await;

        let err = reextract_schedule(State(state), Path(id))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::BadRequest(_)));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_reextract_unknown_session_is_404() {
        let server = MockServer::start().await;
        let state = test_state(&server);

        let err = reextract_schedule(State(state), Path(Uuid::new_v4()))
            .await
            .unwrap_err();

        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }
}

// Irrigation Scheduler API v0.1
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod config;
mod errors;
mod models;
mod routes;
mod services;

use config::AppConfig;
use routes::sessions::AppState;
use services::chat::ChatClient;
use services::session::SessionStore;
use services::weather::WeatherClient;

/// Irrigation Scheduler API — OpenAPI specification.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Irrigation Scheduler API",
        version = "0.1.0",
        description = "Generates 5-day irrigation schedules. Looks up current weather \
            for a location, asks a chat-completion model for a schedule for the given \
            crop, soil and land size, and extracts the model's answer into structured \
            daily rows held in an in-memory session.",
        license(name = "MIT"),
    ),
    tags(
        (name = "Health", description = "Service health check"),
        (name = "Sessions", description = "Session lifecycle and transcript"),
        (name = "Schedule", description = "Form options, schedule generation and extraction"),
    ),
    paths(
        routes::health::health_check,
        routes::sessions::create_session,
        routes::sessions::get_session,
        routes::sessions::delete_session,
        routes::schedule::get_form_options,
        routes::schedule::submit_schedule,
        routes::schedule::reextract_schedule,
    ),
    components(
        schemas(
            routes::health::HealthResponse,
            routes::sessions::SessionCreatedResponse,
            routes::sessions::SessionResponse,
            routes::schedule::FormOptionsResponse,
            services::submission::SubmissionOutcome,
            services::submission::ExtractionOutcome,
            models::ScheduleForm,
            models::SoilType,
            models::WeatherReading,
            models::ChatMessage,
            models::Role,
            models::TranscriptEntry,
            models::IrrigationDayRecord,
            errors::ErrorResponse,
        )
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "irrigation_scheduler_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env().expect("Invalid configuration");

    let weather_client = WeatherClient::new(&config.weather_api_url, &config.weather_api_key)
        .expect("Failed to create weather client");
    let chat_client = ChatClient::new(
        &config.chat_completions_url,
        &config.chat_api_key,
        &config.chat_model,
    )
    .expect("Failed to create chat client");

    tracing::info!(
        "Using chat model {} at {}",
        config.chat_model,
        config.chat_completions_url
    );

    let app_state = AppState {
        weather_client,
        chat_client,
        sessions: SessionStore::new(chrono::Duration::seconds(
            config.session_idle_ttl_secs as i64,
        )),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::DELETE,
        ])
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/api/v1/health", get(routes::health::health_check))
        .route(
            "/api/v1/schedule/form",
            get(routes::schedule::get_form_options),
        )
        .route("/api/v1/sessions", post(routes::sessions::create_session))
        .route(
            "/api/v1/sessions/:id",
            get(routes::sessions::get_session).delete(routes::sessions::delete_session),
        )
        .route(
            "/api/v1/sessions/:id/schedule",
            post(routes::schedule::submit_schedule),
        )
        .route(
            "/api/v1/sessions/:id/schedule/extract",
            post(routes::schedule::reextract_schedule),
        )
        .with_state(app_state);

    let app = Router::new()
        .merge(api_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("API server listening on {}", addr);
    tracing::info!(
        "Swagger UI available at http://localhost:{}/swagger-ui/",
        config.port
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind TCP listener");
    axum::serve(listener, app)
        .await
        .expect("Server terminated unexpectedly");
}

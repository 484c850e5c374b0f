//! One form submission: weather → prompt → completion → extraction.
//!
//! Error boundaries:
//! - weather failures are reported and the prompt is built with unknown weather
//! - completion failures propagate to the caller
//! - extraction failures are reported; the stored schedule is left as it was

use serde::Serialize;
use utoipa::ToSchema;

use crate::errors::AppError;
use crate::models::{IrrigationDayRecord, ScheduleForm, WeatherReading};
use crate::services::chat::ChatClient;
use crate::services::extractor::extract_schedule;
use crate::services::prompt::build_messages;
use crate::services::session::Session;
use crate::services::weather::WeatherClient;

const WEATHER_UNAVAILABLE_MESSAGE: &str = "Could not fetch weather data.";

/// Result of running extraction against a reply.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ExtractionOutcome {
    /// Records parsed from this reply. Empty when extraction failed.
    pub schedule: Vec<IrrigationDayRecord>,
    /// Readable extraction error, if the reply could not be parsed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extraction_error: Option<String>,
}

/// Everything a front end needs to render one submission.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SubmissionOutcome {
    /// Location the weather was looked up for
    pub location: String,
    /// Current weather, null when the provider could not be reached
    pub weather: Option<WeatherReading>,
    /// Set when the weather lookup failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weather_error: Option<String>,
    /// The user message sent to the model
    pub user_prompt: String,
    /// The model's full reply
    pub assistant_reply: String,
    #[serde(flatten)]
    pub extraction: ExtractionOutcome,
}

/// Run the whole pipeline for one submission against `session`.
///
/// The caller holds the session lock for the duration, so submissions for
/// the same session never interleave.
pub async fn run_submission(
    weather_client: &WeatherClient,
    chat_client: &ChatClient,
    session: &mut Session,
    form: ScheduleForm,
) -> Result<SubmissionOutcome, AppError> {
    let location = form.location.clone();

    let (weather, weather_error) = match weather_client.current(&location).await {
        Ok(reading) => {
            tracing::info!(
                "Weather for '{}': {}°C, {}% humidity",
                location,
                reading.temperature_c,
                reading.humidity_pct
            );
            (Some(reading), None)
        }
        Err(e) => {
            tracing::warn!("Weather lookup for '{}' failed: {}", location, e);
            (None, Some(WEATHER_UNAVAILABLE_MESSAGE.to_string()))
        }
    };

    let request = form.into_request(weather);
    let messages = build_messages(&request);
    let user_prompt = messages[1].content.clone();

    session.append(messages[1].clone());

    let reply = chat_client.complete(&messages).await?;
    let assistant_reply = reply.content.clone();
    session.append(reply);

    tracing::info!(
        "Session {}: received {}-char reply from {}",
        session.id,
        assistant_reply.len(),
        chat_client.model()
    );

    let extraction = apply_extraction(session, &assistant_reply);

    Ok(SubmissionOutcome {
        location,
        weather,
        weather_error,
        user_prompt,
        assistant_reply,
        extraction,
    })
}

/// Parse `reply` and, on success, replace the session's stored schedule.
pub fn apply_extraction(session: &mut Session, reply: &str) -> ExtractionOutcome {
    match extract_schedule(reply) {
        Ok(records) => {
            if records.is_empty() {
                tracing::warn!("Session {}: no day blocks found in reply", session.id);
            } else {
                tracing::debug!(
                    "Session {}: extracted {} schedule rows",
                    session.id,
                    records.len()
                );
            }
            session.replace_schedule(records.clone());
            ExtractionOutcome {
                schedule: records,
                extraction_error: None,
            }
        }
        Err(e) => {
            tracing::warn!("Session {}: extraction failed: {}", session.id, e);
            ExtractionOutcome {
                schedule: Vec::new(),
                extraction_error: Some(format!(
                    "Error processing the assistant's response: {}",
                    e
                )),
            }
        }
    }
}

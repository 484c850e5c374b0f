//! OpenWeatherMap current-weather client.
//!
//! One GET per lookup, metric units. See:
//! https://openweathermap.org/current

use serde::Deserialize;

use crate::errors::AppError;
use crate::models::WeatherReading;

/// Client for the OpenWeatherMap current weather endpoint.
#[derive(Debug, Clone)]
pub struct WeatherClient {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
}

// --- OpenWeatherMap JSON response types ---

#[derive(Debug, Deserialize)]
struct OwmResponse {
    main: OwmMain,
}

#[derive(Debug, Deserialize)]
struct OwmMain {
    temp: f64,
    humidity: f64,
}

impl WeatherClient {
    pub fn new(api_url: &str, api_key: &str) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| AppError::InternalError(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            api_url: api_url.to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Fetch current temperature and humidity for a named location.
    ///
    /// Any non-200 status is an error; callers treat it as "weather unknown"
    /// rather than aborting.
    pub async fn current(&self, location: &str) -> Result<WeatherReading, AppError> {
        let response = self
            .client
            .get(&self.api_url)
            .query(&[
                ("q", location),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
            ])
            .send()
            .await
            .map_err(|e| {
                AppError::ExternalServiceError(format!("weather request failed: {}", e))
            })?;

        if response.status() != reqwest::StatusCode::OK {
            return Err(AppError::ExternalServiceError(format!(
                "weather provider returned HTTP {} for '{}'",
                response.status(),
                location
            )));
        }

        let body: OwmResponse = response.json().await.map_err(|e| {
            AppError::ExternalServiceError(format!("weather JSON parse error: {}", e))
        })?;

        Ok(WeatherReading {
            temperature_c: body.main.temp,
            humidity_pct: body.main.humidity,
        })
    }
}

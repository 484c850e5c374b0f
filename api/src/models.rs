//! Domain types shared by the services and the HTTP layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Current conditions for a location, as returned by the weather provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct WeatherReading {
    /// Air temperature in Celsius
    pub temperature_c: f64,
    /// Relative humidity percentage
    pub humidity_pct: f64,
}

/// Soil categories offered by the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub enum SoilType {
    #[default]
    Alluvial,
    Black,
    Red,
    Laterite,
    Desert,
    Mountain,
}

impl SoilType {
    pub const ALL: [SoilType; 6] = [
        SoilType::Alluvial,
        SoilType::Black,
        SoilType::Red,
        SoilType::Laterite,
        SoilType::Desert,
        SoilType::Mountain,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SoilType::Alluvial => "Alluvial",
            SoilType::Black => "Black",
            SoilType::Red => "Red",
            SoilType::Laterite => "Laterite",
            SoilType::Desert => "Desert",
            SoilType::Mountain => "Mountain",
        }
    }
}

impl fmt::Display for SoilType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const DEFAULT_CROP_TYPE: &str = "carrot";
pub const DEFAULT_LOCATION: &str = "Coimbatore";
pub const DEFAULT_LAND_SIZE_ACRES: f64 = 0.5;
pub const MIN_LAND_SIZE_ACRES: f64 = 0.1;
pub const LAND_SIZE_STEP_ACRES: f64 = 0.1;

/// Submitted form values. Omitted fields take the form defaults.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ScheduleForm {
    /// Crop name, free text (e.g. "wheat", "rice", "maize")
    #[serde(default = "default_crop_type")]
    pub crop_type: String,
    #[serde(default)]
    pub soil_type: SoilType,
    /// City or region used for the weather lookup
    #[serde(default = "default_location")]
    pub location: String,
    /// Land size in acres, at least 0.1
    #[serde(default = "default_land_size_acres")]
    pub land_size_acres: f64,
}

fn default_crop_type() -> String {
    DEFAULT_CROP_TYPE.to_string()
}

fn default_location() -> String {
    DEFAULT_LOCATION.to_string()
}

fn default_land_size_acres() -> f64 {
    DEFAULT_LAND_SIZE_ACRES
}

impl Default for ScheduleForm {
    fn default() -> Self {
        Self {
            crop_type: default_crop_type(),
            soil_type: SoilType::default(),
            location: default_location(),
            land_size_acres: DEFAULT_LAND_SIZE_ACRES,
        }
    }
}

impl ScheduleForm {
    /// Check NaN first: it passes every range comparison.
    pub fn validate(&self) -> Result<(), String> {
        if !self.land_size_acres.is_finite() {
            return Err("land_size_acres must be a finite number".to_string());
        }
        if self.land_size_acres < MIN_LAND_SIZE_ACRES {
            return Err(format!(
                "land_size_acres must be at least {}",
                MIN_LAND_SIZE_ACRES
            ));
        }
        Ok(())
    }

    pub fn into_request(self, weather: Option<WeatherReading>) -> ScheduleRequest {
        ScheduleRequest {
            crop_type: self.crop_type,
            soil_type: self.soil_type,
            location: self.location,
            land_size_acres: self.land_size_acres,
            weather,
        }
    }
}

/// Everything the prompt needs for one submission.
#[derive(Debug, Clone)]
pub struct ScheduleRequest {
    pub crop_type: String,
    pub soil_type: SoilType,
    pub location: String,
    pub land_size_acres: f64,
    /// `None` when the weather provider could not be reached.
    pub weather: Option<WeatherReading>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single role-tagged message in a chat-completion conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A chat message as recorded in a session transcript.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TranscriptEntry {
    #[serde(flatten)]
    pub message: ChatMessage,
    /// When the message was appended to the session (ISO 8601)
    pub appended_at: DateTime<Utc>,
}

/// One day of a parsed irrigation schedule.
///
/// `day` is stored exactly as the model wrote it; duplicates and values
/// outside 1..=5 are kept.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct IrrigationDayRecord {
    /// Day number as written in the reply
    pub day: u32,
    /// Preferred watering window (e.g. "Morning")
    pub time_slot: String,
    /// Watering depth in cm
    pub watering_depth_cm: f64,
    /// Water applied per hour in liters
    pub water_volume_per_hour_liters: f64,
    /// Total water applied in the time slot in liters
    pub total_water_volume_liters: f64,
    /// Free-text advice, trimmed
    pub tips: String,
}

//! Extraction of the 5-day irrigation schedule from a model reply.
//!
//! The reply is free text. Each day block is found by its label sequence
//! (Day, Time Slot, Watering Depth, Water Volume per Hour, Total Water Volume,
//! Additional Tips), so the parse tolerates line breaks and spacing drift but
//! not numeric drift: `7,500` or `750 liters` fails the whole reply.
//!
//! Extraction is all-or-nothing. A single bad value discards every block.

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

use crate::models::IrrigationDayRecord;

/// Everything from `Day N` up to the whitespace after the `Additional Tips`
/// label. The tips text itself is the gap between one block head and the next.
static DAY_BLOCK_HEAD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?s)Day ([0-9]+)\s+Time Slot\s+(.+?)\s+Watering Depth\s+(.+?)\s+Water Volume per Hour\s+(.+?)\s+Total Water Volume\s+(.+?)\s+Additional Tips\s+",
    )
    .expect("day block pattern is valid")
});

#[derive(Debug, Error, PartialEq)]
pub enum ExtractionError {
    #[error("could not parse day number '{0}'")]
    InvalidDay(String),
    #[error("could not parse {field} value '{value}' as a number")]
    InvalidNumber { field: &'static str, value: String },
}

/// Parse every day block in `reply`, in order of appearance.
///
/// Returns an empty vector when no block matches. Day numbers are not
/// checked for range, uniqueness or contiguity.
pub fn extract_schedule(reply: &str) -> Result<Vec<IrrigationDayRecord>, ExtractionError> {
    let heads: Vec<regex::Captures<'_>> = DAY_BLOCK_HEAD.captures_iter(reply).collect();
    let mut records = Vec::with_capacity(heads.len());

    for (i, caps) in heads.iter().enumerate() {
        let head_end = caps.get(0).map_or(reply.len(), |m| m.end());
        let tips_end = heads
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map_or(reply.len(), |m| m.start());

        let day_raw = &caps[1];
        let day = day_raw
            .parse::<u32>()
            .map_err(|_| ExtractionError::InvalidDay(day_raw.to_string()))?;

        records.push(IrrigationDayRecord {
            day,
            time_slot: caps[2].to_string(),
            watering_depth_cm: parse_number("Watering Depth", &caps[3])?,
            water_volume_per_hour_liters: parse_number("Water Volume per Hour", &caps[4])?,
            total_water_volume_liters: parse_number("Total Water Volume", &caps[5])?,
            tips: reply[head_end..tips_end].trim().to_string(),
        });
    }

    Ok(records)
}

/// Plain decimal only. Surrounding whitespace is allowed, anything else
/// (thousands separators, units) is rejected.
fn parse_number(field: &'static str, raw: &str) -> Result<f64, ExtractionError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| ExtractionError::InvalidNumber {
            field,
            value: raw.to_string(),
        })
}

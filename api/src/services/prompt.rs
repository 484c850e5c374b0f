//! Prompt construction for the schedule request.
//!
//! The system message fixes the field order the extractor relies on:
//! Day, Time Slot, Watering Depth, Water Volume per Hour, Total Water Volume,
//! Additional Tips.

use crate::models::{ChatMessage, ScheduleRequest};

pub const SYSTEM_PROMPT: &str = concat!(
    "You are an irrigation scheduling assistant. For every request, you must generate a 5-day irrigation schedule for any given crop. ",
    "Each day should include a single preferred time slot based on rainfall prediction. Ensure that the output is in the following tabular format with fixed attributes for all crops. Each day's schedule should include the following columns:\n\n",
    "1. Day - The day of the schedule (1-5).\n",
    "2. Time Slot - The preferred time slot for watering based on rainfall prediction (e.g., Morning, Evening).\n",
    "3. Watering Depth - The depth of watering in cm.\n",
    "4. Water Volume per Hour - The amount of water applied per hour in liters.\n",
    "5. Total Water Volume - The total amount of water applied for the time slot in liters.\n",
    "6. Additional Tips - Any additional tips or recommendations related to irrigation.\n\n",
    "The generated output must be structured in the following tabular format:\n\n",
    "| Day | Time Slot | Watering Depth (cm) | Water Volume per Hour (liters) | Total Water Volume (liters) | Additional Tips |\n",
    "|-----|-----------|---------------------|-------------------------------|----------------------------|-----------------|\n",
    "| 1   | Morning    | 2.5                 | 750                           | 7,500                      | Tip example      |\n",
    "| 2   | Evening    | 1.5                 | 500                           | 4,000                      | Tip example      |\n",
    "| 3   | Morning    | 3.0                 | 1,000                         | 12,000                     | Tip example      |\n",
    "| 4   | Evening    | 2.0                 | 750                           | 6,000                      | Tip example      |\n",
    "| 5   | Morning    | 2.0                 | 750                           | 6,000                      | Tip example      |\n\n",
    "Additional Requirements:\n\n",
    "- Ensure that the total water volume for each day is provided by the amount of water applied in the preferred time slot.\n",
    "- Display the final output in a tabular format in your response.\n\n",
    "All generated results must follow this format and include the same attributes dynamically. Maintain consistency in the structure and attributes for every crop."
);

/// Render an optional reading the way the prompt has always shown a missing
/// value: the literal `None`.
fn value_or_none(v: Option<f64>) -> String {
    v.map(|x| x.to_string()).unwrap_or_else(|| "None".to_string())
}

/// Land size always comes from a decimal input, so whole values keep their
/// fractional part ("1.0 acres", not "1 acres"). `{:?}` on `f64` does that.
fn format_acres(acres: f64) -> String {
    format!("{:?}", acres)
}

/// Natural-language request for one crop/soil/location combination.
pub fn build_user_prompt(req: &ScheduleRequest) -> String {
    let temperature = value_or_none(req.weather.map(|w| w.temperature_c));
    let humidity = value_or_none(req.weather.map(|w| w.humidity_pct));

    format!(
        "Provide a 5-day irrigation schedule for {} crop in {} soil, \
         located in {}, with a land size of {} acres. The current temperature is {}°C \
         and the humidity is {}%. Include water irrigation techniques, strategies, timings, and the amount of water \
         required in liters for each day, broken down by the preferred time slot based on rainfall prediction, and provide insights based on the weather conditions.",
        req.crop_type,
        req.soil_type,
        req.location,
        format_acres(req.land_size_acres),
        temperature,
        humidity
    )
}

/// The `[system, user]` pair sent to the chat-completion endpoint.
pub fn build_messages(req: &ScheduleRequest) -> [ChatMessage; 2] {
    [
        ChatMessage::system(SYSTEM_PROMPT),
        ChatMessage::user(build_user_prompt(req)),
    ]
}

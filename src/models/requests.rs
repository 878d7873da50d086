//! Request DTOs for the watchlist scheduling API
//!
//! Defines the structure of incoming HTTP request bodies.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Request body for scheduling a show (POST /api/schedule)
///
/// # Fields
/// - `show_id`: identifier of the tracked show
/// - `air_date`: next episode air date; omitted means not yet announced,
///   which lands the show in the TBA bucket instead of the schedule
/// - `name`: display name carried into notifications
/// - `next_episode`: episode label, e.g. "S02E05"
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleRequest {
    pub show_id: String,
    #[serde(default)]
    pub air_date: Option<DateTime<Utc>>,
    pub name: String,
    #[serde(default)]
    pub next_episode: Option<String>,
}

impl ScheduleRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.show_id.is_empty() {
            return Some("show_id cannot be empty".to_string());
        }
        if self.name.is_empty() {
            return Some("name cannot be empty".to_string());
        }
        None
    }
}

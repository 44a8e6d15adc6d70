use serde::{Deserialize, Serialize};

use crate::models::city::Coordinates;

/// A venue's daily opening window as "HH:MM" strings.
///
/// A closing time numerically smaller than the opening time means the venue
/// closes past midnight (e.g. opens "18:00", closes "02:00").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleWindow {
    pub opens: String,
    pub closes: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attraction {
    /// Provider-qualified id (e.g. "wikidata:Q243") so re-ingesting the same
    /// source POI is idempotent.
    pub id: String,
    pub name: String,
    pub category: String,
    pub description: String,
    pub duration_minutes: u16,
    pub estimated_cost: f32,
    pub coordinates: Option<Coordinates>,
    pub rating: Option<f32>,
    pub is_must_see: bool,
    pub booking_required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opening_hours: Option<ScheduleWindow>,
    /// Cross-wiki presence count; the ranking signal for how well-known the
    /// point of interest is.
    pub popularity_score: u32,
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationKind {
    Home,
    Airport,
    City,
    Transit,
}

impl LocationKind {
    pub fn as_str(&self) -> &str {
        match self {
            LocationKind::Home => "home",
            LocationKind::Airport => "airport",
            LocationKind::City => "city",
            LocationKind::Transit => "transit",
        }
    }
}

/// Where the traveler physically is right now.
///
/// `city_key` is non-empty for every kind except `Transit`; while airborne
/// the traveler has no city at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TravelerLocation {
    pub kind: LocationKind,
    pub city_key: String,
    pub description: String,
    pub observed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlightStatus {
    Boarding,
    InFlight,
    Landed,
}

/// A single flight event fed to the transit tracker, in chronological order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightLeg {
    pub status: FlightStatus,
    pub origin_city: String,
    pub destination_city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arrival_time: Option<String>,
}

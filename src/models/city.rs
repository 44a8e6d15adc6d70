use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// How much a canonical city identity should be trusted.
///
/// `High` comes from the static multilingual directory, `Medium` from a
/// geocoder hit, `Low` from the capitalize-the-input fallback. Callers must
/// not draw geographic conclusions from a `Low` confidence result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanonicalCity {
    /// Stable ascii identifier, language-independent. All translations of a
    /// city name resolve to the same key.
    pub key: String,
    pub display_name: String,
    pub coordinates: Option<Coordinates>,
    pub confidence: Confidence,
}

impl CanonicalCity {
    pub fn same_city(&self, other: &CanonicalCity) -> bool {
        self.key == other.key
    }
}

use serde::{Deserialize, Serialize};

/// A typed itinerary element that needs an external booking or lookup link.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ReservationElement {
    Restaurant {
        name: String,
        #[serde(default)]
        address: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        place_id: Option<String>,
    },
    Hotel {
        name: String,
        destination: String,
    },
    Flight {
        origin: String,
        destination: String,
    },
    Attraction {
        name: String,
        #[serde(default)]
        address: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        place_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        website: Option<String>,
    },
}

/// Trip-date context for link synthesis. Everything is optional; missing
/// fields push the generated link toward a more generic search URL.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReservationContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_in: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_out: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passengers: Option<u8>,
}

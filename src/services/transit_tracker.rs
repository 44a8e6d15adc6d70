use chrono::Utc;
use serde::Serialize;

use crate::models::city::CanonicalCity;
use crate::models::location::{FlightLeg, FlightStatus, LocationKind, TravelerLocation};

/// Outcome of checking a proposed activity against the traveler's location.
/// An invalid activity is a validation rejection, not an error.
#[derive(Debug, Clone, Serialize)]
pub struct ActivityValidation {
    pub valid: bool,
    pub reason: String,
}

impl ActivityValidation {
    fn ok(reason: String) -> Self {
        Self {
            valid: true,
            reason,
        }
    }

    fn rejected(reason: String) -> Self {
        Self {
            valid: false,
            reason,
        }
    }
}

/// Tracks where the traveler physically is across a multi-leg trip.
///
/// One instance per planning session, mutated exactly once per flight event in
/// chronological order. Transitions are plain state updates with no side
/// effects; validation reads the current state and never mutates it.
pub struct TransitTracker {
    location: TravelerLocation,
    // Remembered across the airborne gap so reasons can name both endpoints.
    last_known_city: String,
}

impl TransitTracker {
    /// Start a session at home in the traveler's origin city.
    pub fn new(origin: &CanonicalCity, description: &str) -> Self {
        Self {
            location: TravelerLocation {
                kind: LocationKind::Home,
                city_key: origin.key.clone(),
                description: description.to_string(),
                observed_at: Utc::now(),
            },
            last_known_city: origin.display_name.clone(),
        }
    }

    pub fn location(&self) -> &TravelerLocation {
        &self.location
    }

    /// Any state -> airport. The traveler is still in the same city.
    pub fn go_to_airport(&mut self, airport_name: &str) {
        self.location = TravelerLocation {
            kind: LocationKind::Airport,
            city_key: self.location.city_key.clone(),
            description: airport_name.to_string(),
            observed_at: Utc::now(),
        };
    }

    /// Any state -> transit. The city key is cleared on purpose: there is no
    /// city while airborne, and no activity is permissible mid-flight.
    pub fn board_flight(&mut self, origin: &CanonicalCity, destination: &CanonicalCity) {
        self.last_known_city = origin.display_name.clone();
        self.location = TravelerLocation {
            kind: LocationKind::Transit,
            city_key: String::new(),
            description: format!(
                "In flight from {} to {}",
                origin.display_name, destination.display_name
            ),
            observed_at: Utc::now(),
        };
    }

    /// Transit -> city at the resolved destination.
    pub fn land_flight(&mut self, destination: &CanonicalCity, arrival_time: Option<&str>) {
        self.last_known_city = destination.display_name.clone();
        let description = match arrival_time {
            Some(time) => format!("Arrived in {} at {}", destination.display_name, time),
            None => format!("Arrived in {}", destination.display_name),
        };
        self.location = TravelerLocation {
            kind: LocationKind::City,
            city_key: destination.key.clone(),
            description,
            observed_at: Utc::now(),
        };
    }

    /// Apply one flight event. Boarding and in-flight both put the traveler
    /// in transit; only a landed event re-attaches them to a city.
    pub fn apply_flight_leg(
        &mut self,
        leg: &FlightLeg,
        origin: &CanonicalCity,
        destination: &CanonicalCity,
    ) {
        match leg.status {
            FlightStatus::Boarding | FlightStatus::InFlight => {
                self.board_flight(origin, destination)
            }
            FlightStatus::Landed => self.land_flight(destination, leg.arrival_time.as_deref()),
        }
    }

    /// Check whether an activity in `activity_city` is geographically
    /// consistent with the traveler's current location. The city must already
    /// be resolved to its canonical identity by the caller.
    pub fn validate(&self, activity_city: &CanonicalCity, activity_name: &str) -> ActivityValidation {
        if self.location.kind == LocationKind::Transit {
            return ActivityValidation::rejected(format!(
                "'{}' cannot happen mid-flight ({})",
                activity_name, self.location.description
            ));
        }

        if activity_city.key == self.location.city_key {
            ActivityValidation::ok(format!(
                "Traveler is in {} ({})",
                activity_city.display_name,
                self.location.kind.as_str()
            ))
        } else {
            ActivityValidation::rejected(format!(
                "'{}' is in {} but the traveler is in {}",
                activity_name, activity_city.display_name, self.last_known_city
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::city::{CanonicalCity, Confidence};

    fn city(key: &str, name: &str) -> CanonicalCity {
        CanonicalCity {
            key: key.to_string(),
            display_name: name.to_string(),
            coordinates: None,
            confidence: Confidence::High,
        }
    }

    #[test]
    fn session_starts_at_home() {
        let tracker = TransitTracker::new(&city("paris", "Paris"), "Home in the Marais");
        assert_eq!(tracker.location().kind, LocationKind::Home);
        assert_eq!(tracker.location().city_key, "paris");
    }

    #[test]
    fn airport_keeps_the_city() {
        let mut tracker = TransitTracker::new(&city("paris", "Paris"), "Home");
        tracker.go_to_airport("Charles de Gaulle");
        assert_eq!(tracker.location().kind, LocationKind::Airport);
        assert_eq!(tracker.location().city_key, "paris");

        let check = tracker.validate(&city("paris", "Paris"), "Louvre visit");
        assert!(check.valid);
    }

    #[test]
    fn nothing_is_valid_mid_flight() {
        let mut tracker = TransitTracker::new(&city("paris", "Paris"), "Home");
        tracker.board_flight(&city("paris", "Paris"), &city("barcelona", "Barcelona"));

        assert_eq!(tracker.location().kind, LocationKind::Transit);
        assert!(tracker.location().city_key.is_empty());

        let paris = tracker.validate(&city("paris", "Paris"), "Dinner");
        let barcelona = tracker.validate(&city("barcelona", "Barcelona"), "Tapas tour");
        assert!(!paris.valid);
        assert!(!barcelona.valid);
        assert!(paris.reason.contains("mid-flight"));
    }

    #[test]
    fn landing_reattaches_the_traveler() {
        let mut tracker = TransitTracker::new(&city("paris", "Paris"), "Home");
        tracker.board_flight(&city("paris", "Paris"), &city("barcelona", "Barcelona"));
        tracker.land_flight(&city("barcelona", "Barcelona"), Some("14:00"));

        assert_eq!(tracker.location().kind, LocationKind::City);
        assert_eq!(tracker.location().city_key, "barcelona");

        let local = tracker.validate(&city("barcelona", "Barcelona"), "Sagrada Família");
        assert!(local.valid);

        let wrong_city = tracker.validate(&city("paris", "Paris"), "Louvre visit");
        assert!(!wrong_city.valid);
        assert!(wrong_city.reason.contains("Paris"));
        assert!(wrong_city.reason.contains("Barcelona"));
    }

    #[test]
    fn flight_leg_events_drive_the_same_transitions() {
        let paris = city("paris", "Paris");
        let barcelona = city("barcelona", "Barcelona");
        let mut tracker = TransitTracker::new(&paris, "Home");

        let boarding = FlightLeg {
            status: FlightStatus::Boarding,
            origin_city: "Paris".to_string(),
            destination_city: "Barcelona".to_string(),
            arrival_time: None,
        };
        tracker.apply_flight_leg(&boarding, &paris, &barcelona);
        assert_eq!(tracker.location().kind, LocationKind::Transit);

        let landed = FlightLeg {
            status: FlightStatus::Landed,
            origin_city: "Paris".to_string(),
            destination_city: "Barcelona".to_string(),
            arrival_time: Some("09:30".to_string()),
        };
        tracker.apply_flight_leg(&landed, &paris, &barcelona);
        assert_eq!(tracker.location().kind, LocationKind::City);
        assert_eq!(tracker.location().city_key, "barcelona");
        assert!(tracker.location().description.contains("09:30"));
    }
}

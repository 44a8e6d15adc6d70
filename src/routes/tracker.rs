use actix_web::{web, HttpResponse, Responder};
use serde_json::json;

use crate::models::location::FlightLeg;
use crate::services::geo_identity_service::GeoIdentityResolver;
use crate::services::transit_tracker::TransitTracker;

#[derive(serde::Deserialize)]
pub struct ActivityCheck {
    pub city: String,
    pub name: String,
}

/// A full session replay: origin, the flight events so far in chronological
/// order, and the activity to validate against the resulting location.
#[derive(serde::Deserialize)]
pub struct ValidateRequest {
    pub origin_city: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub events: Vec<FlightLeg>,
    pub activity: ActivityCheck,
}

pub async fn validate_activity(
    resolver: web::Data<GeoIdentityResolver>,
    body: web::Json<ValidateRequest>,
) -> impl Responder {
    let request = body.into_inner();

    let origin = resolver.resolve(&request.origin_city).await;
    let description = request
        .description
        .unwrap_or_else(|| format!("Home in {}", origin.display_name));
    let mut tracker = TransitTracker::new(&origin, &description);

    for leg in &request.events {
        let leg_origin = resolver.resolve(&leg.origin_city).await;
        let leg_destination = resolver.resolve(&leg.destination_city).await;
        tracker.apply_flight_leg(leg, &leg_origin, &leg_destination);
    }

    let activity_city = resolver.resolve(&request.activity.city).await;
    let validation = tracker.validate(&activity_city, &request.activity.name);

    HttpResponse::Ok().json(json!({
        "valid": validation.valid,
        "reason": validation.reason,
        "location": tracker.location(),
    }))
}

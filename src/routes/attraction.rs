use actix_web::{web, HttpResponse, Responder};

use crate::models::city::Coordinates;
use crate::services::attraction_service::{AttractionService, SearchOptions};
use crate::services::geo_identity_service::GeoIdentityResolver;

#[derive(serde::Deserialize)]
pub struct QueryParams {
    destination: String,
    lat: Option<f64>,
    lng: Option<f64>,
    limit: Option<usize>,
    min_popularity: Option<u32>,
}

pub async fn search_attractions(
    attractions: web::Data<AttractionService>,
    resolver: web::Data<GeoIdentityResolver>,
    params: web::Query<QueryParams>,
) -> impl Responder {
    if params.destination.trim().is_empty() {
        return HttpResponse::BadRequest().body("Missing destination.");
    }

    // Explicit coordinates win; otherwise the destination name has to resolve
    // to something with a location.
    let center = match (params.lat, params.lng) {
        (Some(lat), Some(lng)) => Coordinates { lat, lng },
        _ => {
            let city = resolver.resolve(&params.destination).await;
            match city.coordinates {
                Some(coordinates) => coordinates,
                None => {
                    eprintln!(
                        "No coordinates for destination '{}' (confidence {:?})",
                        params.destination, city.confidence
                    );
                    return HttpResponse::UnprocessableEntity()
                        .body("Destination could not be located.");
                }
            }
        }
    };

    let results = attractions
        .search(
            &params.destination,
            center,
            SearchOptions {
                limit: params.limit,
                min_popularity: params.min_popularity,
            },
        )
        .await;

    HttpResponse::Ok().json(results)
}

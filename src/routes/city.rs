use actix_web::{web, HttpResponse, Responder};

use crate::services::geo_identity_service::GeoIdentityResolver;

#[derive(serde::Deserialize)]
pub struct QueryParams {
    name: String,
}

pub async fn resolve_city(
    resolver: web::Data<GeoIdentityResolver>,
    params: web::Query<QueryParams>,
) -> impl Responder {
    if params.name.trim().is_empty() {
        return HttpResponse::BadRequest().body("Missing city name.");
    }

    let city = resolver.resolve(&params.name).await;
    HttpResponse::Ok().json(city)
}

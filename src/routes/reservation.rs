use actix_web::{web, HttpResponse, Responder};
use serde_json::json;

use crate::models::reservation::{ReservationContext, ReservationElement};
use crate::services::reservation_link_service::generate_reservation_link;

#[derive(serde::Deserialize)]
pub struct LinkRequest {
    element: ReservationElement,
    #[serde(default)]
    context: ReservationContext,
}

pub async fn reservation_link(body: web::Json<LinkRequest>) -> impl Responder {
    let url = generate_reservation_link(&body.element, &body.context);
    HttpResponse::Ok().json(json!({ "url": url }))
}

use actix_web::{test, web, App};
use serde_json::json;

use wayfarer_api::routes;
use wayfarer_api::services::attraction_cache::AttractionCache;
use wayfarer_api::services::attraction_service::{AttractionService, SourcingConfig};
use wayfarer_api::services::geo_identity_service::{CityDirectory, GeoIdentityResolver};

fn resolver_data() -> web::Data<GeoIdentityResolver> {
    web::Data::new(GeoIdentityResolver::new(CityDirectory::new()))
}

fn attraction_data() -> web::Data<AttractionService> {
    let dir = std::env::temp_dir().join(format!("wayfarer-route-test-{}", std::process::id()));
    web::Data::new(AttractionService::new(
        AttractionCache::new(dir),
        SourcingConfig::default(),
    ))
}

#[actix_web::test]
async fn test_resolve_city_endpoint() {
    let app = test::init_service(
        App::new()
            .app_data(resolver_data())
            .route("/cities/resolve", web::get().to(routes::city::resolve_city)),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/cities/resolve?name=Londres")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["key"], "london");
    assert_eq!(body["display_name"], "London");
    assert_eq!(body["confidence"], "high");
}

#[actix_web::test]
async fn test_resolve_city_rejects_empty_name() {
    let app = test::init_service(
        App::new()
            .app_data(resolver_data())
            .route("/cities/resolve", web::get().to(routes::city::resolve_city)),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/cities/resolve?name=")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_client_error());
}

#[actix_web::test]
async fn test_attraction_search_rejects_empty_destination() {
    let app = test::init_service(
        App::new()
            .app_data(resolver_data())
            .app_data(attraction_data())
            .route(
                "/attractions/search",
                web::get().to(routes::attraction::search_attractions),
            ),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/attractions/search?destination=")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_attraction_search_rejects_unlocatable_destination() {
    // The destination is not in the directory and the geocoder is
    // unreachable, so the resolver degrades to a coordinate-less answer.
    let resolver = web::Data::new(GeoIdentityResolver::with_geocoder_url(
        CityDirectory::new(),
        "http://127.0.0.1:9/search".to_string(),
    ));
    let app = test::init_service(
        App::new().app_data(resolver).app_data(attraction_data()).route(
            "/attractions/search",
            web::get().to(routes::attraction::search_attractions),
        ),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/attractions/search?destination=Atlantis")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(
        resp.status(),
        actix_web::http::StatusCode::UNPROCESSABLE_ENTITY
    );
}

#[actix_web::test]
async fn test_schedule_select_endpoint() {
    let app = test::init_service(
        App::new().route("/schedule/select", web::post().to(routes::schedule::select_time)),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/schedule/select")
        .set_json(&json!({
            "opens": "08:00",
            "closes": "17:00",
            "slot": "dinner"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["hour"], 16);
    assert_eq!(body["time"], "16:00");
    assert_eq!(body["guaranteed"], true);
}

#[actix_web::test]
async fn test_schedule_round_endpoint() {
    let app = test::init_service(
        App::new().route("/schedule/round", web::post().to(routes::schedule::round_time)),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/schedule/round")
        .set_json(&json!({ "time": "19:12" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["time"], "19:00");
}

#[actix_web::test]
async fn test_schedule_round_rejects_unparseable_time() {
    let app = test::init_service(
        App::new().route("/schedule/round", web::post().to(routes::schedule::round_time)),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/schedule/round")
        .set_json(&json!({ "time": "7pm" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_tracker_rejects_activity_mid_flight() {
    let app = test::init_service(
        App::new().app_data(resolver_data()).route(
            "/tracker/validate",
            web::post().to(routes::tracker::validate_activity),
        ),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/tracker/validate")
        .set_json(&json!({
            "origin_city": "Paris",
            "events": [
                { "status": "in_flight", "origin_city": "Paris", "destination_city": "Barcelona" }
            ],
            "activity": { "city": "Barcelona", "name": "Tapas tour" }
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["valid"], false);
    assert_eq!(body["location"]["kind"], "transit");
}

#[actix_web::test]
async fn test_tracker_validates_after_landing() {
    let app = test::init_service(
        App::new().app_data(resolver_data()).route(
            "/tracker/validate",
            web::post().to(routes::tracker::validate_activity),
        ),
    )
    .await;

    let events = json!([
        { "status": "boarding", "origin_city": "Paris", "destination_city": "Barcelona" },
        { "status": "landed", "origin_city": "Paris", "destination_city": "Barcelona",
          "arrival_time": "14:00" }
    ]);

    let req = test::TestRequest::post()
        .uri("/tracker/validate")
        .set_json(&json!({
            "origin_city": "Paris",
            "events": events.clone(),
            "activity": { "city": "Barcelona", "name": "Sagrada Família" }
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["valid"], true);
    assert_eq!(body["location"]["city_key"], "barcelona");

    // Same session state, wrong city.
    let req = test::TestRequest::post()
        .uri("/tracker/validate")
        .set_json(&json!({
            "origin_city": "Paris",
            "events": events,
            "activity": { "city": "Paris", "name": "Louvre visit" }
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["valid"], false);
    let reason = body["reason"].as_str().unwrap();
    assert!(reason.contains("Paris") && reason.contains("Barcelona"));
}

#[actix_web::test]
async fn test_reservation_link_endpoint() {
    let app = test::init_service(App::new().route(
        "/reservations/link",
        web::post().to(routes::reservation::reservation_link),
    ))
    .await;

    let req = test::TestRequest::post()
        .uri("/reservations/link")
        .set_json(&json!({
            "element": {
                "type": "flight",
                "origin": "Paris",
                "destination": "Barcelona"
            },
            "context": { "date": "2025-06-01", "return_date": "2025-06-08" }
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(
        body["url"],
        "https://www.skyscanner.com/transport/flights/paris/barcelona/250601/250608/"
    );
}

#[actix_web::test]
async fn test_reservation_link_with_no_context() {
    let app = test::init_service(App::new().route(
        "/reservations/link",
        web::post().to(routes::reservation::reservation_link),
    ))
    .await;

    let req = test::TestRequest::post()
        .uri("/reservations/link")
        .set_json(&json!({
            "element": {
                "type": "restaurant",
                "name": "Chez Janou",
                "address": "Paris"
            }
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: serde_json::Value = test::read_body_json(resp).await;
    let url = body["url"].as_str().unwrap();
    assert!(!url.is_empty());
    assert!(url.starts_with("https://www.google.com/maps/search/"));
}

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;

use wayfarer_api::routes;
use wayfarer_api::services::attraction_cache::AttractionCache;
use wayfarer_api::services::attraction_service::{AttractionService, SourcingConfig};
use wayfarer_api::services::geo_identity_service::{CityDirectory, GeoIdentityResolver};

const HOST: &str = "0.0.0.0";
const PORT: u16 = 8080;
const DEFAULT_CACHE_DIR: &str = "cache/attractions";

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    println!("Application starting...");

    env_logger::init_from_env(Env::default().default_filter_or("info"));

    if cfg!(debug_assertions) {
        dotenv::dotenv().ok();
    }

    let host = std::env::var("HOST").unwrap_or_else(|_| HOST.to_string());
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| PORT.to_string())
        .parse()
        .unwrap_or(PORT);

    let directory = CityDirectory::new();
    println!("City directory loaded with {} cities", directory.len());
    let resolver = web::Data::new(GeoIdentityResolver::new(directory));

    let cache_dir =
        std::env::var("ATTRACTION_CACHE_DIR").unwrap_or_else(|_| DEFAULT_CACHE_DIR.to_string());
    let config = SourcingConfig::from_env();
    let attractions = web::Data::new(AttractionService::new(
        AttractionCache::new(&cache_dir),
        config,
    ));
    println!("Attraction cache directory: {}", cache_dir);

    println!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .route("/health", web::get().to(|| async { "OK" }))
            .app_data(resolver.clone())
            .app_data(attractions.clone())
            .service(
                web::scope("/api")
                    .route(
                        "/cities/resolve",
                        web::get().to(routes::city::resolve_city),
                    )
                    .route(
                        "/attractions/search",
                        web::get().to(routes::attraction::search_attractions),
                    )
                    .service(
                        web::scope("/schedule")
                            .route("/select", web::post().to(routes::schedule::select_time))
                            .route("/round", web::post().to(routes::schedule::round_time)),
                    )
                    .route(
                        "/tracker/validate",
                        web::post().to(routes::tracker::validate_activity),
                    )
                    .route(
                        "/reservations/link",
                        web::post().to(routes::reservation::reservation_link),
                    ),
            )
    })
    .bind((host, port))?
    .run()
    .await
}

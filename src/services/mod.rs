pub mod attraction_cache;
pub mod attraction_service;
pub mod geo_identity_service;
pub mod reservation_link_service;
pub mod schedule_service;
pub mod transit_tracker;

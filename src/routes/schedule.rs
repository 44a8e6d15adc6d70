use actix_web::{web, HttpResponse, Responder};
use serde_json::json;

use crate::models::attraction::ScheduleWindow;
use crate::services::schedule_service::{
    available_hours, select_meal_time, try_round_time_to_hour, MealSlot,
};

#[derive(serde::Deserialize)]
pub struct SelectTimeRequest {
    opens: String,
    closes: String,
    slot: MealSlot,
}

#[derive(serde::Deserialize)]
pub struct RoundTimeRequest {
    time: String,
}

pub async fn select_time(body: web::Json<SelectTimeRequest>) -> impl Responder {
    let window = ScheduleWindow {
        opens: body.opens.clone(),
        closes: body.closes.clone(),
    };
    let hours = available_hours(&window);
    let hour = select_meal_time(&window, body.slot);
    // An empty availability list means the hour is a degraded fallback, not a
    // guaranteed-open slot.
    let guaranteed = !hours.is_empty();

    HttpResponse::Ok().json(json!({
        "hour": hour,
        "time": format!("{:02}:00", hour),
        "available_hours": hours,
        "guaranteed": guaranteed,
    }))
}

pub async fn round_time(body: web::Json<RoundTimeRequest>) -> impl Responder {
    match try_round_time_to_hour(&body.time) {
        Some(time) => HttpResponse::Ok().json(json!({ "time": time })),
        None => HttpResponse::BadRequest().json(json!({
            "message": "Time must be in HH:MM format."
        })),
    }
}

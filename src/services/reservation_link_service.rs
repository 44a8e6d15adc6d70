use chrono::NaiveDate;
use url::Url;

use crate::models::reservation::{ReservationContext, ReservationElement};

const MAPS_SEARCH_URL: &str = "https://www.google.com/maps/search/?api=1";
const MAPS_PLACE_URL: &str = "https://www.google.com/maps/place/?api=1";
const HOTEL_SEARCH_URL: &str = "https://www.booking.com/searchresults.html";
const FLIGHT_DEEP_LINK_BASE: &str = "https://www.skyscanner.com/transport/flights";
const GENERIC_SEARCH_URL: &str = "https://www.google.com/search";

/// Build the external booking/lookup link for a typed itinerary element.
///
/// Never fails and never returns an empty string: every branch bottoms out in
/// a generic search URL, because a broken link is worse than an imprecise one.
pub fn generate_reservation_link(
    element: &ReservationElement,
    context: &ReservationContext,
) -> String {
    match element {
        ReservationElement::Restaurant {
            name,
            address,
            place_id,
        } => map_link(name, address, place_id.as_deref()),
        ReservationElement::Hotel { name, destination } => hotel_link(name, destination, context),
        ReservationElement::Flight {
            origin,
            destination,
        } => flight_link(origin, destination, context),
        ReservationElement::Attraction {
            name,
            address,
            place_id,
            website,
        } => match website {
            Some(site) if !site.trim().is_empty() => site.trim().to_string(),
            _ => map_link(name, address, place_id.as_deref()),
        },
    }
}

/// Place-id deep link when we have one, else a name+address map search.
fn map_link(name: &str, address: &str, place_id: Option<&str>) -> String {
    if let Some(id) = place_id.filter(|id| !id.trim().is_empty()) {
        if let Ok(mut url) = Url::parse(MAPS_PLACE_URL) {
            url.query_pairs_mut().append_pair("query_place_id", id.trim());
            return url.to_string();
        }
    }

    let query = if address.trim().is_empty() {
        name.trim().to_string()
    } else {
        format!("{} {}", name.trim(), address.trim())
    };
    match Url::parse(MAPS_SEARCH_URL) {
        Ok(mut url) => {
            url.query_pairs_mut().append_pair("query", &query);
            url.to_string()
        }
        Err(_) => generic_search(&query),
    }
}

fn hotel_link(name: &str, destination: &str, context: &ReservationContext) -> String {
    let mut url = match Url::parse(HOTEL_SEARCH_URL) {
        Ok(url) => url,
        Err(_) => return generic_search(&format!("{} hotel {}", name, destination)),
    };

    {
        let mut pairs = url.query_pairs_mut();
        let place = if destination.trim().is_empty() {
            name.trim()
        } else {
            destination.trim()
        };
        pairs.append_pair("ss", place);
        if let Some(check_in) = local_date(context.check_in.as_deref()) {
            pairs.append_pair("checkin", &check_in.format("%Y-%m-%d").to_string());
        }
        if let Some(check_out) = local_date(context.check_out.as_deref()) {
            pairs.append_pair("checkout", &check_out.format("%Y-%m-%d").to_string());
        }
        let guests = context.passengers.unwrap_or(2).max(1);
        pairs.append_pair("group_adults", &guests.to_string());
    }
    url.to_string()
}

/// Deep link path grammar: /{origin}/{destination}/{yymmdd}[/{yymmdd}]/.
/// Unparseable or missing parts fall back to a generic flight search.
fn flight_link(origin: &str, destination: &str, context: &ReservationContext) -> String {
    let origin_slug = place_slug(origin);
    let destination_slug = place_slug(destination);
    let outbound = local_date(context.date.as_deref());

    match (origin_slug, destination_slug, outbound) {
        (Some(from), Some(to), Some(out_date)) => {
            let mut path = format!(
                "{}/{}/{}/{}",
                FLIGHT_DEEP_LINK_BASE,
                from,
                to,
                out_date.format("%y%m%d")
            );
            if let Some(return_date) = local_date(context.return_date.as_deref()) {
                path.push_str(&format!("/{}", return_date.format("%y%m%d")));
            }
            path.push('/');
            path
        }
        _ => generic_search(&format!("flights from {} to {}", origin, destination)),
    }
}

/// Compact lowercase place token for the flight path grammar.
fn place_slug(place: &str) -> Option<String> {
    let slug: String = place
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    let slug = slug.trim_matches('-').to_string();
    if slug.is_empty() {
        None
    } else {
        Some(slug)
    }
}

/// Parse an ISO "YYYY-MM-DD" date on its calendar components alone.
///
/// Deliberately a NaiveDate: converting through UTC could shift the day
/// depending on the server timezone, and the rest of the engine is
/// timezone-naive.
fn local_date(input: Option<&str>) -> Option<NaiveDate> {
    let raw = input?.trim();
    // Tolerate a trailing time part ("2025-06-01T10:00:00").
    let date_part = raw.split(['T', ' ']).next().unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

fn generic_search(query: &str) -> String {
    match Url::parse(GENERIC_SEARCH_URL) {
        Ok(mut url) => {
            url.query_pairs_mut().append_pair("q", query.trim());
            url.to_string()
        }
        // Url::parse of a const never fails; keep a terminal fallback anyway.
        Err(_) => GENERIC_SEARCH_URL.to_string(),
    }
}

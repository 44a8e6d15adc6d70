//! Attraction Sourcing Pipeline
//!
//! Discovers candidate points of interest around a city center from a
//! geodata provider, enriches them in batches against a knowledge base,
//! filters noise, keeps religious sites from crowding the list, ranks by
//! popularity and persists the result in a 30-day file cache.
//!
//! ## Pipeline
//! cache check -> discovery -> exclusion filter -> batch enrichment ->
//! popularity threshold -> religious diversification -> rank & cap -> persist
//!
//! Every network failure degrades: stale cache if available, otherwise an
//! empty list the caller should treat as "try an alternate source".

use regex::Regex;
use reqwest;
use serde::Deserialize;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tokio::time::sleep;

use crate::models::attraction::{Attraction, ScheduleWindow};
use crate::models::city::Coordinates;
use crate::services::attraction_cache::{cache_key, AttractionCache};

const OVERPASS_BASE_URL: &str = "https://overpass-api.de/api/interpreter";
const WIKIDATA_BASE_URL: &str = "https://www.wikidata.org/w/api.php";
const USER_AGENT: &str = "wayfarer-api/0.1 (itinerary planner)";
const HTTP_TIMEOUT_SECS: u64 = 25;

const DEFAULT_SEARCH_RADIUS_DEG: f64 = 0.05;
const DEFAULT_ENRICHMENT_BATCH_SIZE: usize = 50;
const DEFAULT_BATCH_DELAY_MS: u64 = 300;
const DEFAULT_LIMIT: usize = 20;
const DEFAULT_MIN_POPULARITY: u32 = 5;
const DEFAULT_RELIGIOUS_CAP: usize = 3;
const DEFAULT_RELIGIOUS_FLOOR: u32 = 20;

// POI categories that never make the list: burial sites, generic info
// points, and lodging (hotels come from a separate pipeline).
const EXCLUDED_CATEGORIES: &[&str] = &[
    "tomb",
    "grave_yard",
    "information",
    "hotel",
    "hostel",
    "guest_house",
    "apartment",
    "motel",
    "camp_site",
    "caravan_site",
];

// Name-level noise: zoo inhabitants tagged as attractions, tourist-trap
// chains, and minor memorial clutter.
const NOISE_NAME_PATTERNS: &[&str] = &[
    r"(?i)\b(lion|tiger|giraffe|elephant|penguin|gorilla|panda|zebra|hippo)s?\b",
    r"(?i)madame tussauds?",
    r"(?i)hard rock caf[eé]",
    r"(?i)ripley's",
    r"(?i)\b(memorial|cemetery|obelisk)\b",
];

const RELIGIOUS_CATEGORIES: &[&str] = &[
    "place_of_worship",
    "church",
    "cathedral",
    "basilica",
    "chapel",
    "mosque",
    "temple",
    "synagogue",
    "monastery",
    "shrine",
];

#[derive(Debug, Clone)]
pub struct SourcingConfig {
    pub search_radius_deg: f64,
    pub enrichment_batch_size: usize,
    pub batch_delay_ms: u64,
    pub default_limit: usize,
    pub default_min_popularity: u32,
    pub religious_site_cap: usize,
    pub religious_popularity_floor: u32,
}

impl Default for SourcingConfig {
    fn default() -> Self {
        Self {
            search_radius_deg: DEFAULT_SEARCH_RADIUS_DEG,
            enrichment_batch_size: DEFAULT_ENRICHMENT_BATCH_SIZE,
            batch_delay_ms: DEFAULT_BATCH_DELAY_MS,
            default_limit: DEFAULT_LIMIT,
            default_min_popularity: DEFAULT_MIN_POPULARITY,
            religious_site_cap: DEFAULT_RELIGIOUS_CAP,
            religious_popularity_floor: DEFAULT_RELIGIOUS_FLOOR,
        }
    }
}

impl SourcingConfig {
    /// Create config from environment variables or use defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            search_radius_deg: std::env::var("ATTRACTION_SEARCH_RADIUS_DEG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.search_radius_deg),
            enrichment_batch_size: std::env::var("ATTRACTION_BATCH_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.enrichment_batch_size),
            batch_delay_ms: std::env::var("ATTRACTION_BATCH_DELAY_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.batch_delay_ms),
            default_limit: std::env::var("ATTRACTION_DEFAULT_LIMIT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.default_limit),
            default_min_popularity: std::env::var("ATTRACTION_MIN_POPULARITY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.default_min_popularity),
            religious_site_cap: std::env::var("ATTRACTION_RELIGIOUS_CAP")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.religious_site_cap),
            religious_popularity_floor: std::env::var("ATTRACTION_RELIGIOUS_FLOOR")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.religious_popularity_floor),
        }
    }
}

/// Exclusion rules kept as swappable data so false positives can be fixed
/// without touching the pipeline.
pub struct FilterRules {
    excluded_categories: HashSet<String>,
    noise_patterns: Vec<Regex>,
}

impl FilterRules {
    pub fn from_lists(categories: &[&str], patterns: &[&str]) -> Self {
        Self {
            excluded_categories: categories.iter().map(|c| c.to_string()).collect(),
            noise_patterns: patterns
                .iter()
                .filter_map(|p| match Regex::new(p) {
                    Ok(re) => Some(re),
                    Err(e) => {
                        eprintln!("Skipping invalid noise pattern '{}': {}", p, e);
                        None
                    }
                })
                .collect(),
        }
    }

    pub fn excludes(&self, candidate: &DiscoveredPoi) -> bool {
        if self.excluded_categories.contains(&candidate.category) {
            return true;
        }
        self.noise_patterns
            .iter()
            .any(|re| re.is_match(&candidate.name))
    }
}

impl Default for FilterRules {
    fn default() -> Self {
        Self::from_lists(EXCLUDED_CATEGORIES, NOISE_NAME_PATTERNS)
    }
}

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<OverpassElement>,
}

#[derive(Debug, Deserialize)]
struct OverpassElement {
    lat: Option<f64>,
    lon: Option<f64>,
    center: Option<OverpassCenter>,
    #[serde(default)]
    tags: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct OverpassCenter {
    lat: f64,
    lon: f64,
}

impl OverpassElement {
    fn coordinates(&self) -> Option<Coordinates> {
        if let (Some(lat), Some(lng)) = (self.lat, self.lon) {
            return Some(Coordinates { lat, lng });
        }
        self.center.as_ref().map(|c| Coordinates {
            lat: c.lat,
            lng: c.lon,
        })
    }
}

/// A named, knowledge-base-linked POI straight out of discovery.
#[derive(Debug, Clone)]
pub struct DiscoveredPoi {
    pub wikidata_id: String,
    pub name: String,
    pub category: String,
    pub coordinates: Option<Coordinates>,
    pub opening_hours: Option<String>,
}

/// Knowledge-base enrichment for one entity.
#[derive(Debug, Clone, Default)]
pub struct Enrichment {
    pub label: Option<String>,
    pub description: Option<String>,
    pub sitelink_count: u32,
    pub coordinates: Option<Coordinates>,
    pub image: Option<String>,
    pub website: Option<String>,
}

pub struct SearchOptions {
    pub limit: Option<usize>,
    pub min_popularity: Option<u32>,
}

pub struct AttractionService {
    http_client: reqwest::Client,
    cache: AttractionCache,
    config: SourcingConfig,
    rules: FilterRules,
    overpass_url: String,
    wikidata_url: String,
}

impl AttractionService {
    pub fn new(cache: AttractionCache, config: SourcingConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();

        Self {
            http_client,
            cache,
            config,
            rules: FilterRules::default(),
            overpass_url: OVERPASS_BASE_URL.to_string(),
            wikidata_url: WIKIDATA_BASE_URL.to_string(),
        }
    }

    pub fn with_rules(mut self, rules: FilterRules) -> Self {
        self.rules = rules;
        self
    }

    /// Point discovery and enrichment at alternate endpoints, mainly so the
    /// degraded paths can be exercised against an unreachable provider.
    pub fn with_endpoints(mut self, overpass_url: String, wikidata_url: String) -> Self {
        self.overpass_url = overpass_url;
        self.wikidata_url = wikidata_url;
        self
    }

    /// Search attractions around `city_center`, best first.
    ///
    /// A fresh cache entry short-circuits the whole pipeline. Upstream
    /// failure falls back to a stale entry if one exists, otherwise an empty
    /// list; the caller must read "empty" as "try another source", not as
    /// "this city has no attractions".
    pub async fn search(
        &self,
        destination: &str,
        city_center: Coordinates,
        options: SearchOptions,
    ) -> Vec<Attraction> {
        let limit = options.limit.unwrap_or(self.config.default_limit);
        let min_popularity = options
            .min_popularity
            .unwrap_or(self.config.default_min_popularity);
        let key = cache_key(destination, city_center.lat, city_center.lng);

        if let Some(cached) = self.cache.read_fresh(&key) {
            println!(
                "Serving {} attractions for '{}' from cache",
                cached.len().min(limit),
                destination
            );
            return cached.into_iter().take(limit).collect();
        }

        let pois = match self.discover(city_center).await {
            Ok(pois) => pois,
            Err(e) => {
                eprintln!("Attraction discovery for '{}' failed: {}", destination, e);
                return match self.cache.read_any(&key) {
                    Some(stale) => {
                        println!("Serving stale attraction cache for '{}'", destination);
                        stale.into_iter().take(limit).collect()
                    }
                    None => Vec::new(),
                };
            }
        };

        let kept: Vec<DiscoveredPoi> = pois
            .into_iter()
            .filter(|poi| !self.rules.excludes(poi))
            .collect();
        println!(
            "Discovery for '{}' kept {} candidates after exclusion filtering",
            destination,
            kept.len()
        );

        let enrichments = self.enrich_batched(&kept).await;
        let mut attractions = assemble_attractions(kept, &enrichments);

        attractions.retain(|a| a.popularity_score >= min_popularity);
        attractions = diversify_religious_sites(
            attractions,
            self.config.religious_site_cap,
            religious_floor(min_popularity, self.config.religious_popularity_floor),
        );
        rank_by_popularity(&mut attractions);

        // The full ranked list goes to the cache so a later, larger request
        // is still a cache hit.
        if let Err(e) = self.cache.write(&key, &attractions) {
            eprintln!("Failed to persist attraction cache for '{}': {}", destination, e);
        }

        attractions.into_iter().take(limit).collect()
    }

    /// Stage 2: bounding-box discovery of named, wikidata-tagged POIs.
    async fn discover(
        &self,
        center: Coordinates,
    ) -> Result<Vec<DiscoveredPoi>, Box<dyn std::error::Error>> {
        let r = self.config.search_radius_deg;
        let bbox = format!(
            "{},{},{},{}",
            center.lat - r,
            center.lng - r,
            center.lat + r,
            center.lng + r
        );

        let query = format!(
            r#"[out:json][timeout:25];
(
  nwr["tourism"]["wikidata"]({bbox});
  nwr["historic"]["wikidata"]({bbox});
  nwr["leisure"~"^(park|garden)$"]["wikidata"]({bbox});
  nwr["amenity"~"^(place_of_worship|theatre|arts_centre)$"]["wikidata"]({bbox});
);
out center tags;"#
        );

        let response: OverpassResponse = self
            .http_client
            .post(&self.overpass_url)
            .header("User-Agent", USER_AGENT)
            .body(query)
            .send()
            .await?
            .json()
            .await?;

        let mut pois = Vec::new();
        for element in response.elements {
            // Unenrichable candidates are dropped, not kept with placeholders.
            let name = match element.tags.get("name") {
                Some(name) if !name.is_empty() => name.clone(),
                _ => continue,
            };
            let wikidata_id = match element.tags.get("wikidata") {
                Some(id) if !id.is_empty() => id.clone(),
                _ => continue,
            };

            pois.push(DiscoveredPoi {
                coordinates: element.coordinates(),
                category: poi_category(&element.tags),
                opening_hours: element.tags.get("opening_hours").cloned(),
                name,
                wikidata_id,
            });
        }
        Ok(pois)
    }

    /// Stage 4: look up wikidata ids in capped batches with an inter-batch
    /// delay so the provider does not throttle us. A failed batch is logged
    /// and skipped; its candidates simply miss enrichment.
    async fn enrich_batched(&self, pois: &[DiscoveredPoi]) -> HashMap<String, Enrichment> {
        let ids: Vec<&str> = {
            let mut seen = HashSet::new();
            pois.iter()
                .map(|p| p.wikidata_id.as_str())
                .filter(|id| seen.insert(*id))
                .collect()
        };

        let mut enrichments = HashMap::new();
        for (index, batch) in ids.chunks(self.config.enrichment_batch_size).enumerate() {
            if index > 0 {
                sleep(Duration::from_millis(self.config.batch_delay_ms)).await;
            }
            match self.fetch_entities(batch).await {
                Ok(batch_result) => enrichments.extend(batch_result),
                Err(e) => {
                    eprintln!("Enrichment batch of {} ids failed: {}", batch.len(), e);
                }
            }
        }
        enrichments
    }

    async fn fetch_entities(
        &self,
        ids: &[&str],
    ) -> Result<HashMap<String, Enrichment>, Box<dyn std::error::Error>> {
        let joined_ids = ids.join("|");
        let body: Value = self
            .http_client
            .get(&self.wikidata_url)
            .query(&[
                ("action", "wbgetentities"),
                ("ids", joined_ids.as_str()),
                ("props", "labels|descriptions|sitelinks|claims"),
                ("languages", "en|fr"),
                ("format", "json"),
            ])
            .header("User-Agent", USER_AGENT)
            .send()
            .await?
            .json()
            .await?;

        let entities = body
            .get("entities")
            .and_then(Value::as_object)
            .ok_or("knowledge base response has no entities")?;

        let mut enrichments = HashMap::new();
        for (id, entity) in entities {
            enrichments.insert(id.clone(), parse_entity(entity));
        }
        Ok(enrichments)
    }
}

fn poi_category(tags: &HashMap<String, String>) -> String {
    for family in ["tourism", "historic", "leisure", "amenity"] {
        if let Some(value) = tags.get(family) {
            if value != "yes" {
                return value.clone();
            }
        }
    }
    "attraction".to_string()
}

fn parse_entity(entity: &Value) -> Enrichment {
    let label = ["en", "fr"].iter().find_map(|lang| {
        entity
            .pointer(&format!("/labels/{}/value", lang))
            .and_then(Value::as_str)
            .map(str::to_string)
    });
    let description = ["en", "fr"].iter().find_map(|lang| {
        entity
            .pointer(&format!("/descriptions/{}/value", lang))
            .and_then(Value::as_str)
            .map(str::to_string)
    });

    // Cross-wiki presence is the popularity proxy.
    let sitelink_count = entity
        .get("sitelinks")
        .and_then(Value::as_object)
        .map(|links| links.len() as u32)
        .unwrap_or(0);

    let coordinates = entity
        .pointer("/claims/P625/0/mainsnak/datavalue/value")
        .and_then(|value| {
            Some(Coordinates {
                lat: value.get("latitude")?.as_f64()?,
                lng: value.get("longitude")?.as_f64()?,
            })
        });

    let image = entity
        .pointer("/claims/P18/0/mainsnak/datavalue/value")
        .and_then(Value::as_str)
        .map(str::to_string);

    let website = entity
        .pointer("/claims/P856/0/mainsnak/datavalue/value")
        .and_then(Value::as_str)
        .map(str::to_string);

    Enrichment {
        label,
        description,
        sitelink_count,
        coordinates,
        image,
        website,
    }
}

/// Try to read a simple "HH:MM-HH:MM" opening-hours tag. Anything more
/// elaborate (day ranges, multiple intervals) is ignored.
fn parse_opening_hours(raw: &str) -> Option<ScheduleWindow> {
    let (opens, closes) = raw.trim().split_once('-')?;
    let looks_like_time = |s: &str| {
        let (h, m) = match s.trim().split_once(':') {
            Some(parts) => parts,
            None => return false,
        };
        h.parse::<u32>().map_or(false, |h| h < 24) && m.parse::<u32>().map_or(false, |m| m < 60)
    };
    if !looks_like_time(opens) || !looks_like_time(closes) {
        return None;
    }
    Some(ScheduleWindow {
        opens: opens.trim().to_string(),
        closes: closes.trim().to_string(),
    })
}

fn default_duration_minutes(category: &str) -> u16 {
    match category {
        "museum" | "theme_park" | "zoo" => 150,
        "gallery" | "castle" | "fort" => 120,
        "park" | "garden" | "attraction" => 90,
        "viewpoint" | "monument" | "artwork" => 30,
        _ => 60,
    }
}

fn estimated_cost(category: &str) -> f32 {
    match category {
        "museum" | "gallery" | "castle" => 15.0,
        "theme_park" | "zoo" | "aquarium" => 30.0,
        _ => 0.0,
    }
}

/// Stages 4.5: merge discovery and enrichment into candidates, deduplicating
/// by provider-qualified id so re-ingestion is idempotent.
pub fn assemble_attractions(
    pois: Vec<DiscoveredPoi>,
    enrichments: &HashMap<String, Enrichment>,
) -> Vec<Attraction> {
    let mut seen = HashSet::new();
    let mut attractions = Vec::new();

    for poi in pois {
        let id = format!("wikidata:{}", poi.wikidata_id);
        if !seen.insert(id.clone()) {
            continue;
        }

        let enrichment = enrichments
            .get(&poi.wikidata_id)
            .cloned()
            .unwrap_or_default();
        let popularity = enrichment.sitelink_count;

        attractions.push(Attraction {
            id,
            name: enrichment.label.unwrap_or_else(|| poi.name.clone()),
            description: enrichment
                .description
                .unwrap_or_else(|| format!("{} in the area", poi.category)),
            duration_minutes: default_duration_minutes(&poi.category),
            estimated_cost: estimated_cost(&poi.category),
            coordinates: poi.coordinates.or(enrichment.coordinates),
            rating: None,
            is_must_see: popularity >= 100,
            booking_required: matches!(poi.category.as_str(), "museum" | "theme_park"),
            booking_url: enrichment.website,
            opening_hours: poi.opening_hours.as_deref().and_then(parse_opening_hours),
            popularity_score: popularity,
            category: poi.category,
        });
    }
    attractions
}

pub fn is_religious_site(category: &str) -> bool {
    RELIGIOUS_CATEGORIES.contains(&category)
}

fn religious_floor(min_popularity: u32, configured_floor: u32) -> u32 {
    (min_popularity * 2).max(configured_floor)
}

/// Stage 6: keep at most `cap` places of worship, and only well-known ones,
/// so a single city's list is not wall-to-wall minor chapels.
pub fn diversify_religious_sites(
    attractions: Vec<Attraction>,
    cap: usize,
    popularity_floor: u32,
) -> Vec<Attraction> {
    let mut sorted = attractions;
    rank_by_popularity(&mut sorted);

    let mut religious_kept = 0;
    sorted
        .into_iter()
        .filter(|a| {
            if !is_religious_site(&a.category) {
                return true;
            }
            if religious_kept >= cap || a.popularity_score < popularity_floor {
                return false;
            }
            religious_kept += 1;
            true
        })
        .collect()
}

/// Stage 7: popularity descending; stable, so equal scores keep their order.
pub fn rank_by_popularity(attractions: &mut [Attraction]) {
    attractions.sort_by(|a, b| b.popularity_score.cmp(&a.popularity_score));
}

//! City Identity Resolution
//!
//! Resolves free-text, multilingual place names to a canonical city key so
//! that "London", "Londres" and "伦敦" all compare equal everywhere else in
//! the engine.
//!
//! ## Resolution order
//! 1. Static multilingual directory (built once at startup) - high confidence
//! 2. In-process geocode cache keyed by the raw lowercased input
//! 3. External geocoder (Nominatim-style) - medium confidence, cached
//! 4. Capitalized input fallback - low confidence, never blocks the caller

use reqwest;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;
use unicode_normalization::UnicodeNormalization;

use crate::models::city::{CanonicalCity, Confidence, Coordinates};

const GEOCODER_BASE_URL: &str = "https://nominatim.openstreetmap.org/search";
const GEOCODER_TIMEOUT_SECS: u64 = 8;
const USER_AGENT: &str = "wayfarer-api/0.1 (itinerary planner)";

/// Canonical key, display name, (lat, lng), variant spellings across locales.
/// Variants are normalized again at index-build time, so entries may carry
/// native casing and diacritics.
const CITY_TABLE: &[(&str, &str, (f64, f64), &[&str])] = &[
    ("london", "London", (51.5074, -0.1278), &[
        "london", "londres", "londra", "londen", "londyn", "лондон",
        "伦敦", "倫敦", "ロンドン", "런던", "لندن", "Λονδίνο", "लंदन",
    ]),
    ("paris", "Paris", (48.8566, 2.3522), &[
        "paris", "parigi", "parijs", "paryż", "париж", "巴黎",
        "パリ", "파리", "باريس", "Παρίσι", "पेरिस",
    ]),
    ("barcelona", "Barcelona", (41.3851, 2.1734), &[
        "barcelona", "barcelone", "barcellona", "барселона", "巴塞罗那",
        "巴塞隆納", "バルセロナ", "바르셀로나", "برشلونة", "Βαρκελώνη",
    ]),
    ("madrid", "Madrid", (40.4168, -3.7038), &[
        "madrid", "мадрид", "马德里", "馬德里", "マドリード", "마드리드",
        "مدريد", "Μαδρίτη",
    ]),
    ("rome", "Rome", (41.9028, 12.4964), &[
        "rome", "roma", "rom", "рим", "罗马", "羅馬", "ローマ", "로마",
        "روما", "Ρώμη", "रोम",
    ]),
    ("berlin", "Berlin", (52.52, 13.405), &[
        "berlin", "berlino", "берлин", "берлін", "柏林", "ベルリン",
        "베를린", "برلين", "Βερολίνο",
    ]),
    ("amsterdam", "Amsterdam", (52.3676, 4.9041), &[
        "amsterdam", "амстердам", "阿姆斯特丹", "アムステルダム",
        "암스테르담", "أمستردام", "Άμστερνταμ",
    ]),
    ("vienna", "Vienna", (48.2082, 16.3738), &[
        "vienna", "wien", "vienne", "viena", "wiedeń", "вена", "відень",
        "维也纳", "維也納", "ウィーン", "빈", "فيينا", "Βιέννη",
    ]),
    ("prague", "Prague", (50.0755, 14.4378), &[
        "prague", "praha", "prag", "praga", "прага", "布拉格", "プラハ",
        "프라하", "براغ", "Πράγα",
    ]),
    ("lisbon", "Lisbon", (38.7223, -9.1393), &[
        "lisbon", "lisboa", "lisbonne", "lissabon", "lizbona", "лиссабон",
        "里斯本", "リスボン", "리스본", "لشبونة", "Λισαβόνα",
    ]),
    ("athens", "Athens", (37.9838, 23.7275), &[
        "athens", "athènes", "atenas", "atene", "athen", "afiny", "афины",
        "афіни", "雅典", "アテネ", "아테네", "أثينا", "Αθήνα",
    ]),
    ("istanbul", "Istanbul", (41.0082, 28.9784), &[
        "istanbul", "İstanbul", "estambul", "стамбул", "伊斯坦布尔",
        "伊斯坦堡", "イスタンブール", "이스탄불", "إسطنبول",
        "Κωνσταντινούπολη",
    ]),
    ("moscow", "Moscow", (55.7558, 37.6173), &[
        "moscow", "moscou", "moscú", "mosca", "moskau", "moskwa", "москва",
        "莫斯科", "モスクワ", "모스크바", "موسكو", "Μόσχα", "मास्को",
    ]),
    ("dubai", "Dubai", (25.2048, 55.2708), &[
        "dubai", "dubaï", "дубай", "迪拜", "杜拜", "ドバイ", "두바이",
        "دبي", "दुबई",
    ]),
    ("tokyo", "Tokyo", (35.6762, 139.6503), &[
        "tokyo", "tokio", "токио", "токіо", "东京", "東京", "とうきょう",
        "도쿄", "طوكيو", "Τόκιο", "टोक्यो",
    ]),
    ("kyoto", "Kyoto", (35.0116, 135.7681), &[
        "kyoto", "kioto", "киото", "京都", "きょうと", "교토", "كيوتو",
    ]),
    ("osaka", "Osaka", (34.6937, 135.5023), &[
        "osaka", "осака", "大阪", "おおさか", "오사카", "أوساكا",
    ]),
    ("seoul", "Seoul", (37.5665, 126.978), &[
        "seoul", "séoul", "seúl", "сеул", "首尔", "首爾", "ソウル", "서울",
        "سول", "सोल",
    ]),
    ("beijing", "Beijing", (39.9042, 116.4074), &[
        "beijing", "peking", "pékin", "pekín", "pechino", "пекин", "北京",
        "ペキン", "베이징", "بكين", "Πεκίνο",
    ]),
    ("shanghai", "Shanghai", (31.2304, 121.4737), &[
        "shanghai", "shanghái", "шанхай", "上海", "シャンハイ", "상하이",
        "شنغهاي",
    ]),
    ("hong-kong", "Hong Kong", (22.3193, 114.1694), &[
        "hong kong", "hongkong", "гонконг", "香港", "ホンコン", "홍콩",
        "هونغ كونغ",
    ]),
    ("singapore", "Singapore", (1.3521, 103.8198), &[
        "singapore", "singapour", "singapur", "сингапур", "新加坡",
        "シンガポール", "싱가포르", "سنغافورة",
    ]),
    ("bangkok", "Bangkok", (13.7563, 100.5018), &[
        "bangkok", "бангкок", "曼谷", "バンコク", "방콕", "بانكوك",
        "กรุงเทพมหานคร", "กรุงเทพฯ",
    ]),
    ("delhi", "Delhi", (28.7041, 77.1025), &[
        "delhi", "new delhi", "дели", "德里", "新德里", "デリー", "델리",
        "دلهي", "दिल्ली", "नई दिल्ली",
    ]),
    ("mumbai", "Mumbai", (19.076, 72.8777), &[
        "mumbai", "bombay", "мумбаи", "孟买", "ムンバイ", "뭄바이",
        "مومباي", "मुंबई",
    ]),
    ("new-york", "New York", (40.7128, -74.006), &[
        "new york", "new york city", "nueva york", "nova iorque",
        "нью-йорк", "纽约", "紐約", "ニューヨーク", "뉴욕", "نيويورك",
        "Νέα Υόρκη", "न्यूयॉर्क",
    ]),
    ("los-angeles", "Los Angeles", (34.0522, -118.2437), &[
        "los angeles", "los ángeles", "лос-анджелес", "洛杉矶", "洛杉磯",
        "ロサンゼルス", "로스앤젤레스", "لوس أنجلوس",
    ]),
    ("san-francisco", "San Francisco", (37.7749, -122.4194), &[
        "san francisco", "são francisco", "сан-франциско", "旧金山",
        "三藩市", "サンフランシスコ", "샌프란시스코", "سان فرانسيسكو",
    ]),
    ("chicago", "Chicago", (41.8781, -87.6298), &[
        "chicago", "чикаго", "芝加哥", "シカゴ", "시카고", "شيكاغو",
    ]),
    ("toronto", "Toronto", (43.6532, -79.3832), &[
        "toronto", "торонто", "多伦多", "トロント", "토론토", "تورونتو",
    ]),
    ("mexico-city", "Mexico City", (19.4326, -99.1332), &[
        "mexico city", "ciudad de méxico", "cdmx", "мехико", "墨西哥城",
        "メキシコシティ", "멕시코시티", "مدينة مكسيكو",
    ]),
    ("rio-de-janeiro", "Rio de Janeiro", (-22.9068, -43.1729), &[
        "rio de janeiro", "río de janeiro", "рио-де-жанейро", "里约热内卢",
        "リオデジャネイロ", "리우데자네이루", "ريو دي جانيرو",
    ]),
    ("buenos-aires", "Buenos Aires", (-34.6037, -58.3816), &[
        "buenos aires", "буэнос-айрес", "布宜诺斯艾利斯", "ブエノスアイレス",
        "부에노스아이레스", "بوينس آيرس",
    ]),
    ("cairo", "Cairo", (30.0444, 31.2357), &[
        "cairo", "le caire", "el cairo", "kairo", "каир", "开罗", "カイロ",
        "카이로", "القاهرة", "Κάιρο",
    ]),
    ("marrakesh", "Marrakesh", (31.6295, -7.9811), &[
        "marrakesh", "marrakech", "марракеш", "马拉喀什", "マラケシュ",
        "마라케시", "مراكش",
    ]),
    ("sydney", "Sydney", (-33.8688, 151.2093), &[
        "sydney", "sidney", "сидней", "悉尼", "雪梨", "シドニー", "시드니",
        "سيدني", "Σίδνεϊ",
    ]),
];

/// Immutable multilingual city directory plus its inverted index, built once
/// at startup and shared by reference.
pub struct CityDirectory {
    entries: Vec<DirectoryEntry>,
    index: HashMap<String, usize>,
}

struct DirectoryEntry {
    key: &'static str,
    display_name: &'static str,
    coordinates: Coordinates,
}

impl CityDirectory {
    pub fn new() -> Self {
        let mut entries = Vec::with_capacity(CITY_TABLE.len());
        let mut index = HashMap::new();

        for (key, display_name, (lat, lng), variants) in CITY_TABLE {
            let position = entries.len();
            entries.push(DirectoryEntry {
                key: *key,
                display_name: *display_name,
                coordinates: Coordinates {
                    lat: *lat,
                    lng: *lng,
                },
            });
            index.insert(normalize_place_name(key), position);
            index.insert(normalize_place_name(display_name), position);
            for variant in *variants {
                index.insert(normalize_place_name(variant), position);
            }
        }

        Self { entries, index }
    }

    pub fn lookup(&self, input: &str) -> Option<CanonicalCity> {
        let entry = &self.entries[*self.index.get(&normalize_place_name(input))?];
        Some(CanonicalCity {
            key: entry.key.to_string(),
            display_name: entry.display_name.to_string(),
            coordinates: Some(entry.coordinates),
            confidence: Confidence::High,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for CityDirectory {
    fn default() -> Self {
        Self::new()
    }
}

/// Trim, lowercase and strip diacritics so that "São Paulo", "sao paulo" and
/// "SAO PAULO" index identically.
pub fn normalize_place_name(input: &str) -> String {
    input
        .trim()
        .to_lowercase()
        .nfd()
        .filter(|c| !unicode_normalization::char::is_combining_mark(*c))
        .collect()
}

fn capitalize_words(input: &str) -> String {
    input
        .trim()
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Deserialize)]
struct GeocoderResult {
    display_name: String,
    lat: String,
    lon: String,
}

pub struct GeoIdentityResolver {
    directory: CityDirectory,
    http_client: reqwest::Client,
    geocoder_url: String,
    // Keyed by the raw lowercased input, not the canonical key: unresolved
    // inputs have no canonical key yet. Grows for the process lifetime.
    miss_cache: RwLock<HashMap<String, CanonicalCity>>,
}

impl GeoIdentityResolver {
    pub fn new(directory: CityDirectory) -> Self {
        Self::with_geocoder_url(directory, GEOCODER_BASE_URL.to_string())
    }

    pub fn with_geocoder_url(directory: CityDirectory, geocoder_url: String) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(GEOCODER_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();

        Self {
            directory,
            http_client,
            geocoder_url,
            miss_cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn directory(&self) -> &CityDirectory {
        &self.directory
    }

    /// Resolve a free-text place name to its canonical identity.
    ///
    /// Never fails and never blocks on resolution ambiguity: a name the
    /// directory, the cache and the geocoder all miss still comes back as a
    /// low-confidence identity derived from the input itself.
    pub async fn resolve(&self, input: &str) -> CanonicalCity {
        if let Some(city) = self.directory.lookup(input) {
            return city;
        }

        let cache_key = input.trim().to_lowercase();
        if let Ok(cache) = self.miss_cache.read() {
            if let Some(city) = cache.get(&cache_key) {
                return city.clone();
            }
        }

        let city = match self.geocode(input).await {
            Ok(city) => city,
            Err(e) => {
                eprintln!("Geocoding '{}' failed, degrading to low confidence: {}", input, e);
                CanonicalCity {
                    key: cache_key.clone(),
                    display_name: capitalize_words(input),
                    coordinates: None,
                    confidence: Confidence::Low,
                }
            }
        };

        if let Ok(mut cache) = self.miss_cache.write() {
            cache.insert(cache_key, city.clone());
        }
        city
    }

    async fn geocode(&self, input: &str) -> Result<CanonicalCity, Box<dyn std::error::Error>> {
        let results: Vec<GeocoderResult> = self
            .http_client
            .get(&self.geocoder_url)
            .query(&[("q", input), ("format", "json"), ("limit", "1")])
            .header("User-Agent", USER_AGENT)
            .send()
            .await?
            .json()
            .await?;

        let first = results.first().ok_or("geocoder returned no results")?;

        // display_name is comma-separated, most specific segment first.
        let city_name = first
            .display_name
            .split(',')
            .next()
            .unwrap_or(&first.display_name)
            .trim()
            .to_string();

        let lat: f64 = first.lat.parse()?;
        let lng: f64 = first.lon.parse()?;

        Ok(CanonicalCity {
            key: input.trim().to_lowercase(),
            display_name: city_name,
            coordinates: Some(Coordinates { lat, lng }),
            confidence: Confidence::Medium,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translations_share_one_key() {
        let directory = CityDirectory::new();
        let london = directory.lookup("London").unwrap();
        let londres = directory.lookup("Londres").unwrap();
        let simplified = directory.lookup("伦敦").unwrap();
        let traditional = directory.lookup("倫敦").unwrap();

        assert_eq!(london.key, "london");
        assert_eq!(londres.key, london.key);
        assert_eq!(simplified.key, london.key);
        assert_eq!(traditional.key, london.key);
        assert_eq!(london.confidence, Confidence::High);
    }

    #[test]
    fn lookup_ignores_case_whitespace_and_diacritics() {
        let directory = CityDirectory::new();
        assert_eq!(directory.lookup("  PARIS  ").unwrap().key, "paris");
        assert_eq!(directory.lookup("Pékin").unwrap().key, "beijing");
        assert_eq!(directory.lookup("wiedeń").unwrap().key, "vienna");
        assert_eq!(directory.lookup("Λονδίνο").unwrap().key, "london");
    }

    #[test]
    fn unknown_city_misses_directory() {
        let directory = CityDirectory::new();
        assert!(directory.lookup("Atlantis-on-Sea").is_none());
    }

    #[test]
    fn directory_covers_the_full_table() {
        let directory = CityDirectory::new();
        assert_eq!(directory.len(), CITY_TABLE.len());
    }

    #[test]
    fn normalization_strips_marks() {
        assert_eq!(normalize_place_name("  São Paulo "), "sao paulo");
        assert_eq!(normalize_place_name("Zürich"), "zurich");
    }

    #[test]
    fn unreachable_geocoder_degrades_to_low_confidence() {
        let resolver = GeoIdentityResolver::with_geocoder_url(
            CityDirectory::new(),
            // Nothing listens on the discard port, so this refuses fast.
            "http://127.0.0.1:9/search".to_string(),
        );

        tokio_test::block_on(async {
            let city = resolver.resolve("somewhere obscure").await;
            assert_eq!(city.confidence, Confidence::Low);
            assert_eq!(city.key, "somewhere obscure");
            assert_eq!(city.display_name, "Somewhere Obscure");
            assert!(city.coordinates.is_none());

            // The degraded result is cached under the raw lowercased input.
            let again = resolver.resolve("Somewhere OBSCURE").await;
            assert_eq!(again.key, "somewhere obscure");
            assert_eq!(again.confidence, Confidence::Low);
        });
    }
}

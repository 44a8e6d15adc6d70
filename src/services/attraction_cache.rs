use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::models::attraction::Attraction;

const CACHE_EXPIRY_DAYS: u64 = 30;

/// One cached document per coarse geo-cell: the full ranked attraction list
/// plus the unix timestamp of the fetch that produced it.
#[derive(Debug, Serialize, Deserialize)]
pub struct CachedAttractions {
    pub fetched_at: u64,
    pub attractions: Vec<Attraction>,
}

/// File-backed attraction cache, one JSON document per key.
///
/// Entries are fresh for 30 days; expired or malformed entries read as cache
/// misses, and `read_any` deliberately ignores freshness so stale data can be
/// served when every upstream source has failed.
pub struct AttractionCache {
    dir: PathBuf,
    expiry_secs: u64,
}

/// Cache key: coordinates rounded to two decimals (~1km cells) plus a slug of
/// the destination name, so nearby queries for the same city share an entry.
pub fn cache_key(destination: &str, lat: f64, lng: f64) -> String {
    let slug: String = destination
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    format!("{}_{:.2}_{:.2}", slug.trim_matches('-'), lat, lng)
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

impl AttractionCache {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            expiry_secs: CACHE_EXPIRY_DAYS * 24 * 60 * 60,
        }
    }

    /// Override the TTL, mainly so tests can expire entries quickly.
    pub fn with_expiry_secs<P: AsRef<Path>>(dir: P, expiry_secs: u64) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            expiry_secs,
        }
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    fn read_entry(&self, key: &str) -> Option<CachedAttractions> {
        let data = fs::read_to_string(self.entry_path(key)).ok()?;
        // Malformed documents are a miss, not a failure.
        serde_json::from_str(&data).ok()
    }

    /// Fresh entry or nothing.
    pub fn read_fresh(&self, key: &str) -> Option<Vec<Attraction>> {
        let entry = self.read_entry(key)?;
        let age = unix_now().saturating_sub(entry.fetched_at);
        if age > self.expiry_secs {
            return None;
        }
        Some(entry.attractions)
    }

    /// Any entry regardless of age, for stale-on-error fallback.
    pub fn read_any(&self, key: &str) -> Option<Vec<Attraction>> {
        self.read_entry(key).map(|entry| entry.attractions)
    }

    /// Persist the full ranked list. Writes go to a temp file first and are
    /// renamed into place so a concurrent reader never sees a partial entry.
    pub fn write(
        &self,
        key: &str,
        attractions: &[Attraction],
    ) -> Result<(), Box<dyn std::error::Error>> {
        fs::create_dir_all(&self.dir)?;

        let entry = CachedAttractions {
            fetched_at: unix_now(),
            attractions: attractions.to_vec(),
        };
        let data = serde_json::to_string(&entry)?;

        let final_path = self.entry_path(key);
        let temp_path = self.dir.join(format!("{}.json.tmp-{}", key, std::process::id()));
        fs::write(&temp_path, data)?;
        fs::rename(&temp_path, &final_path)?;
        Ok(())
    }
}

//! Municipality boundary service for the choropleth map
//!
//! Loads the GeoJSON boundary document (remote or local), keeps only the
//! polygon rings keyed by `properties.id`, and caches the simplified form
//! on disk so later runs start without a download.

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use fs2::FileExt;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::types::{LoadWarning, OlistError, Result};

/// Brazilian municipalities, keyed by IBGE code in `properties.id`
pub const DEFAULT_BOUNDARIES_URL: &str =
    "https://raw.githubusercontent.com/tbrugz/geodata-br/master/geojson/geojs-100-mun.json";

/// Cache TTL in seconds (7 days); municipal borders rarely move
const CACHE_TTL_SECS: i64 = 7 * 24 * 3600;

/// HTTP request timeout in seconds (the document is tens of MB)
const REQUEST_TIMEOUT_SECS: u64 = 30;

const CACHE_FILE: &str = "boundaries.json";

/// Where to read the boundary document from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoundarySource {
    Remote(String),
    File(PathBuf),
}

impl BoundarySource {
    /// URLs (http/https) are remote, anything else is a path
    pub fn parse(value: &str) -> Self {
        if value.starts_with("http://") || value.starts_with("https://") {
            Self::Remote(value.to_string())
        } else {
            Self::File(PathBuf::from(value))
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::Remote(url) => url.clone(),
            Self::File(path) => path.display().to_string(),
        }
    }
}

impl Default for BoundarySource {
    fn default() -> Self {
        Self::Remote(DEFAULT_BOUNDARIES_URL.to_string())
    }
}

/// One municipality outline
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Region {
    pub name: String,
    /// Closed rings of (lng, lat) points
    pub rings: Vec<Vec<(f64, f64)>>,
}

/// Geographic bounding box in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_lng: f64,
    pub max_lng: f64,
    pub min_lat: f64,
    pub max_lat: f64,
}

impl Bounds {
    fn include(&mut self, (lng, lat): (f64, f64)) {
        self.min_lng = self.min_lng.min(lng);
        self.max_lng = self.max_lng.max(lng);
        self.min_lat = self.min_lat.min(lat);
        self.max_lat = self.max_lat.max(lat);
    }

    /// Grow each side by `ratio` of the span so outlines don't touch the frame
    pub fn padded(self, ratio: f64) -> Self {
        let pad_lng = ((self.max_lng - self.min_lng) * ratio).max(0.05);
        let pad_lat = ((self.max_lat - self.min_lat) * ratio).max(0.05);
        Self {
            min_lng: self.min_lng - pad_lng,
            max_lng: self.max_lng + pad_lng,
            min_lat: self.min_lat - pad_lat,
            max_lat: self.max_lat + pad_lat,
        }
    }
}

/// Region outlines keyed by city id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Boundaries {
    regions: HashMap<String, Region>,
}

impl Boundaries {
    pub fn new(regions: HashMap<String, Region>) -> Self {
        Self { regions }
    }

    pub fn get(&self, city_id: &str) -> Option<&Region> {
        self.regions.get(city_id)
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Bounding box of the given regions; None when none of them is known
    pub fn bounds<'a>(&self, city_ids: impl IntoIterator<Item = &'a str>) -> Option<Bounds> {
        let mut bounds: Option<Bounds> = None;
        for region in city_ids.into_iter().filter_map(|id| self.regions.get(id)) {
            for &(lng, lat) in region.rings.iter().flatten() {
                bounds
                    .get_or_insert(Bounds {
                        min_lng: lng,
                        max_lng: lng,
                        min_lat: lat,
                        max_lat: lat,
                    })
                    .include((lng, lat));
            }
        }
        bounds
    }

    /// Decode a GeoJSON FeatureCollection (consumes the buffer for in-place SIMD parsing)
    pub fn from_geojson(mut bytes: Vec<u8>) -> Result<Self> {
        let collection: FeatureCollection = simd_json::from_slice(&mut bytes)
            .map_err(|e| OlistError::Boundary(format!("invalid GeoJSON: {}", e)))?;

        let mut regions = HashMap::with_capacity(collection.features.len());
        for feature in collection.features {
            let Some(id) = feature.properties.id.map(FeatureId::into_key) else {
                continue;
            };
            let rings = match feature.geometry {
                Some(Geometry::Polygon { coordinates }) => to_rings(coordinates),
                Some(Geometry::MultiPolygon { coordinates }) => {
                    coordinates.into_iter().flat_map(to_rings).collect()
                }
                Some(Geometry::Unsupported) | None => continue,
            };
            let name = feature.properties.name.unwrap_or_else(|| id.clone());
            regions.insert(id, Region { name, rings });
        }

        Ok(Self { regions })
    }
}

fn to_rings(polygon: Vec<Vec<Vec<f64>>>) -> Vec<Vec<(f64, f64)>> {
    polygon
        .into_iter()
        .map(|ring| {
            ring.into_iter()
                .filter_map(|pos| match pos.as_slice() {
                    [lng, lat, ..] => Some((*lng, *lat)),
                    _ => None,
                })
                .collect()
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    properties: FeatureProperties,
    #[serde(default)]
    geometry: Option<Geometry>,
}

#[derive(Debug, Default, Deserialize)]
struct FeatureProperties {
    #[serde(default)]
    id: Option<FeatureId>,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FeatureId {
    Text(String),
    Number(f64),
}

impl FeatureId {
    fn into_key(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::Number(n) if n.fract() == 0.0 => format!("{}", n as i64),
            Self::Number(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum Geometry {
    Polygon {
        coordinates: Vec<Vec<Vec<f64>>>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Vec<Vec<f64>>>>,
    },
    #[serde(other)]
    Unsupported,
}

/// Simplified boundary document persisted between runs
#[derive(Debug, Serialize, Deserialize)]
pub struct BoundaryCache {
    /// Unix timestamp when the document was fetched
    pub fetched_at: i64,
    /// URL the document came from
    pub source: String,
    pub regions: HashMap<String, Region>,
}

impl BoundaryCache {
    pub fn is_expired(&self) -> bool {
        chrono::Utc::now().timestamp() - self.fetched_at > CACHE_TTL_SECS
    }
}

/// Loads boundaries from a file or URL with an on-disk cache for remote sources
pub struct BoundaryService {
    cache_dir: PathBuf,
}

impl BoundaryService {
    pub fn with_cache_dir(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    pub fn cache_path(&self) -> PathBuf {
        self.cache_dir.join(CACHE_FILE)
    }

    /// Load boundaries, returning a warning when a stale cache had to be used
    pub fn load(&self, source: &BoundarySource) -> Result<(Boundaries, Option<LoadWarning>)> {
        match source {
            BoundarySource::File(path) => {
                let bytes = fs::read(path)?;
                info!(path = %path.display(), "loading boundaries from file");
                Ok((Boundaries::from_geojson(bytes)?, None))
            }
            BoundarySource::Remote(url) => self.load_remote(url),
        }
    }

    fn load_remote(&self, url: &str) -> Result<(Boundaries, Option<LoadWarning>)> {
        let cached = match self.load_cache() {
            Ok(cache) if cache.source == url => Some(cache),
            Ok(_) => None,
            Err(e) => {
                if self.cache_path().exists() {
                    warn!(error = %e, "boundary cache unreadable; refetching");
                }
                None
            }
        };

        if let Some(cache) = &cached {
            if !cache.is_expired() {
                return Ok((Boundaries::new(cache.regions.clone()), None));
            }
        }

        match fetch_document(url).and_then(Boundaries::from_geojson) {
            Ok(boundaries) => {
                info!(regions = boundaries.len(), url, "fetched boundaries");
                let cache = BoundaryCache {
                    fetched_at: chrono::Utc::now().timestamp(),
                    source: url.to_string(),
                    regions: boundaries.regions.clone(),
                };
                if let Err(e) = self.save_cache(&cache) {
                    warn!(error = %e, "failed to write boundary cache");
                }
                Ok((boundaries, None))
            }
            Err(e) => match cached {
                Some(cache) => {
                    warn!(error = %e, "boundary refresh failed; using stale cache");
                    Ok((
                        Boundaries::new(cache.regions),
                        Some(LoadWarning::StaleBoundaries(e.to_string())),
                    ))
                }
                None => Err(OlistError::Boundary(format!(
                    "failed to load {}: {}",
                    BoundarySource::Remote(url.to_string()).describe(),
                    e
                ))),
            },
        }
    }

    /// Load cache from disk
    pub fn load_cache(&self) -> Result<BoundaryCache> {
        let content = fs::read_to_string(self.cache_path())?;
        serde_json::from_str(&content)
            .map_err(|e| OlistError::Cache(format!("Invalid cache format: {}", e)))
    }

    /// Save using atomic write (temp file + rename) with exclusive lock.
    pub fn save_cache(&self, cache: &BoundaryCache) -> Result<()> {
        fs::create_dir_all(&self.cache_dir)?;

        let content = serde_json::to_string(cache)
            .map_err(|e| OlistError::Cache(format!("Serialization failed: {}", e)))?;

        let path = self.cache_path();
        let temp_path = path.with_extension("json.tmp");

        {
            let mut file = File::create(&temp_path)
                .map_err(|e| OlistError::Cache(format!("Failed to create temp file: {}", e)))?;
            file.write_all(content.as_bytes())
                .map_err(|e| OlistError::Cache(format!("Failed to write temp file: {}", e)))?;
            file.sync_all()
                .map_err(|e| OlistError::Cache(format!("Failed to sync temp file: {}", e)))?;
        }

        let target = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;

        target
            .lock_exclusive()
            .map_err(|e| OlistError::Cache(format!("Failed to acquire write lock: {}", e)))?;

        fs::rename(&temp_path, &path)
            .map_err(|e| OlistError::Cache(format!("Failed to rename temp file: {}", e)))?;

        let _ = target.unlock();
        Ok(())
    }
}

/// Download the raw boundary document
fn fetch_document(url: &str) -> Result<Vec<u8>> {
    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()
        .map_err(|e| OlistError::Boundary(format!("HTTP client error: {}", e)))?;

    let response = client
        .get(url)
        .send()
        .and_then(|r| r.error_for_status())
        .map_err(|e| OlistError::Boundary(format!("HTTP request failed: {}", e)))?;

    let bytes = response
        .bytes()
        .map_err(|e| OlistError::Boundary(format!("HTTP body error: {}", e)))?;
    Ok(bytes.to_vec())
}

#[cfg(test)]
const SAMPLE_GEOJSON: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {"type": "Feature",
     "properties": {"id": "3548500", "name": "Santos"},
     "geometry": {"type": "Polygon", "coordinates": [[[-46.4, -23.9], [-46.3, -23.9], [-46.3, -23.8], [-46.4, -23.9]]]}},
    {"type": "Feature",
     "properties": {"id": 3550308, "name": "São Paulo"},
     "geometry": {"type": "MultiPolygon", "coordinates": [[[[-46.8, -23.7, 0.0], [-46.4, -23.7], [-46.4, -23.4], [-46.8, -23.7]]], [[[-46.9, -23.5], [-46.85, -23.5], [-46.85, -23.45], [-46.9, -23.5]]]]}},
    {"type": "Feature",
     "properties": {"id": "9999999"},
     "geometry": {"type": "Point", "coordinates": [-40.0, -20.0]}},
    {"type": "Feature",
     "properties": {"name": "No id"},
     "geometry": {"type": "Polygon", "coordinates": [[[0.0, 0.0], [1.0, 0.0], [0.0, 0.0]]]}}
  ]
}"#;

//! Country catalog loading and caching
//!
//! Raw records come from a [`CatalogSource`] in the REST countries shape. They
//! are enriched with the built-in export and fun-fact tables, stripped of
//! uninhabited entries and sorted by population. [`CatalogCache`] keeps the
//! result in memory and in a durable [`KeyValue`] entry.

use crate::config::QuizConfig;
use crate::country::Country;
use crate::error::{QuizError, QuizResult};
use crate::rng::fill_random;
use crate::store::KeyValue;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, OnceLock};

/// Durable cache key
pub const CACHE_KEY: &str = "countries_cache";

pub const DEFAULT_CAPITAL: &str = "N/A";
pub const DEFAULT_EXPORTS: [&str; 3] = ["Various goods", "Services", "Natural resources"];
pub const DEFAULT_FUN_FACT: &str = "A fascinating country with rich culture and history.";

/// Sample catalog shipped with the crate, used when no other source is given
pub const BUNDLED_CATALOG: &str = include_str!("../data/sample_catalog.json");

const COUNTRY_FACTS: &str = include_str!("../data/country_facts.json");

/// Country record as served by the upstream countries API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawCountry {
    pub name: RawName,
    #[serde(default)]
    pub cca2: String,
    #[serde(default)]
    pub cca3: String,
    #[serde(default)]
    pub capital: Vec<String>,
    #[serde(default)]
    pub population: u64,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub flags: RawFlags,
    #[serde(default)]
    pub maps: RawMaps,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawName {
    pub common: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawFlags {
    #[serde(default)]
    pub svg: String,
    #[serde(default)]
    pub png: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMaps {
    #[serde(default)]
    pub google_maps: String,
    #[serde(default)]
    pub open_street_maps: String,
}

#[derive(Debug, Default, Deserialize)]
struct CountryFacts {
    #[serde(rename = "funFacts")]
    fun_facts: HashMap<String, String>,
    exports: HashMap<String, Vec<String>>,
}

fn facts() -> &'static CountryFacts {
    static FACTS: OnceLock<CountryFacts> = OnceLock::new();
    FACTS.get_or_init(|| {
        serde_json::from_str(COUNTRY_FACTS).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "built-in country facts are invalid");
            CountryFacts::default()
        })
    })
}

impl Country {
    /// Build a catalog entry from a raw record plus the built-in fact tables
    pub fn from_raw(raw: &RawCountry) -> Self {
        let name = raw.name.common.clone();
        let facts = facts();
        let exports = facts
            .exports
            .get(&name)
            .cloned()
            .unwrap_or_else(|| DEFAULT_EXPORTS.iter().map(|s| s.to_string()).collect());
        let fun_fact = facts
            .fun_facts
            .get(&name)
            .cloned()
            .unwrap_or_else(|| DEFAULT_FUN_FACT.to_string());

        Self {
            code: raw.cca2.clone(),
            code3: raw.cca3.clone(),
            capital: raw
                .capital
                .first()
                .filter(|c| !c.is_empty())
                .cloned()
                .unwrap_or_else(|| DEFAULT_CAPITAL.to_string()),
            population: raw.population,
            region: raw.region.clone(),
            flag: raw.flags.svg.clone(),
            maps: raw.maps.google_maps.clone(),
            exports,
            fun_fact,
            name,
        }
    }
}

/// Drop uninhabited records and order by population, largest first.
///
/// The sort is stable, so ties keep their source order.
pub fn build_catalog(raws: &[RawCountry]) -> Vec<Country> {
    let mut countries: Vec<Country> = raws
        .iter()
        .filter(|raw| raw.population > 0)
        .map(Country::from_raw)
        .collect();
    countries.sort_by(|a, b| b.population.cmp(&a.population));
    countries
}

/// Parse a JSON array of raw records
pub fn parse_raw_countries(json: &str) -> QuizResult<Vec<RawCountry>> {
    Ok(serde_json::from_str(json)?)
}

/// One uniformly chosen country, `None` for an empty catalog. Not seeded.
pub fn random_country(catalog: &[Country]) -> Option<&Country> {
    if catalog.is_empty() {
        return None;
    }
    let mut bytes = [0u8; 8];
    fill_random(&mut bytes);
    let index = (u64::from_le_bytes(bytes) % catalog.len() as u64) as usize;
    catalog.get(index)
}

/// Where raw country records come from
pub trait CatalogSource: Send + Sync {
    fn fetch(&self) -> QuizResult<Vec<RawCountry>>;

    /// Source name for logs
    fn name(&self) -> &'static str;
}

/// Raw records as a JSON document, held in memory or read from a file
#[derive(Debug, Clone)]
pub enum JsonCatalogSource {
    Inline(String),
    File(PathBuf),
}

impl JsonCatalogSource {
    /// The sample catalog compiled into the crate
    pub fn bundled() -> Self {
        JsonCatalogSource::Inline(BUNDLED_CATALOG.to_string())
    }
}

impl CatalogSource for JsonCatalogSource {
    fn fetch(&self) -> QuizResult<Vec<RawCountry>> {
        match self {
            JsonCatalogSource::Inline(json) => parse_raw_countries(json),
            JsonCatalogSource::File(path) => {
                let json = std::fs::read_to_string(path).map_err(|e| {
                    QuizError::CatalogUnavailable(format!("{}: {e}", path.display()))
                })?;
                parse_raw_countries(&json)
            }
        }
    }

    fn name(&self) -> &'static str {
        match self {
            JsonCatalogSource::Inline(_) => "inline",
            JsonCatalogSource::File(_) => "file",
        }
    }
}

/// Durable cache document
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry {
    data: Vec<Country>,
    /// Unix milliseconds at write time
    timestamp: u64,
    version: u32,
}

/// Catalog loaded once per session, backed by a time-limited durable copy
pub struct CatalogCache {
    source: Arc<dyn CatalogSource>,
    durable: Arc<dyn KeyValue>,
    ttl_ms: u64,
    version: u32,
    memory: Mutex<Option<Arc<Vec<Country>>>>,
}

impl std::fmt::Debug for CatalogCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogCache")
            .field("source", &self.source.name())
            .field("durable", &self.durable.backend_name())
            .field("ttl_ms", &self.ttl_ms)
            .field("version", &self.version)
            .finish()
    }
}

impl CatalogCache {
    pub fn new(
        source: Arc<dyn CatalogSource>,
        durable: Arc<dyn KeyValue>,
        config: &QuizConfig,
    ) -> Self {
        Self {
            source,
            durable,
            ttl_ms: config.catalog_ttl.as_millis() as u64,
            version: config.catalog_cache_version,
            memory: Mutex::new(None),
        }
    }

    /// The catalog, from memory, a fresh durable copy, or the source.
    ///
    /// If the source fails, a durable copy of any age or version is served
    /// without being kept in memory, so the next load retries the source.
    pub fn load(&self, now_ms: u64) -> QuizResult<Arc<Vec<Country>>> {
        let mut memory = self
            .memory
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(ref catalog) = *memory {
            return Ok(Arc::clone(catalog));
        }

        let cached = self.read_durable();
        if let Some(ref entry) = cached {
            let age = now_ms.saturating_sub(entry.timestamp);
            if entry.version == self.version && age < self.ttl_ms {
                tracing::debug!(countries = entry.data.len(), age_ms = age, "catalog served from durable cache");
                let catalog = Arc::new(entry.data.clone());
                *memory = Some(Arc::clone(&catalog));
                return Ok(catalog);
            }
        }

        match self.source.fetch() {
            Ok(raws) => {
                let catalog = Arc::new(build_catalog(&raws));
                tracing::info!(source = self.source.name(), countries = catalog.len(), "catalog refreshed");
                self.write_durable(&catalog, now_ms);
                *memory = Some(Arc::clone(&catalog));
                Ok(catalog)
            }
            Err(e) => match cached {
                Some(entry) => {
                    tracing::warn!(error = %e, "catalog refresh failed, serving stale cache");
                    Ok(Arc::new(entry.data))
                }
                None => {
                    tracing::warn!(error = %e, "catalog refresh failed with no cache");
                    Err(QuizError::CatalogUnavailable(e.to_string()))
                }
            },
        }
    }

    /// Forget the in-memory copy; the durable copy is kept
    pub fn invalidate(&self) {
        *self
            .memory
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
    }

    fn read_durable(&self) -> Option<CacheEntry> {
        let json = match self.durable.get(CACHE_KEY) {
            Ok(json) => json?,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read catalog cache");
                return None;
            }
        };
        serde_json::from_str(&json)
            .map_err(|e| tracing::warn!(error = %e, "ignoring unreadable catalog cache"))
            .ok()
    }

    fn write_durable(&self, catalog: &[Country], now_ms: u64) {
        let entry = CacheEntry {
            data: catalog.to_vec(),
            timestamp: now_ms,
            version: self.version,
        };
        let result = serde_json::to_string(&entry)
            .map_err(crate::error::StoreError::from)
            .and_then(|json| self.durable.set(CACHE_KEY, &json));
        if let Err(e) = result {
            tracing::warn!(error = %e, "failed to persist catalog cache");
        }
    }
}

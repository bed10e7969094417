//! Country outline data lookup
//!
//! Only finds the GeoJSON feature for a country; drawing it is up to the host.

use crate::error::{QuizError, QuizResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Names whose outline file does not follow the generic slug rule
const FILENAME_ALIASES: &[(&str, &str)] = &[
    ("United States", "usa"),
    ("United Kingdom", "united_kingdom"),
    ("South Korea", "south_korea"),
    ("North Korea", "north_korea"),
    ("Czech Republic", "czech_republic"),
    ("Dominican Republic", "dominican_republic"),
    ("Central African Republic", "central_african_republic"),
    ("Democratic Republic of the Congo", "democratic_congo"),
    ("Republic of the Congo", "congo"),
    ("Congo", "congo"),
    ("DR Congo", "democratic_congo"),
    ("Bosnia and Herzegovina", "bosnia_and_herzegovina"),
    ("Trinidad and Tobago", "trinidad_and_tobago"),
    ("Antigua and Barbuda", "antigua_and_barbuda"),
    ("Saint Kitts and Nevis", "saint_kitts_and_nevis"),
    ("Saint Vincent and the Grenadines", "saint_vincent_and_the_grenadines"),
    ("São Tomé and Príncipe", "sao_tome_and_principe"),
    ("Côte d'Ivoire", "cote_divoire"),
    ("Ivory Coast", "cote_divoire"),
    ("United Arab Emirates", "united_arab_emirates"),
];

/// Outline file stem for a country name
pub fn geojson_filename(name: &str) -> String {
    if let Some((_, alias)) = FILENAME_ALIASES.iter().find(|(n, _)| *n == name) {
        return alias.to_string();
    }

    let mut slug = String::with_capacity(name.len());
    let mut in_space = false;
    for c in name.to_lowercase().chars() {
        if c.is_whitespace() {
            if !in_space {
                slug.push('_');
            }
            in_space = true;
            continue;
        }
        in_space = false;
        if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' {
            slug.push(c);
        }
    }
    slug
}

/// Image URL used as a lightweight outline stand-in
pub fn outline_map_url(code2: &str) -> String {
    format!("https://flagcdn.com/{}.svg", code2.to_lowercase())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoJsonFeature {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default)]
    pub properties: Option<Map<String, Value>>,
    #[serde(default)]
    pub geometry: Value,
}

impl GeoJsonFeature {
    fn property(&self, upper: &str, lower: &str) -> Option<&str> {
        let properties = self.properties.as_ref()?;
        properties
            .get(upper)
            .and_then(Value::as_str)
            .or_else(|| properties.get(lower).and_then(Value::as_str))
    }

    /// ISO 3166-1 alpha-3 code from `ISO_A3` or `iso_a3`
    pub fn iso_a3(&self) -> Option<&str> {
        self.property("ISO_A3", "iso_a3")
    }

    /// Display name from `NAME` or `name`
    pub fn name(&self) -> Option<&str> {
        self.property("NAME", "name")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoJsonCollection {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub features: Vec<GeoJsonFeature>,
}

impl GeoJsonCollection {
    pub fn from_json(json: &str) -> QuizResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Feature whose ISO-A3 code matches, ignoring case
    pub fn find_by_code3(&self, code3: &str) -> Option<&GeoJsonFeature> {
        self.features
            .iter()
            .find(|f| f.iso_a3().is_some_and(|code| code.eq_ignore_ascii_case(code3)))
    }
}

/// Where the outline collection comes from
pub trait GeoJsonSource: Send + Sync {
    fn fetch(&self) -> QuizResult<GeoJsonCollection>;
}

/// Collection as a JSON document, held in memory or read from a file
#[derive(Debug, Clone)]
pub enum JsonGeoJsonSource {
    Inline(String),
    File(PathBuf),
}

impl GeoJsonSource for JsonGeoJsonSource {
    fn fetch(&self) -> QuizResult<GeoJsonCollection> {
        match self {
            JsonGeoJsonSource::Inline(json) => GeoJsonCollection::from_json(json),
            JsonGeoJsonSource::File(path) => {
                let json = std::fs::read_to_string(path).map_err(|e| {
                    QuizError::GeoDataUnavailable(format!("{}: {e}", path.display()))
                })?;
                GeoJsonCollection::from_json(&json)
            }
        }
    }
}

/// Loads the outline collection once and answers lookups from memory
pub struct GeoJsonCache {
    source: Arc<dyn GeoJsonSource>,
    loaded: Mutex<Option<Arc<GeoJsonCollection>>>,
}

impl GeoJsonCache {
    pub fn new(source: Arc<dyn GeoJsonSource>) -> Self {
        Self {
            source,
            loaded: Mutex::new(None),
        }
    }

    pub fn load(&self) -> QuizResult<Arc<GeoJsonCollection>> {
        let mut loaded = self
            .loaded
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(ref collection) = *loaded {
            return Ok(Arc::clone(collection));
        }

        let collection = Arc::new(self.source.fetch().map_err(|e| {
            tracing::warn!(error = %e, "failed to load outline data");
            e
        })?);
        tracing::debug!(features = collection.features.len(), "outline data loaded");
        *loaded = Some(Arc::clone(&collection));
        Ok(collection)
    }

    /// Outline feature for a country, `None` if the collection has no match
    pub fn feature_for_code3(&self, code3: &str) -> QuizResult<Option<GeoJsonFeature>> {
        let collection = self.load()?;
        let feature = collection.find_by_code3(code3).cloned();
        if feature.is_none() {
            tracing::debug!(code3, "no outline feature for country");
        }
        Ok(feature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const COLLECTION: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "properties": {"NAME": "France", "ISO_A3": "FRA"},
             "geometry": {"type": "Polygon", "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 0]]]}},
            {"type": "Feature", "id": 7, "properties": {"name": "Chile", "iso_a3": "chl"},
             "geometry": {"type": "Polygon", "coordinates": []}},
            {"type": "Feature", "geometry": null}
        ]
    }"#;

    struct CountingSource(AtomicUsize);

    impl GeoJsonSource for CountingSource {
        fn fetch(&self) -> QuizResult<GeoJsonCollection> {
            self.0.fetch_add(1, Ordering::SeqCst);
            GeoJsonCollection::from_json(COLLECTION)
        }
    }

    #[test]
    fn test_filename_aliases() {
        assert_eq!(geojson_filename("United States"), "usa");
        assert_eq!(geojson_filename("DR Congo"), "democratic_congo");
        assert_eq!(geojson_filename("Côte d'Ivoire"), "cote_divoire");
    }

    #[test]
    fn test_filename_slug() {
        assert_eq!(geojson_filename("New  Zealand"), "new_zealand");
        assert_eq!(geojson_filename("Guinea-Bissau"), "guineabissau");
        assert_eq!(geojson_filename("Curaçao"), "curaao");
    }

    #[test]
    fn test_outline_map_url() {
        assert_eq!(outline_map_url("FR"), "https://flagcdn.com/fr.svg");
    }

    #[test]
    fn test_lookup_by_either_property_case() {
        let collection = GeoJsonCollection::from_json(COLLECTION).unwrap();
        let france = collection.find_by_code3("fra").unwrap();
        assert_eq!(france.name(), Some("France"));
        let chile = collection.find_by_code3("CHL").unwrap();
        assert_eq!(chile.name(), Some("Chile"));
        assert!(collection.find_by_code3("USA").is_none());
    }

    #[test]
    fn test_cache_loads_once() {
        let source = Arc::new(CountingSource(AtomicUsize::new(0)));
        let cache = GeoJsonCache::new(source.clone());
        assert!(cache.feature_for_code3("FRA").unwrap().is_some());
        assert!(cache.feature_for_code3("XYZ").unwrap().is_none());
        assert_eq!(source.0.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_missing_file() {
        let source = JsonGeoJsonSource::File(PathBuf::from("/definitely/not/here.geojson"));
        let cache = GeoJsonCache::new(Arc::new(source));
        assert!(matches!(
            cache.feature_for_code3("FRA"),
            Err(QuizError::GeoDataUnavailable(_))
        ));
    }
}

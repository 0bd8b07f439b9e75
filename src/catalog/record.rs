//! Lake Record Module
//!
//! Defines the immutable lake record and its nested permit/regulation details.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::catalog::lake_id;

// == Coordinates ==
/// WGS84 position of a lake, encoded in the dataset as `[lat, lon]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl From<[f64; 2]> for Coordinates {
    fn from([latitude, longitude]: [f64; 2]) -> Self {
        Self::new(latitude, longitude)
    }
}

impl From<Coordinates> for [f64; 2] {
    fn from(c: Coordinates) -> Self {
        [c.latitude, c.longitude]
    }
}

// == Permit Prices ==
/// Permit price tiers. Every tier is optional; prices are free text ("CHF 25.00").
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PermitPrices {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekly: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annual: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub youth: Option<String>,
    /// Where to buy the permit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl PermitPrices {
    /// True when no tier and no link is present.
    pub fn is_empty(&self) -> bool {
        self.daily.is_none()
            && self.weekly.is_none()
            && self.monthly.is_none()
            && self.annual.is_none()
            && self.youth.is_none()
            && self.link.is_none()
    }
}

// == Regulations ==
/// Fishing regulation details for a lake.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Regulations {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_seasons: Option<String>,
    /// Minimum catch size per species
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub min_sizes: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bag_limit: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional_rules: Vec<String>,
}

impl Regulations {
    pub fn is_empty(&self) -> bool {
        self.closed_seasons.is_none()
            && self.min_sizes.is_empty()
            && self.bag_limit.is_none()
            && self.additional_rules.is_empty()
    }
}

// == Lake Record ==
/// A single lake as loaded from the dataset. Immutable after load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LakeRecord {
    /// Stable identifier derived from the name when absent in the dataset
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(rename = "coords")]
    pub coordinates: Coordinates,
    pub area: String,
    pub max_depth: String,
    pub elevation: String,
    /// Cantons the lake belongs to
    #[serde(rename = "cantons", deserialize_with = "deserialize_regions")]
    pub regions: Vec<String>,
    #[serde(default)]
    pub fish_species: Vec<String>,
    #[serde(default)]
    pub free_fishing: bool,
    #[serde(default)]
    pub best_season: String,
    #[serde(default)]
    pub permit_required: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permit_prices: Option<PermitPrices>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regulations: Option<Regulations>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
}

impl LakeRecord {
    /// Fills in the id from the name if the dataset left it blank.
    pub(crate) fn with_derived_id(mut self) -> Self {
        if self.id.trim().is_empty() {
            self.id = lake_id(&self.name);
        }
        self
    }

    /// Case-insensitive substring match against any region.
    pub fn in_region(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.regions
            .iter()
            .any(|region| region.to_lowercase().contains(&needle))
    }

    /// Case-insensitive substring match against any fish species.
    pub fn has_species(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.fish_species
            .iter()
            .any(|fish| fish.to_lowercase().contains(&needle))
    }

    pub fn has_prices(&self) -> bool {
        self.permit_prices.as_ref().is_some_and(|p| !p.is_empty())
    }

    pub fn has_regulations(&self) -> bool {
        self.regulations.as_ref().is_some_and(|r| !r.is_empty())
    }
}

/// Accepts either `"Bern, Neuenburg"` or `["Bern", "Neuenburg"]`.
fn deserialize_regions<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RegionsField {
        Joined(String),
        List(Vec<String>),
    }

    let regions = match RegionsField::deserialize(deserializer)? {
        RegionsField::Joined(joined) => joined.split(',').map(str::to_string).collect(),
        RegionsField::List(list) => list,
    };

    Ok(regions
        .into_iter()
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const BIELERSEE: &str = r#"{
        "name": "Bielersee",
        "coords": [47.098479, 7.190848],
        "area": "39.3 km²",
        "maxDepth": "74 m",
        "elevation": "429 m",
        "cantons": "Bern, Neuenburg",
        "fishSpecies": ["Hecht", "Barsch", "Felchen"],
        "freeFishing": true,
        "bestSeason": "April - Oktober",
        "permitRequired": "Kein Patent erforderlich"
    }"#;

    #[test]
    fn test_deserialize_joined_cantons() {
        let lake: LakeRecord = serde_json::from_str(BIELERSEE).unwrap();
        assert_eq!(lake.regions, vec!["Bern", "Neuenburg"]);
        assert_eq!(lake.coordinates, Coordinates::new(47.098479, 7.190848));
        assert!(lake.free_fishing);
        assert!(lake.id.is_empty());
        assert!(!lake.has_prices());
        assert!(!lake.has_regulations());
    }

    #[test]
    fn test_deserialize_cantons_list() {
        let json = BIELERSEE.replace(r#""Bern, Neuenburg""#, r#"["Bern", " Neuenburg "]"#);
        let lake: LakeRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(lake.regions, vec!["Bern", "Neuenburg"]);
    }

    #[test]
    fn test_with_derived_id_keeps_explicit_id() {
        let mut lake: LakeRecord = serde_json::from_str(BIELERSEE).unwrap();
        lake.id = "lac-de-bienne".to_string();
        assert_eq!(lake.with_derived_id().id, "lac-de-bienne");
    }

    #[test]
    fn test_with_derived_id_fills_blank() {
        let lake: LakeRecord = serde_json::from_str(BIELERSEE).unwrap();
        assert_eq!(lake.with_derived_id().id, "bielersee");
    }

    #[test]
    fn test_region_and_species_matching_ignores_case() {
        let lake: LakeRecord = serde_json::from_str(BIELERSEE).unwrap();
        assert!(lake.in_region("BERN"));
        assert!(lake.in_region("neuen"));
        assert!(!lake.in_region("Wallis"));
        assert!(lake.has_species("hecht"));
        assert!(lake.has_species("FELCH"));
        assert!(!lake.has_species("Zander"));
    }

    #[test]
    fn test_nested_details() {
        let json = BIELERSEE.replace(
            r#""permitRequired": "Kein Patent erforderlich""#,
            r#""permitRequired": "Patent",
               "permitPrices": { "daily": "CHF 25.00", "link": "https://www.sana.ch/" },
               "regulations": { "minSizes": { "Hecht": "50 cm" }, "additionalRules": ["Schonzeiten einhalten"] },
               "images": ["https://example.org/biel.jpg"]"#,
        );
        let lake: LakeRecord = serde_json::from_str(&json).unwrap();
        assert!(lake.has_prices());
        assert!(lake.has_regulations());
        let regs = lake.regulations.as_ref().unwrap();
        assert_eq!(regs.min_sizes.get("Hecht").map(String::as_str), Some("50 cm"));
        assert_eq!(lake.images.len(), 1);
    }

    #[test]
    fn test_serialize_uses_dataset_shape() {
        let lake: LakeRecord = serde_json::from_str(BIELERSEE).unwrap();
        let value = serde_json::to_value(lake.with_derived_id()).unwrap();
        assert_eq!(value["coords"][0], 47.098479);
        assert_eq!(value["maxDepth"], "74 m");
        assert_eq!(value["cantons"][1], "Neuenburg");
        assert!(value.get("permitPrices").is_none());
    }
}

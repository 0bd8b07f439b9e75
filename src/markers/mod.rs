//! Marker Layer
//!
//! One map marker per lake, plus the subset currently visible under a filter.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use tracing::debug;

use crate::catalog::{Coordinates, LakeCatalog, LakeRecord};
use crate::error::AtlasError;

// == Marker ==
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub lake_id: String,
    pub name: String,
    pub position: Coordinates,
    pub free_fishing: bool,
}

impl From<&LakeRecord> for Marker {
    fn from(lake: &LakeRecord) -> Self {
        Self {
            lake_id: lake.id.clone(),
            name: lake.name.clone(),
            position: lake.coordinates,
            free_fishing: lake.free_fishing,
        }
    }
}

// == Marker Filter ==
/// Which markers to show.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MarkerFilter {
    #[default]
    All,
    FreeFishing,
    Species(String),
    Region(String),
}

impl MarkerFilter {
    pub fn matches(&self, lake: &LakeRecord) -> bool {
        match self {
            MarkerFilter::All => true,
            MarkerFilter::FreeFishing => lake.free_fishing,
            MarkerFilter::Species(species) => lake.has_species(species),
            MarkerFilter::Region(region) => lake.in_region(region),
        }
    }
}

impl FromStr for MarkerFilter {
    type Err = AtlasError;

    /// Parses `all`, `free` / `free-fishing`, `species:<name>` or `region:<name>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            return Ok(MarkerFilter::All);
        }
        if s.eq_ignore_ascii_case("free") || s.eq_ignore_ascii_case("free-fishing") {
            return Ok(MarkerFilter::FreeFishing);
        }

        let (kind, value) = s
            .split_once(':')
            .ok_or_else(|| AtlasError::InvalidRequest(format!("unknown marker filter '{s}'")))?;
        let value = value.trim();
        if value.is_empty() {
            return Err(AtlasError::InvalidRequest(format!(
                "marker filter '{kind}' needs a value"
            )));
        }

        match kind.trim().to_ascii_lowercase().as_str() {
            "species" => Ok(MarkerFilter::Species(value.to_string())),
            "region" => Ok(MarkerFilter::Region(value.to_string())),
            other => Err(AtlasError::InvalidRequest(format!(
                "unknown marker filter '{other}'"
            ))),
        }
    }
}

impl fmt::Display for MarkerFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarkerFilter::All => write!(f, "all"),
            MarkerFilter::FreeFishing => write!(f, "free-fishing"),
            MarkerFilter::Species(s) => write!(f, "species:{s}"),
            MarkerFilter::Region(r) => write!(f, "region:{r}"),
        }
    }
}

// == Marker Layer ==
/// Full marker set and the ids currently visible.
#[derive(Debug, Default)]
pub struct MarkerLayer {
    markers: Vec<Marker>,
    visible: BTreeSet<String>,
    filter: MarkerFilter,
}

impl MarkerLayer {
    /// One marker per catalog lake, all visible.
    pub fn from_catalog(catalog: &LakeCatalog) -> Self {
        let markers: Vec<Marker> = catalog.all().iter().map(|l| Marker::from(&**l)).collect();
        let visible = markers.iter().map(|m| m.lake_id.clone()).collect();
        Self {
            markers,
            visible,
            filter: MarkerFilter::All,
        }
    }

    /// Clears the visible set and re-adds every marker whose lake matches.
    ///
    /// Returns the number of visible markers.
    pub fn apply(&mut self, filter: MarkerFilter, catalog: &LakeCatalog) -> usize {
        self.visible.clear();
        for marker in &self.markers {
            let matches = catalog
                .by_id(&marker.lake_id)
                .is_some_and(|lake| filter.matches(&lake));
            if matches {
                self.visible.insert(marker.lake_id.clone());
            }
        }

        debug!(
            "Marker filter '{}' shows {} of {} markers",
            filter,
            self.visible.len(),
            self.markers.len()
        );
        self.filter = filter;
        self.visible.len()
    }

    pub fn visible(&self) -> impl Iterator<Item = &Marker> {
        self.markers
            .iter()
            .filter(|m| self.visible.contains(&m.lake_id))
    }

    pub fn visible_count(&self) -> usize {
        self.visible.len()
    }

    pub fn is_visible(&self, lake_id: &str) -> bool {
        self.visible.contains(lake_id)
    }

    pub fn total(&self) -> usize {
        self.markers.len()
    }

    pub fn filter(&self) -> &MarkerFilter {
        &self.filter
    }
}

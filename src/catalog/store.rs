//! Lake Catalog Store
//!
//! Read-only, id-indexed collection of lake records with the query operations
//! the map and detail views need.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::catalog::LakeRecord;
use crate::error::{AtlasError, Result};

// == Lake Query ==
/// Optional filters combined with AND semantics.
#[derive(Debug, Clone, Default)]
pub struct LakeQuery {
    pub region: Option<String>,
    pub species: Option<String>,
    pub free_fishing: Option<bool>,
}

impl LakeQuery {
    fn matches(&self, lake: &LakeRecord) -> bool {
        self.region.as_deref().map_or(true, |r| lake.in_region(r))
            && self.species.as_deref().map_or(true, |s| lake.has_species(s))
            && self.free_fishing.map_or(true, |f| lake.free_fishing == f)
    }
}

// == Lake Catalog ==
/// Immutable catalog of lakes, in dataset order.
#[derive(Debug, Default)]
pub struct LakeCatalog {
    lakes: Vec<Arc<LakeRecord>>,
    by_id: HashMap<String, usize>,
}

impl LakeCatalog {
    // == Constructor ==
    /// Builds a catalog, deriving missing ids and rejecting duplicates.
    pub fn from_records(records: Vec<LakeRecord>) -> Result<Self> {
        let mut lakes = Vec::with_capacity(records.len());
        let mut by_id = HashMap::with_capacity(records.len());

        for record in records {
            let record = record.with_derived_id();
            if record.id.is_empty() {
                return Err(AtlasError::Dataset(format!(
                    "lake '{}' has no usable id",
                    record.name
                )));
            }
            if by_id.contains_key(&record.id) {
                return Err(AtlasError::Dataset(format!(
                    "duplicate lake id '{}'",
                    record.id
                )));
            }
            by_id.insert(record.id.clone(), lakes.len());
            lakes.push(Arc::new(record));
        }

        debug!("Catalog built with {} lakes", lakes.len());
        Ok(Self { lakes, by_id })
    }

    /// Catalog with no lakes, used when loading fails.
    pub fn empty() -> Self {
        Self::default()
    }

    // == Queries ==
    pub fn all(&self) -> &[Arc<LakeRecord>] {
        &self.lakes
    }

    pub fn by_id(&self, id: &str) -> Option<Arc<LakeRecord>> {
        self.by_id.get(id).map(|&idx| Arc::clone(&self.lakes[idx]))
    }

    /// Case-insensitive exact name match.
    pub fn by_name(&self, name: &str) -> Option<Arc<LakeRecord>> {
        let name = name.to_lowercase();
        self.lakes
            .iter()
            .find(|lake| lake.name.to_lowercase() == name)
            .cloned()
    }

    /// Lakes with a region containing `region`, ignoring case.
    pub fn by_region(&self, region: &str) -> Vec<Arc<LakeRecord>> {
        self.filtered(|lake| lake.in_region(region))
    }

    /// Lakes with a species containing `species`, ignoring case.
    pub fn by_fish_species(&self, species: &str) -> Vec<Arc<LakeRecord>> {
        self.filtered(|lake| lake.has_species(species))
    }

    pub fn free_fishing(&self) -> Vec<Arc<LakeRecord>> {
        self.filtered(|lake| lake.free_fishing)
    }

    pub fn search(&self, query: &LakeQuery) -> Vec<Arc<LakeRecord>> {
        self.filtered(|lake| query.matches(lake))
    }

    // == Counts ==
    pub fn count(&self) -> usize {
        self.lakes.len()
    }

    pub fn free_fishing_count(&self) -> usize {
        self.lakes.iter().filter(|lake| lake.free_fishing).count()
    }

    pub fn is_empty(&self) -> bool {
        self.lakes.is_empty()
    }

    fn filtered<F>(&self, predicate: F) -> Vec<Arc<LakeRecord>>
    where
        F: Fn(&LakeRecord) -> bool,
    {
        self.lakes
            .iter()
            .filter(|lake| predicate(lake))
            .cloned()
            .collect()
    }
}

//! Catalog Module
//!
//! Read-only lake catalog: records, id derivation, queries, and the
//! load-once gate over the dataset source.

mod loader;
mod record;
mod slug;
mod store;


// Re-export public types
pub use loader::{
    source_from_config, CatalogLoader, DatasetSource, EmbeddedDataset, FileDataset, HttpDataset,
};
pub use record::{Coordinates, LakeRecord, PermitPrices, Regulations};
pub use slug::lake_id;
pub use store::{LakeCatalog, LakeQuery};

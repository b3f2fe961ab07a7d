//! Artwork catalog: the records the classifier annotates and the blender reads.

mod models;
mod schema;
mod store;
mod trait_def;

pub use models::{Artwork, ArtworkAnalysisUpdate, ArtworkQuery, NoveltyFilter, PaletteEntry, ProcessingStatus};
pub use store::SqliteCatalogStore;
pub use trait_def::CatalogStore;

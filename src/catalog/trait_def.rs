//! CatalogStore trait definition.

use super::models::{Artwork, ArtworkAnalysisUpdate, ArtworkQuery};
use anyhow::Result;

/// Read access to the artwork catalog plus the few writes the classifier owns.
pub trait CatalogStore: Send + Sync {
    /// Inserts a new catalog record. Fails if the id already exists.
    fn insert_artwork(&self, artwork: &Artwork) -> Result<()>;

    /// Returns Ok(None) if the artwork does not exist.
    fn get_artwork(&self, id: &str) -> Result<Option<Artwork>>;

    /// Fetches several artworks at once; unknown ids are skipped.
    fn get_artworks(&self, ids: &[String]) -> Result<Vec<Artwork>>;

    fn query_artworks(&self, query: &ArtworkQuery) -> Result<Vec<Artwork>>;

    /// Active artworks with an image that have not been classified yet, newest first.
    fn list_artworks_needing_analysis(&self, limit: usize) -> Result<Vec<Artwork>>;

    /// Stores classifier output and marks the artwork as processed.
    /// Returns Ok(false) if the artwork does not exist.
    fn update_artwork_analysis(&self, id: &str, update: &ArtworkAnalysisUpdate) -> Result<bool>;

    /// Replaces the image reference and sends the artwork back to `crawled`
    /// so its classification is recomputed. Returns Ok(false) if not found.
    fn mark_image_changed(&self, id: &str, image_ref: &str) -> Result<bool>;

    fn count_artworks(&self) -> Result<usize>;
}

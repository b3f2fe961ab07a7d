//! Curated artist and genre relation graph.

mod curated;
mod graph;

pub use curated::CURATED_GRAPH_VERSION;
pub use graph::{
    normalize_artist_name, ArtistNode, GenreLocation, GenreNode, PreferenceGraph, SeedPreferences,
};

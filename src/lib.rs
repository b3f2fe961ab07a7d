//! Art discovery engine library
//!
//! Personalized artwork recommendations built from interaction-driven
//! affinities, a curated preference graph and visual analysis of the
//! artworks themselves.

pub mod analysis;
pub mod background_jobs;
pub mod catalog;
pub mod config;
pub mod engine;
pub mod metrics;
pub mod personalization;
pub mod preference_graph;
pub mod recommend;
pub mod sqlite_persistence;
pub mod user_store;

// Re-export commonly used types for convenience
pub use catalog::{Artwork, CatalogStore, SqliteCatalogStore};
pub use engine::{EngineError, EngineSettings, RecommendationEngine};
pub use preference_graph::PreferenceGraph;
pub use recommend::{RecommendationCandidate, Strategy};
pub use user_store::{ActionType, FullUserStore, SqliteUserStore};

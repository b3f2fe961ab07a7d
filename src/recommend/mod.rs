//! Candidate retrieval, blending and diversity re-ranking.

mod blender;
mod explain;
mod models;
mod quotas;
mod rerank;
pub mod strategies;

pub use blender::{strategy_counts, BlendRequest, Blender};
pub use explain::explain;
pub use models::{RecommendationCandidate, Strategy, UserProfile};
pub use quotas::StrategyQuotas;
pub use rerank::{final_score, rerank};
pub use strategies::cosine_similarity;

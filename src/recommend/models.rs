use crate::catalog::Artwork;
use crate::preference_graph::SeedPreferences;
use crate::user_store::UserAffinity;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    ArtistBased,
    GenreBased,
    Collaborative,
    Exploratory,
}

impl Strategy {
    pub const ALL: [Strategy; 4] = [
        Strategy::ArtistBased,
        Strategy::GenreBased,
        Strategy::Collaborative,
        Strategy::Exploratory,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::ArtistBased => "artist_based",
            Strategy::GenreBased => "genre_based",
            Strategy::Collaborative => "collaborative",
            Strategy::Exploratory => "exploratory",
        }
    }

    /// Multiplier applied to relevance when re-ranking.
    pub fn weight(&self) -> f64 {
        match self {
            Strategy::ArtistBased => 1.0,
            Strategy::GenreBased => 0.8,
            Strategy::Collaborative => 0.9,
            Strategy::Exploratory => 0.6,
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One artwork proposed by one strategy. Lives for a single request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationCandidate {
    pub artwork: Artwork,
    pub strategy: Strategy,
    pub relevance: f64,
    pub final_score: f64,
    pub diversity_score: f64,
}

impl RecommendationCandidate {
    pub fn new(artwork: Artwork, strategy: Strategy, relevance: f64) -> Self {
        Self {
            artwork,
            strategy,
            relevance,
            final_score: 0.0,
            diversity_score: 0.0,
        }
    }
}

/// What the strategies know about the requesting user.
#[derive(Debug, Clone, Default)]
pub struct UserProfile {
    pub user_id: usize,
    pub personality_type: Option<String>,
    pub top_artists: Vec<UserAffinity>,
    pub top_genres: Vec<UserAffinity>,
    pub seed: Option<SeedPreferences>,
}

impl UserProfile {
    pub fn seed_has_artist(&self, artist_key: &str) -> bool {
        self.seed
            .as_ref()
            .is_some_and(|seed| seed.artists.iter().any(|a| a == artist_key))
    }

    pub fn seed_has_genre(&self, genre: Option<&str>) -> bool {
        match (self.seed.as_ref(), genre) {
            (Some(seed), Some(genre)) => seed.genres.iter().any(|g| g == genre),
            _ => false,
        }
    }
}

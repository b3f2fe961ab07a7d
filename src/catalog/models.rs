//! Artwork catalog models.

pub use crate::analysis::PaletteEntry;
use crate::preference_graph::normalize_artist_name;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ingestion lifecycle of a catalog record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingStatus {
    Pending,
    Crawled,
    Processed,
}

impl ProcessingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingStatus::Pending => "pending",
            ProcessingStatus::Crawled => "crawled",
            ProcessingStatus::Processed => "processed",
        }
    }
}

impl fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProcessingStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ProcessingStatus::Pending),
            "crawled" => Ok(ProcessingStatus::Crawled),
            "processed" => Ok(ProcessingStatus::Processed),
            other => anyhow::bail!("Unknown processing status: {}", other),
        }
    }
}


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artwork {
    pub id: String,
    pub title: String,
    pub artist: String,
    /// Normalized artist name used for graph and affinity lookups.
    pub artist_key: String,
    pub genre: Option<String>,
    pub period: Option<String>,
    pub style: Option<String>,
    /// Visual quality in [0, 1], written by the classifier.
    pub quality_score: f64,
    pub palette: Vec<PaletteEntry>,
    pub emotion_tags: Vec<String>,
    pub personality_tags: Vec<String>,
    pub status: ProcessingStatus,
    pub image_ref: Option<String>,
    pub is_active: bool,
}

impl Artwork {
    pub fn new(id: impl Into<String>, title: impl Into<String>, artist: impl Into<String>) -> Self {
        let artist = artist.into();
        Self {
            id: id.into(),
            title: title.into(),
            artist_key: normalize_artist_name(&artist),
            artist,
            genre: None,
            period: None,
            style: None,
            quality_score: 0.0,
            palette: Vec::new(),
            emotion_tags: Vec::new(),
            personality_tags: Vec::new(),
            status: ProcessingStatus::Pending,
            image_ref: None,
            is_active: true,
        }
    }

    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    pub fn with_period(mut self, period: impl Into<String>) -> Self {
        self.period = Some(period.into());
        self
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }

    pub fn with_quality(mut self, quality_score: f64) -> Self {
        self.quality_score = quality_score.clamp(0.0, 1.0);
        self
    }

    pub fn with_image_ref(mut self, image_ref: impl Into<String>) -> Self {
        self.image_ref = Some(image_ref.into());
        self.status = ProcessingStatus::Crawled;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }
}

/// Classifier output written back onto a catalog record.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtworkAnalysisUpdate {
    pub personality_tags: Vec<String>,
    pub emotion_tags: Vec<String>,
    pub palette: Vec<PaletteEntry>,
    pub quality_score: f64,
}

/// Keeps only artworks with at least one period, style or genre outside the
/// `seen_*` sets, and orders them by the summed weights of their unseen
/// attributes before quality.
#[derive(Debug, Clone, Default)]
pub struct NoveltyFilter {
    pub seen_periods: Vec<String>,
    pub seen_styles: Vec<String>,
    pub seen_genres: Vec<String>,
    pub period_weight: f64,
    pub style_weight: f64,
    pub genre_weight: f64,
}

/// Catalog filter. Every `Some` field narrows the result; results come back
/// ordered by quality descending, then id, unless a [`NoveltyFilter`] puts
/// novelty first.
#[derive(Debug, Clone, Default)]
pub struct ArtworkQuery {
    pub artist_keys: Option<Vec<String>>,
    pub genres: Option<Vec<String>>,
    pub min_quality: Option<f64>,
    pub active_only: bool,
    pub exclude_ids: Vec<String>,
    pub novelty: Option<NoveltyFilter>,
    pub limit: usize,
}

impl ArtworkQuery {
    pub fn active(limit: usize) -> Self {
        Self {
            active_only: true,
            limit,
            ..Default::default()
        }
    }

    pub fn by_artists(mut self, artist_keys: Vec<String>) -> Self {
        self.artist_keys = Some(artist_keys);
        self
    }

    pub fn by_genres(mut self, genres: Vec<String>) -> Self {
        self.genres = Some(genres);
        self
    }

    pub fn min_quality(mut self, min_quality: f64) -> Self {
        self.min_quality = Some(min_quality);
        self
    }

    pub fn excluding(mut self, ids: Vec<String>) -> Self {
        self.exclude_ids = ids;
        self
    }

    pub fn novel(mut self, filter: NoveltyFilter) -> Self {
        self.novelty = Some(filter);
        self
    }
}

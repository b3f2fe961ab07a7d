//! Visual feature extraction and personality classification for artworks.
//!
//! Everything here is pure: the same pixels always produce the same
//! analysis. Loading pixels is left to an [`ImageSource`].

pub mod color;
mod emotions;
mod features;
mod personality;
mod pixels;
mod quality;

pub use color::{PaletteEntry, Rgb};
pub use emotions::{extract_emotions, EmotionMatch};
pub use features::{
    ColorAnalysis, Composition, ExtractorSettings, TechnicalQuality, VisualFeatureExtractor,
    VisualFeatures,
};
pub use personality::{
    confidence, Axis, AxisScores, PersonalityClassifier, PersonalityProfile, PersonalityType,
};
pub use pixels::{decode_ppm, encode_ppm, ImageSource, PixelBuffer, PpmImageSource};
pub use quality::quality_score;

use crate::catalog::ArtworkAnalysisUpdate;
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Everything the classifier derives from one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtworkAnalysis {
    pub features: VisualFeatures,
    pub profile: PersonalityProfile,
    pub emotions: Vec<EmotionMatch>,
    pub quality_score: f64,
}

impl ArtworkAnalysis {
    pub fn to_update(&self) -> ArtworkAnalysisUpdate {
        ArtworkAnalysisUpdate {
            personality_tags: self.profile.tags(),
            emotion_tags: self.emotions.iter().map(|e| e.emotion.clone()).collect(),
            palette: self.features.color.palette.clone(),
            quality_score: self.quality_score,
        }
    }
}

impl VisualFeatureExtractor {
    pub fn analyze(&self, image: &PixelBuffer) -> Result<ArtworkAnalysis> {
        let features = self.extract(image)?;
        let profile = PersonalityClassifier::new().classify(&features);
        let emotions = extract_emotions(&features.color);
        let quality_score = quality_score(&features);
        Ok(ArtworkAnalysis {
            features,
            profile,
            emotions,
            quality_score,
        })
    }
}

/// Analyzes an image with the default extractor settings.
pub fn analyze(image: &PixelBuffer) -> Result<ArtworkAnalysis> {
    VisualFeatureExtractor::default().analyze(image)
}

use super::color::rgb_to_hue;
use super::features::ColorAnalysis;
use serde::{Deserialize, Serialize};

struct EmotionRange {
    emotion: &'static str,
    hues: &'static [(f64, f64)],
    saturation: (f64, f64),
    brightness: (f64, f64),
}

const EMOTION_TABLE: &[EmotionRange] = &[
    EmotionRange {
        emotion: "serene",
        hues: &[(180.0, 240.0)],
        saturation: (0.0, 50.0),
        brightness: (50.0, 80.0),
    },
    EmotionRange {
        emotion: "joyful",
        hues: &[(30.0, 90.0)],
        saturation: (60.0, 100.0),
        brightness: (70.0, 100.0),
    },
    EmotionRange {
        emotion: "melancholic",
        hues: &[(200.0, 280.0)],
        saturation: (10.0, 40.0),
        brightness: (20.0, 50.0),
    },
    EmotionRange {
        emotion: "dramatic",
        hues: &[(0.0, 30.0), (300.0, 360.0)],
        saturation: (70.0, 100.0),
        brightness: (20.0, 40.0),
    },
    EmotionRange {
        emotion: "mysterious",
        hues: &[(240.0, 300.0)],
        saturation: (20.0, 60.0),
        brightness: (10.0, 30.0),
    },
    EmotionRange {
        emotion: "energetic",
        hues: &[(0.0, 60.0)],
        saturation: (80.0, 100.0),
        brightness: (60.0, 90.0),
    },
];

pub const MIN_EMOTION_CRITERIA: u32 = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionMatch {
    pub emotion: String,
    /// Fraction of the three criteria (hue, saturation, brightness) met.
    pub confidence: f64,
}

fn within(value: f64, (lo, hi): (f64, f64)) -> bool {
    value >= lo && value <= hi
}

/// Emotions whose ranges match at least two of dominant hue, saturation and
/// brightness, strongest first. Equal matches keep table order.
pub fn extract_emotions(color: &ColorAnalysis) -> Vec<EmotionMatch> {
    let hue = rgb_to_hue(color.dominant);
    let mut matches: Vec<EmotionMatch> = EMOTION_TABLE
        .iter()
        .filter_map(|range| {
            let met = [
                range.hues.iter().any(|r| within(hue, *r)),
                within(color.saturation, range.saturation),
                within(color.brightness, range.brightness),
            ]
            .into_iter()
            .filter(|m| *m)
            .count() as u32;
            (met >= MIN_EMOTION_CRITERIA).then(|| EmotionMatch {
                emotion: range.emotion.to_string(),
                confidence: met as f64 / 3.0,
            })
        })
        .collect();
    matches.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    matches
}

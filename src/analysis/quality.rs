use super::features::VisualFeatures;

const RESOLUTION_POINTS: f64 = 30.0;
const SHARPNESS_POINTS: f64 = 20.0;
const CONTRAST_POINTS: f64 = 20.0;
const PALETTE_POINTS: f64 = 15.0;
const COMPOSITION_POINTS: f64 = 15.0;

/// Palette size that earns the full richness score.
const RICH_PALETTE: f64 = 5.0;

fn resolution_points(features: &VisualFeatures) -> f64 {
    let technical = &features.technical;
    if technical.is_high_res {
        RESOLUTION_POINTS
    } else if technical.resolution() > 1_000_000 {
        20.0
    } else if technical.resolution() > 500_000 {
        10.0
    } else {
        0.0
    }
}

/// Weighted 0-100 score rounded to a whole point, returned in [0, 1].
pub fn quality_score(features: &VisualFeatures) -> f64 {
    let palette_richness = (features.color.palette.len() as f64 / RICH_PALETTE).min(1.0);
    let composition =
        features.composition.rule_of_thirds * 0.5 + features.composition.balance * 0.5;

    let points = resolution_points(features)
        + features.technical.sharpness * SHARPNESS_POINTS
        + features.technical.contrast * CONTRAST_POINTS
        + palette_richness * PALETTE_POINTS
        + composition * COMPOSITION_POINTS;

    points.round().clamp(0.0, 100.0) / 100.0
}

//! Maps visual features onto a four-letter personality type.

use super::features::VisualFeatures;
use anyhow::bail;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the four binary axes. The second pole wins ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    EnergyIntroversion,
    IntuitionSensing,
    ThinkingFeeling,
    JudgingPerceiving,
}

impl Axis {
    pub const ALL: [Axis; 4] = [
        Axis::EnergyIntroversion,
        Axis::IntuitionSensing,
        Axis::ThinkingFeeling,
        Axis::JudgingPerceiving,
    ];

    pub fn poles(&self) -> (char, char) {
        match self {
            Axis::EnergyIntroversion => ('E', 'I'),
            Axis::IntuitionSensing => ('N', 'S'),
            Axis::ThinkingFeeling => ('T', 'F'),
            Axis::JudgingPerceiving => ('J', 'P'),
        }
    }

    fn index(&self) -> usize {
        match self {
            Axis::EnergyIntroversion => 0,
            Axis::IntuitionSensing => 1,
            Axis::ThinkingFeeling => 2,
            Axis::JudgingPerceiving => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisScores {
    pub e: i32,
    pub i: i32,
    pub n: i32,
    pub s: i32,
    pub t: i32,
    pub f: i32,
    pub j: i32,
    pub p: i32,
}

impl AxisScores {
    pub fn pair(&self, axis: Axis) -> (i32, i32) {
        match axis {
            Axis::EnergyIntroversion => (self.e, self.i),
            Axis::IntuitionSensing => (self.n, self.s),
            Axis::ThinkingFeeling => (self.t, self.f),
            Axis::JudgingPerceiving => (self.j, self.p),
        }
    }

    /// First pole only on a strict majority.
    pub fn resolve(&self, axis: Axis) -> char {
        let (first, second) = self.pair(axis);
        let (a, b) = axis.poles();
        if first > second {
            a
        } else {
            b
        }
    }

    pub fn margin(&self, axis: Axis) -> i32 {
        let (first, second) = self.pair(axis);
        (first - second).abs()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PersonalityType([char; 4]);

impl PersonalityType {
    pub fn letter(&self, axis: Axis) -> char {
        self.0[axis.index()]
    }

    /// The same type with the letter on `axis` switched to the other pole.
    pub fn flipped(&self, axis: Axis) -> Self {
        let (a, b) = axis.poles();
        let mut letters = self.0;
        let idx = axis.index();
        letters[idx] = if letters[idx] == a { b } else { a };
        Self(letters)
    }
}

impl fmt::Display for PersonalityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in self.0 {
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}

impl FromStr for PersonalityType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let chars: Vec<char> = s.trim().to_uppercase().chars().collect();
        if chars.len() != 4 {
            bail!("Personality type must have four letters: {}", s);
        }
        let mut letters = ['?'; 4];
        for axis in Axis::ALL {
            let (a, b) = axis.poles();
            let c = chars[axis.index()];
            if c != a && c != b {
                bail!("Invalid letter '{}' in personality type {}", c, s);
            }
            letters[axis.index()] = c;
        }
        Ok(Self(letters))
    }
}

impl TryFrom<String> for PersonalityType {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PersonalityType> for String {
    fn from(value: PersonalityType) -> Self {
        value.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalityProfile {
    pub scores: AxisScores,
    pub type_code: PersonalityType,
    pub confidence: f64,
}

impl PersonalityProfile {
    /// Axes closer than this are ambiguous enough to also tag the other pole.
    pub const AMBIGUOUS_MARGIN: i32 = 2;

    /// The primary code, then the code with E/I flipped and the code with N/S
    /// flipped when those axes were close calls.
    pub fn tags(&self) -> Vec<String> {
        let mut tags = vec![self.type_code.to_string()];
        for axis in [Axis::EnergyIntroversion, Axis::IntuitionSensing] {
            if self.scores.margin(axis) < Self::AMBIGUOUS_MARGIN {
                tags.push(self.type_code.flipped(axis).to_string());
            }
        }
        tags
    }
}

/// Threshold rules over colour, sharpness and symmetry. Pure and
/// deterministic: the same features always give the same profile.
#[derive(Debug, Clone, Copy, Default)]
pub struct PersonalityClassifier;

impl PersonalityClassifier {
    pub fn new() -> Self {
        Self
    }

    pub fn score(&self, features: &VisualFeatures) -> AxisScores {
        let color = &features.color;
        let mut scores = AxisScores::default();

        if color.saturation > 70.0 && color.brightness > 60.0 {
            scores.e += 2;
        } else if color.saturation < 40.0 && color.brightness < 50.0 {
            scores.i += 2;
        }
        if color.temperature > 0.6 {
            scores.e += 1;
        }
        if color.temperature < 0.4 {
            scores.i += 1;
        }

        let sharpness = features.technical.sharpness;
        if sharpness < 0.5 {
            scores.n += 1;
        }
        if sharpness > 0.8 {
            scores.s += 1;
        }

        if color.temperature > 0.7 {
            scores.f += 2;
        }
        if color.temperature < 0.3 {
            scores.t += 2;
        }

        let symmetry = features.composition.symmetry;
        if symmetry > 0.8 {
            scores.j += 2;
        }
        if symmetry < 0.3 {
            scores.p += 2;
        }

        scores
    }

    pub fn classify(&self, features: &VisualFeatures) -> PersonalityProfile {
        let scores = self.score(features);
        let mut letters = ['?'; 4];
        for axis in Axis::ALL {
            letters[axis.index()] = scores.resolve(axis);
        }
        PersonalityProfile {
            scores,
            type_code: PersonalityType(letters),
            confidence: confidence(&scores),
        }
    }
}

/// Mean absolute pole difference over the four axes, clamped to [0, 1].
pub fn confidence(scores: &AxisScores) -> f64 {
    let total: i32 = Axis::ALL.iter().map(|axis| scores.margin(*axis)).sum();
    (total as f64 / Axis::ALL.len() as f64).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::color::Rgb;
    use crate::analysis::features::{ColorAnalysis, Composition, TechnicalQuality};

    fn features(saturation: f64, brightness: f64, temperature: f64, sharpness: f64, symmetry: f64) -> VisualFeatures {
        VisualFeatures {
            color: ColorAnalysis {
                dominant: Rgb(0, 0, 0),
                palette: vec![],
                saturation,
                brightness,
                contrast: 1.0,
                temperature,
            },
            technical: TechnicalQuality {
                width: 100,
                height: 100,
                is_high_res: false,
                sharpness,
                contrast: 0.5,
                dynamic_range: 0.5,
            },
            composition: Composition {
                symmetry,
                balance: 0.5,
                rule_of_thirds: 0.5,
            },
        }
    }

    #[test]
    fn vivid_warm_sharp_symmetric() {
        let profile = PersonalityClassifier::new().classify(&features(80.0, 70.0, 0.75, 0.9, 0.9));
        assert_eq!(profile.type_code.to_string(), "ESFJ");
        assert_eq!(profile.scores.e, 3);
        assert_eq!(profile.scores.f, 2);
        assert_eq!(profile.confidence, 1.0);
    }

    #[test]
    fn muted_cool_soft_asymmetric() {
        let profile = PersonalityClassifier::new().classify(&features(20.0, 30.0, 0.2, 0.3, 0.1));
        assert_eq!(profile.type_code.to_string(), "INTP");
        assert_eq!(profile.scores.i, 3);
        assert_eq!(profile.scores.t, 2);
    }

    #[test]
    fn ties_resolve_to_second_pole() {
        // mid-range everything: no rule fires
        let profile = PersonalityClassifier::new().classify(&features(50.0, 55.0, 0.5, 0.6, 0.5));
        assert_eq!(profile.scores, AxisScores::default());
        assert_eq!(profile.type_code.to_string(), "ISFP");
        assert_eq!(profile.confidence, 0.0);
    }

    #[test]
    fn confidence_is_mean_margin_clamped() {
        let scores = AxisScores {
            n: 1,
            ..Default::default()
        };
        assert_eq!(confidence(&scores), 0.25);
        let scores = AxisScores {
            e: 3,
            t: 2,
            j: 2,
            ..Default::default()
        };
        assert_eq!(confidence(&scores), 1.0);
    }

    #[test]
    fn classification_is_repeatable() {
        let f = features(65.0, 40.0, 0.65, 0.45, 0.85);
        let classifier = PersonalityClassifier::new();
        let first = classifier.classify(&f);
        let second = classifier.classify(&f);
        assert_eq!(first.type_code, second.type_code);
        assert_eq!(first.confidence, second.confidence);
    }

    #[test]
    fn tags_include_close_alternatives() {
        // E:1 vs I:0 and N:1 vs S:0 are both close
        let profile = PersonalityClassifier::new().classify(&features(50.0, 55.0, 0.65, 0.3, 0.5));
        assert_eq!(profile.type_code.to_string(), "ENFP");
        assert_eq!(profile.tags(), vec!["ENFP", "INFP", "ESFP"]);

        let decisive = PersonalityClassifier::new().classify(&features(80.0, 70.0, 0.75, 0.9, 0.9));
        assert_eq!(decisive.tags(), vec!["ESFJ", "ENFJ"]);
    }

    #[test]
    fn personality_type_parsing() {
        let t: PersonalityType = "infj".parse().unwrap();
        assert_eq!(t.to_string(), "INFJ");
        assert_eq!(t.letter(Axis::ThinkingFeeling), 'F');
        assert!("IXFJ".parse::<PersonalityType>().is_err());
        assert!("INF".parse::<PersonalityType>().is_err());
        let json = serde_json::to_string(&t).unwrap();
        assert_eq!(json, "\"INFJ\"");
    }
}

//! Colour, technical and composition statistics of an image.

use super::color::{relative_luminance, rgb_to_hsl, rgb_to_hue, PaletteEntry, Rgb};
use super::pixels::PixelBuffer;
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const HIGH_RES_SIDE: u32 = 1920;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExtractorSettings {
    /// Longest side of the image used for colour and composition analysis.
    pub max_dimension: u32,
    pub palette_size: usize,
    /// Channel standard deviation that maps to full sharpness.
    pub sharpness_normalizer: f64,
}

impl Default for ExtractorSettings {
    fn default() -> Self {
        Self {
            max_dimension: 400,
            palette_size: 10,
            sharpness_normalizer: 128.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorAnalysis {
    pub dominant: Rgb,
    /// Most frequent colours first.
    pub palette: Vec<PaletteEntry>,
    /// Mean palette saturation, 0-100.
    pub saturation: f64,
    /// Mean palette lightness, 0-100.
    pub brightness: f64,
    /// Luminance ratio between the lightest and darkest palette colours.
    pub contrast: f64,
    /// Share of warm colours, 0-1.
    pub temperature: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalQuality {
    pub width: u32,
    pub height: u32,
    pub is_high_res: bool,
    pub sharpness: f64,
    pub contrast: f64,
    pub dynamic_range: f64,
}

impl TechnicalQuality {
    pub fn resolution(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Composition {
    pub symmetry: f64,
    pub balance: f64,
    pub rule_of_thirds: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualFeatures {
    pub color: ColorAnalysis,
    pub technical: TechnicalQuality,
    pub composition: Composition,
}

#[derive(Debug, Clone, Default)]
pub struct VisualFeatureExtractor {
    settings: ExtractorSettings,
}

impl VisualFeatureExtractor {
    pub fn new(settings: ExtractorSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ExtractorSettings {
        &self.settings
    }

    pub fn extract(&self, image: &PixelBuffer) -> Result<VisualFeatures> {
        if image.is_empty() {
            bail!("Cannot analyze an empty image");
        }
        image.validate()?;
        let technical = self.technical_quality(image);
        let sample = image.downsample(self.settings.max_dimension);
        let color = self.color_analysis(&sample);
        let composition = composition(&sample);
        Ok(VisualFeatures {
            color,
            technical,
            composition,
        })
    }

    fn technical_quality(&self, image: &PixelBuffer) -> TechnicalQuality {
        let n = image.pixels.len() as f64;
        let mut sum = [0f64; 3];
        let mut sum_sq = [0f64; 3];
        let mut min = [u8::MAX; 3];
        let mut max = [u8::MIN; 3];
        for Rgb(r, g, b) in &image.pixels {
            for (c, v) in [*r, *g, *b].into_iter().enumerate() {
                let f = v as f64;
                sum[c] += f;
                sum_sq[c] += f * f;
                min[c] = min[c].min(v);
                max[c] = max[c].max(v);
            }
        }

        let mean_stdev = (0..3)
            .map(|c| {
                let mean = sum[c] / n;
                (sum_sq[c] / n - mean * mean).max(0.0).sqrt()
            })
            .sum::<f64>()
            / 3.0;
        let spread = (0..3)
            .map(|c| (max[c] - min[c]) as f64 / 255.0)
            .sum::<f64>()
            / 3.0;

        TechnicalQuality {
            width: image.width,
            height: image.height,
            is_high_res: image.width >= HIGH_RES_SIDE || image.height >= HIGH_RES_SIDE,
            sharpness: (mean_stdev / self.settings.sharpness_normalizer).min(1.0),
            contrast: spread,
            dynamic_range: spread,
        }
    }

    fn color_analysis(&self, image: &PixelBuffer) -> ColorAnalysis {
        let palette = extract_palette(image, self.settings.palette_size);
        let colors: Vec<Rgb> = palette.iter().map(|e| e.rgb).collect();
        let count = colors.len().max(1) as f64;

        let hsl: Vec<_> = colors.iter().map(|c| rgb_to_hsl(*c)).collect();
        let saturation = hsl.iter().map(|h| h.s).sum::<f64>() / count * 100.0;
        let brightness = hsl.iter().map(|h| h.l).sum::<f64>() / count * 100.0;

        ColorAnalysis {
            dominant: colors.first().copied().unwrap_or(Rgb(0, 0, 0)),
            saturation,
            brightness,
            contrast: luminance_ratio(&colors),
            temperature: temperature(&colors),
            palette,
        }
    }
}

/// Buckets pixels at 5 bits per channel and returns the `size` most frequent
/// buckets, each represented by the mean of its pixels. Equal counts are
/// ordered by bucket key so the result is deterministic.
pub fn extract_palette(image: &PixelBuffer, size: usize) -> Vec<PaletteEntry> {
    #[derive(Default)]
    struct Bucket {
        count: u64,
        sum: [u64; 3],
    }

    let mut buckets: HashMap<(u8, u8, u8), Bucket> = HashMap::new();
    for Rgb(r, g, b) in &image.pixels {
        let bucket = buckets.entry((*r >> 3, *g >> 3, *b >> 3)).or_default();
        bucket.count += 1;
        bucket.sum[0] += *r as u64;
        bucket.sum[1] += *g as u64;
        bucket.sum[2] += *b as u64;
    }

    let total = image.pixels.len().max(1) as f64;
    let mut ranked: Vec<_> = buckets.into_iter().collect();
    ranked.sort_by(|(ka, a), (kb, b)| b.count.cmp(&a.count).then(ka.cmp(kb)));
    ranked
        .into_iter()
        .take(size)
        .map(|(_, bucket)| {
            let mean = |c: usize| ((bucket.sum[c] as f64 / bucket.count as f64).round()) as u8;
            PaletteEntry {
                rgb: Rgb(mean(0), mean(1), mean(2)),
                frequency: bucket.count as f64 / total,
            }
        })
        .collect()
}

fn luminance_ratio(colors: &[Rgb]) -> f64 {
    if colors.len() < 2 {
        return 0.0;
    }
    let luminances: Vec<f64> = colors.iter().map(|c| relative_luminance(*c)).collect();
    let max = luminances.iter().copied().fold(f64::MIN, f64::max);
    let min = luminances.iter().copied().fold(f64::MAX, f64::min);
    (max + 0.05) / (min + 0.05)
}

/// `warm / (warm + cool + 1)` over chromatic colours. Reds through yellows
/// and magentas count as warm, cyans through violets as cool.
pub fn temperature(colors: &[Rgb]) -> f64 {
    let mut warm = 0u32;
    let mut cool = 0u32;
    for color in colors.iter().filter(|c| !c.is_achromatic()) {
        let hue = rgb_to_hue(*color);
        if hue <= 60.0 || hue >= 300.0 {
            warm += 1;
        } else if hue >= 180.0 {
            cool += 1;
        }
    }
    warm as f64 / (warm + cool + 1) as f64
}

fn luma(Rgb(r, g, b): Rgb) -> f64 {
    (0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64) / 255.0
}

/// Deterministic layout statistics over a luma map:
/// symmetry is one minus the mean left/right mirror difference, balance
/// compares the luminance mass of the two halves, and rule of thirds is the
/// share of edge energy lying near the third lines.
pub fn composition(image: &PixelBuffer) -> Composition {
    let (w, h) = (image.width as usize, image.height as usize);
    let lum: Vec<f64> = image.pixels.iter().map(|p| luma(*p)).collect();
    let at = |x: usize, y: usize| lum[y * w + x];

    let mut mirror_diff = 0.0;
    let mut mirror_pairs = 0usize;
    let mut left = 0.0;
    let mut right = 0.0;
    for y in 0..h {
        for x in 0..w / 2 {
            mirror_diff += (at(x, y) - at(w - 1 - x, y)).abs();
            mirror_pairs += 1;
            left += at(x, y);
            right += at(w - 1 - x, y);
        }
    }
    let symmetry = if mirror_pairs == 0 {
        1.0
    } else {
        1.0 - mirror_diff / mirror_pairs as f64
    };
    let balance = if left + right == 0.0 {
        1.0
    } else {
        1.0 - (left - right).abs() / (left + right)
    };

    let band_x = (w / 12).max(1);
    let band_y = (h / 12).max(1);
    let thirds_x = [w / 3, 2 * w / 3];
    let thirds_y = [h / 3, 2 * h / 3];
    let near = |v: usize, lines: &[usize; 2], band: usize| lines.iter().any(|l| v.abs_diff(*l) <= band);

    let mut energy = 0.0;
    let mut energy_near_thirds = 0.0;
    for y in 0..h {
        for x in 0..w {
            let dx = if x + 1 < w { (at(x + 1, y) - at(x, y)).abs() } else { 0.0 };
            let dy = if y + 1 < h { (at(x, y + 1) - at(x, y)).abs() } else { 0.0 };
            let e = dx + dy;
            energy += e;
            if near(x, &thirds_x, band_x) || near(y, &thirds_y, band_y) {
                energy_near_thirds += e;
            }
        }
    }
    let rule_of_thirds = if energy == 0.0 {
        0.0
    } else {
        energy_near_thirds / energy
    };

    Composition {
        symmetry: symmetry.clamp(0.0, 1.0),
        balance: balance.clamp(0.0, 1.0),
        rule_of_thirds: rule_of_thirds.clamp(0.0, 1.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_image_statistics() {
        let image = PixelBuffer::filled(100, 50, Rgb(200, 40, 40));
        let features = VisualFeatureExtractor::default().extract(&image).unwrap();

        assert_eq!(features.color.dominant, Rgb(200, 40, 40));
        assert_eq!(features.color.palette.len(), 1);
        assert_eq!(features.color.palette[0].frequency, 1.0);
        assert_eq!(features.color.contrast, 0.0);
        assert_eq!(features.technical.sharpness, 0.0);
        assert_eq!(features.technical.contrast, 0.0);
        assert!(!features.technical.is_high_res);
        assert_eq!(features.composition.symmetry, 1.0);
        assert_eq!(features.composition.balance, 1.0);
        assert_eq!(features.composition.rule_of_thirds, 0.0);
        // one warm colour: 1 / (1 + 0 + 1)
        assert_eq!(features.color.temperature, 0.5);
    }

    #[test]
    fn empty_image_fails() {
        let image = PixelBuffer::from_fn(0, 0, |_, _| Rgb(0, 0, 0));
        assert!(VisualFeatureExtractor::default().extract(&image).is_err());
    }

    #[test]
    fn inconsistent_buffer_fails() {
        let image = PixelBuffer {
            width: 10,
            height: 10,
            pixels: vec![Rgb(1, 2, 3); 12],
        };
        assert!(VisualFeatureExtractor::default().extract(&image).is_err());
    }

    #[test]
    fn palette_is_ordered_by_frequency() {
        let image = PixelBuffer::from_fn(10, 10, |x, _| {
            if x < 7 {
                Rgb(0, 0, 250)
            } else {
                Rgb(250, 250, 0)
            }
        });
        let palette = extract_palette(&image, 10);
        assert_eq!(palette.len(), 2);
        assert_eq!(palette[0].rgb, Rgb(0, 0, 250));
        assert!((palette[0].frequency - 0.7).abs() < 1e-12);
        assert!((palette[1].frequency - 0.3).abs() < 1e-12);
    }

    #[test]
    fn palette_bucket_uses_mean_colour() {
        let image = PixelBuffer::from_fn(2, 1, |x, _| if x == 0 { Rgb(80, 80, 80) } else { Rgb(82, 84, 86) });
        let palette = extract_palette(&image, 10);
        assert_eq!(palette.len(), 1);
        assert_eq!(palette[0].rgb, Rgb(81, 82, 83));
    }

    #[test]
    fn checkerboard_is_sharp_and_contrasty() {
        let image = PixelBuffer::from_fn(64, 64, |x, y| {
            if (x + y) % 2 == 0 {
                Rgb(0, 0, 0)
            } else {
                Rgb(255, 255, 255)
            }
        });
        let features = VisualFeatureExtractor::default().extract(&image).unwrap();
        assert!(features.technical.sharpness > 0.99);
        assert_eq!(features.technical.contrast, 1.0);
        assert!(features.color.contrast > 20.0);
        // greys carry no temperature
        assert_eq!(features.color.temperature, 0.0);
    }

    #[test]
    fn lopsided_image_is_unbalanced() {
        let image = PixelBuffer::from_fn(40, 20, |x, _| {
            if x < 20 {
                Rgb(255, 255, 255)
            } else {
                Rgb(0, 0, 0)
            }
        });
        let composition = composition(&image);
        assert!(composition.balance < 0.01);
        assert!(composition.symmetry < 0.01);
    }

    #[test]
    fn temperature_counts_warm_and_cool() {
        let colors = [Rgb(255, 0, 0), Rgb(255, 200, 0), Rgb(0, 0, 255), Rgb(90, 90, 90)];
        assert!((temperature(&colors) - 2.0 / 4.0).abs() < 1e-12);
    }

    #[test]
    fn large_images_are_high_res() {
        let image = PixelBuffer::filled(1920, 10, Rgb(1, 1, 1));
        let features = VisualFeatureExtractor::default().extract(&image).unwrap();
        assert!(features.technical.is_high_res);
        assert_eq!(features.technical.resolution(), 19_200);
    }
}

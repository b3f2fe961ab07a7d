//! Decoded images and where they come from.

use super::color::Rgb;
use anyhow::{bail, Context, Result};
use std::path::{Component, Path, PathBuf};

/// Row-major RGB image.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Rgb>,
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32, pixels: Vec<Rgb>) -> Result<Self> {
        let image = Self {
            width,
            height,
            pixels,
        };
        image.validate()?;
        Ok(image)
    }

    /// Fails unless `pixels` holds exactly `width * height` entries.
    pub fn validate(&self) -> Result<()> {
        let expected = pixel_count(self.width, self.height)?;
        if self.pixels.len() != expected {
            bail!(
                "Pixel count {} does not match {}x{} image",
                self.pixels.len(),
                self.width,
                self.height
            );
        }
        Ok(())
    }

    pub fn from_fn(width: u32, height: u32, f: impl Fn(u32, u32) -> Rgb) -> Self {
        let mut pixels = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn filled(width: u32, height: u32, color: Rgb) -> Self {
        Self::from_fn(width, height, |_, _| color)
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn get(&self, x: u32, y: u32) -> Rgb {
        self.pixels[y as usize * self.width as usize + x as usize]
    }

    /// Nearest-neighbour resize so the longer side is at most `max_dim`.
    /// Images already small enough are returned unchanged.
    pub fn downsample(&self, max_dim: u32) -> PixelBuffer {
        let longest = self.width.max(self.height);
        if longest <= max_dim || max_dim == 0 {
            return self.clone();
        }
        let scale = max_dim as f64 / longest as f64;
        let width = ((self.width as f64 * scale).round() as u32).max(1);
        let height = ((self.height as f64 * scale).round() as u32).max(1);
        PixelBuffer::from_fn(width, height, |x, y| {
            let src_x = (x as u64 * self.width as u64 / width as u64) as u32;
            let src_y = (y as u64 * self.height as u64 / height as u64) as u32;
            self.get(src_x, src_y)
        })
    }
}

/// Fetches and decodes the image behind an artwork's image reference.
pub trait ImageSource: Send + Sync {
    fn load(&self, image_ref: &str) -> Result<PixelBuffer>;
}

/// Reads binary PPM (P6) files from a media directory.
pub struct PpmImageSource {
    root: PathBuf,
}

impl PpmImageSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, image_ref: &str) -> Result<PathBuf> {
        let relative = Path::new(image_ref);
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            bail!("Image reference escapes media root: {}", image_ref);
        }
        Ok(self.root.join(relative))
    }
}

impl ImageSource for PpmImageSource {
    fn load(&self, image_ref: &str) -> Result<PixelBuffer> {
        let path = self.resolve(image_ref)?;
        let bytes =
            std::fs::read(&path).with_context(|| format!("Failed to read image {:?}", path))?;
        decode_ppm(&bytes).with_context(|| format!("Failed to decode image {:?}", path))
    }
}

fn pixel_count(width: u32, height: u32) -> Result<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .with_context(|| format!("Image dimensions {}x{} are too large", width, height))
}

/// Decodes a binary P6 image with a max value of at most 255.
pub fn decode_ppm(bytes: &[u8]) -> Result<PixelBuffer> {
    let mut pos = 0;
    let mut header = [0u32; 3];

    let magic = next_token(bytes, &mut pos).context("Missing PPM magic number")?;
    if magic != b"P6" {
        bail!("Unsupported PPM magic number");
    }
    for value in header.iter_mut() {
        let token = next_token(bytes, &mut pos).context("Truncated PPM header")?;
        *value = std::str::from_utf8(token)?
            .parse()
            .context("Invalid PPM header value")?;
    }
    let [width, height, max_value] = header;
    if max_value == 0 || max_value > 255 {
        bail!("Unsupported PPM max value {}", max_value);
    }
    // exactly one whitespace byte separates the header from the raster
    pos += 1;

    let expected = pixel_count(width, height)?
        .checked_mul(3)
        .context("PPM dimensions are too large")?;
    let end = pos
        .checked_add(expected)
        .context("PPM dimensions are too large")?;
    let raster = bytes
        .get(pos..end)
        .context("PPM raster is shorter than its header claims")?;
    let scale = |v: u8| ((v as u32 * 255) / max_value).min(255) as u8;
    let pixels = raster
        .chunks_exact(3)
        .map(|c| Rgb(scale(c[0]), scale(c[1]), scale(c[2])))
        .collect();
    PixelBuffer::new(width, height, pixels)
}

fn next_token<'a>(bytes: &'a [u8], pos: &mut usize) -> Option<&'a [u8]> {
    loop {
        while *pos < bytes.len() && bytes[*pos].is_ascii_whitespace() {
            *pos += 1;
        }
        if *pos < bytes.len() && bytes[*pos] == b'#' {
            while *pos < bytes.len() && bytes[*pos] != b'\n' {
                *pos += 1;
            }
            continue;
        }
        break;
    }
    let start = *pos;
    while *pos < bytes.len() && !bytes[*pos].is_ascii_whitespace() {
        *pos += 1;
    }
    (*pos > start).then(|| &bytes[start..*pos])
}

/// Encodes a buffer as binary P6.
pub fn encode_ppm(image: &PixelBuffer) -> Vec<u8> {
    let mut out = format!("P6\n{} {}\n255\n", image.width, image.height).into_bytes();
    out.reserve(image.pixels.len() * 3);
    for Rgb(r, g, b) in &image.pixels {
        out.extend_from_slice(&[*r, *g, *b]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn rejects_mismatched_pixel_count() {
        assert!(PixelBuffer::new(2, 2, vec![Rgb(0, 0, 0); 3]).is_err());
    }

    #[test]
    fn downsample_preserves_aspect() {
        let image = PixelBuffer::filled(800, 400, Rgb(1, 2, 3));
        let small = image.downsample(400);
        assert_eq!((small.width, small.height), (400, 200));
        assert_eq!(small.get(399, 199), Rgb(1, 2, 3));

        let tiny = PixelBuffer::filled(30, 20, Rgb(0, 0, 0));
        assert_eq!(tiny.downsample(400), tiny);
    }

    #[test]
    fn downsample_samples_nearest_pixel() {
        let image = PixelBuffer::from_fn(4, 2, |x, _| if x < 2 { Rgb(255, 0, 0) } else { Rgb(0, 0, 255) });
        let small = image.downsample(2);
        assert_eq!(small.width, 2);
        assert_eq!(small.get(0, 0), Rgb(255, 0, 0));
        assert_eq!(small.get(1, 0), Rgb(0, 0, 255));
    }

    #[test]
    fn ppm_source_reads_files_under_root() {
        let dir = TempDir::new().unwrap();
        let image = PixelBuffer::from_fn(3, 2, |x, y| Rgb(x as u8 * 10, y as u8 * 20, 7));
        let mut bytes = b"P6\n# made by a test\n".to_vec();
        bytes.extend_from_slice(&encode_ppm(&image)[3..]);
        std::fs::write(dir.path().join("a.ppm"), &bytes).unwrap();

        let source = PpmImageSource::new(dir.path());
        assert_eq!(source.load("a.ppm").unwrap(), image);
        assert!(source.load("missing.ppm").is_err());
        assert!(source.load("../a.ppm").is_err());
    }

    #[test]
    fn decode_rejects_truncated_raster() {
        let mut bytes = b"P6 2 2 255\n".to_vec();
        bytes.extend_from_slice(&[0; 5]);
        assert!(decode_ppm(&bytes).is_err());
        assert!(decode_ppm(b"P3 1 1 255\n000").is_err());
    }

    #[test]
    fn decode_rejects_oversized_header() {
        assert!(decode_ppm(b"P6 4294967295 4294967295 255\n").is_err());
        assert!(decode_ppm(b"P6 4294967295 1 255\n\x00\x00\x00").is_err());
    }
}

//! Bitmap inputs: the rendered preview snapshot and the header logo
//!
//! Both are loaded synchronously. Loading the logo is the readiness gate for
//! an export: nothing is drawn until it has decoded successfully.

use std::path::{Path, PathBuf};

use image::RgbaImage;
use tracing::debug;

use crate::error::{Error, Result};

/// Decoded 8-bit RGB pixels with an optional 8-bit alpha plane
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    /// Row-major RGB triples
    pub rgb: Vec<u8>,
    /// Row-major alpha, present only when some pixel is not fully opaque
    pub alpha: Option<Vec<u8>>,
}

impl RasterImage {
    /// Split RGBA pixels into colour and alpha planes
    pub fn from_rgba(pixels: &RgbaImage) -> Self {
        let (width, height) = pixels.dimensions();
        let count = (width as usize) * (height as usize);
        let mut rgb = Vec::with_capacity(count * 3);
        let mut alpha = Vec::with_capacity(count);
        let mut translucent = false;

        for pixel in pixels.pixels() {
            let [r, g, b, a] = pixel.0;
            if a != 255 {
                translucent = true;
            }
            rgb.extend_from_slice(&[r, g, b]);
            alpha.push(a);
        }

        Self {
            width,
            height,
            rgb,
            alpha: translucent.then_some(alpha),
        }
    }
}

/// Composite one RGBA pixel onto a white background
fn over_white([r, g, b, a]: [u8; 4]) -> [u8; 3] {
    let a = a as u32;
    let blend = |c: u8| ((c as u32 * a + 255 * (255 - a) + 127) / 255) as u8;
    [blend(r), blend(g), blend(b)]
}

/// The rendered snapshot of the document to paginate
///
/// Immutable once captured.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pixels: RgbaImage,
}

impl SourceImage {
    pub fn from_rgba(pixels: RgbaImage) -> Self {
        Self { pixels }
    }

    /// Decode a PNG or JPEG snapshot from disk
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::asset(path, "file not found"));
        }
        let decoded = image::open(path).map_err(|e| Error::asset(path, e))?;
        let pixels = decoded.to_rgba8();
        debug!(
            path = %path.display(),
            width = pixels.width(),
            height = pixels.height(),
            "decoded preview snapshot"
        );
        Ok(Self { pixels })
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Copy rows `[row_start, row_end)` at full width, flattened onto white
    ///
    /// The band has exactly `row_end - row_start` rows; rows past the bottom
    /// of the image are never padded in.
    pub fn band(&self, row_start: u32, row_end: u32) -> Result<RasterImage> {
        if row_start >= row_end || row_end > self.height() {
            return Err(Error::InvalidImage(format!(
                "band rows {}..{} outside image of height {}",
                row_start,
                row_end,
                self.height()
            )));
        }

        let stride = self.width() as usize * 4;
        let raw = self.pixels.as_raw();
        let slice = &raw[row_start as usize * stride..row_end as usize * stride];

        let mut rgb = Vec::with_capacity(slice.len() / 4 * 3);
        for px in slice.chunks_exact(4) {
            rgb.extend_from_slice(&over_white([px[0], px[1], px[2], px[3]]));
        }

        Ok(RasterImage {
            width: self.width(),
            height: row_end - row_start,
            rgb,
            alpha: None,
        })
    }
}

/// Header logo, decoded and ready to embed
#[derive(Debug, Clone)]
pub struct LogoAsset {
    source: PathBuf,
    image: RasterImage,
}

impl LogoAsset {
    /// Load the logo from disk, blocking until it is decoded
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::asset(path, "file not found"));
        }
        let bytes = std::fs::read(path).map_err(|e| Error::asset(path, e))?;
        Self::decode(path.to_path_buf(), &bytes)
    }

    /// Decode a logo already held in memory
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::decode(PathBuf::from("<memory>"), bytes)
    }

    pub fn from_rgba(pixels: &RgbaImage) -> Result<Self> {
        Self::checked(PathBuf::from("<memory>"), RasterImage::from_rgba(pixels))
    }

    fn decode(source: PathBuf, bytes: &[u8]) -> Result<Self> {
        let decoded = image::load_from_memory(bytes).map_err(|e| Error::asset(&source, e))?;
        Self::checked(source, RasterImage::from_rgba(&decoded.to_rgba8()))
    }

    fn checked(source: PathBuf, image: RasterImage) -> Result<Self> {
        if image.width == 0 || image.height == 0 {
            return Err(Error::asset(source, "logo has no pixels"));
        }
        debug!(
            source = %source.display(),
            width = image.width,
            height = image.height,
            alpha = image.alpha.is_some(),
            "logo ready"
        );
        Ok(Self { source, image })
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn image(&self) -> &RasterImage {
        &self.image
    }

    /// Height divided by width
    pub fn aspect_ratio(&self) -> f64 {
        self.image.height as f64 / self.image.width as f64
    }
}

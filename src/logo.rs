//! Decoding and validation of the optional logo shared by a batch.

use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use image::{DynamicImage, GenericImageView, RgbImage};
use log::warn;

use crate::error::LogoError;

/// Resolution assumed when the logo is drawn at its natural size.
pub const DEFAULT_IMAGE_DPI: f64 = 300.0;
const MM_PER_INCH: f64 = 25.4;

/// A decoded raster logo.
///
/// Cloning is cheap: the encoded bytes and the decoded pixels are shared, so
/// one asset can be handed to every document of a batch.
#[derive(Clone)]
pub struct LogoAsset {
    bytes: Arc<[u8]>,
    pixels: Arc<RgbImage>,
}

impl LogoAsset {
    /// Decodes `bytes` with the [`image`] crate.
    ///
    /// Transparency is flattened since the PDF writer only embeds RGB data.
    pub fn from_bytes(bytes: impl AsRef<[u8]>) -> Result<Self, LogoError> {
        let bytes = bytes.as_ref();
        if bytes.is_empty() {
            return Err(LogoError::Empty);
        }
        let decoded = image::load_from_memory(bytes).map_err(LogoError::Decode)?;
        let (width, height) = decoded.dimensions();
        if width == 0 || height == 0 {
            return Err(LogoError::Degenerate { width, height });
        }
        Ok(Self {
            bytes: Arc::from(bytes),
            pixels: Arc::new(decoded.to_rgb8()),
        })
    }

    /// Reads and decodes the image stored at `path`.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LogoError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| LogoError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bytes(bytes)
    }

    /// Loads the logo at `path`, logging and returning `None` when it is unusable.
    pub fn load_or_skip(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();
        match Self::from_path(path) {
            Ok(logo) => Some(logo),
            Err(err) => {
                warn!(
                    "Logo {} unusable ({}); rendering without logo.",
                    path.display(),
                    err
                );
                None
            }
        }
    }

    /// Decoded dimensions in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    /// The original encoded bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Pixel data ready for embedding.
    pub fn to_dynamic_image(&self) -> DynamicImage {
        DynamicImage::ImageRgb8(self.pixels.as_ref().clone())
    }

    /// Size in millimetres when printed at [`DEFAULT_IMAGE_DPI`].
    pub fn natural_size_mm(&self) -> (f64, f64) {
        let (width, height) = self.dimensions();
        (
            MM_PER_INCH * f64::from(width) / DEFAULT_IMAGE_DPI,
            MM_PER_INCH * f64::from(height) / DEFAULT_IMAGE_DPI,
        )
    }

    /// Height that keeps the aspect ratio at the given rendered width.
    pub fn height_for_width(&self, width_mm: f64) -> f64 {
        let (width, height) = self.dimensions();
        width_mm * f64::from(height) / f64::from(width)
    }
}

impl PartialEq for LogoAsset {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.bytes, &other.bytes) || self.bytes == other.bytes
    }
}

impl fmt::Debug for LogoAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (width, height) = self.dimensions();
        f.debug_struct("LogoAsset")
            .field("bytes", &self.bytes.len())
            .field("width", &width)
            .field("height", &height)
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::io::Cursor;

    use image::{DynamicImage, ImageBuffer, ImageOutputFormat, Rgba};

    use super::LogoAsset;
    use crate::error::LogoError;

    /// Encodes a small two-tone RGBA PNG.
    pub(crate) fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let buffer = ImageBuffer::from_fn(width, height, |x, _| {
            if x % 2 == 0 {
                Rgba([20u8, 80, 160, 255])
            } else {
                Rgba([255u8, 255, 255, 0])
            }
        });
        let mut bytes = Vec::new();
        DynamicImage::ImageRgba8(buffer)
            .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)
            .expect("encode png");
        bytes
    }

    #[test]
    fn decodes_png_and_keeps_aspect_ratio() {
        let logo = LogoAsset::from_bytes(png_bytes(40, 20)).expect("valid logo");
        assert_eq!(logo.dimensions(), (40, 20));
        assert!((logo.height_for_width(30.0) - 15.0).abs() < 1e-9);
    }

    #[test]
    fn rejects_garbage_and_empty_input() {
        assert!(matches!(
            LogoAsset::from_bytes(b"definitely not an image"),
            Err(LogoError::Decode(_))
        ));
        assert!(matches!(LogoAsset::from_bytes(Vec::<u8>::new()), Err(LogoError::Empty)));
    }

    #[test]
    fn missing_file_is_skipped() {
        assert!(LogoAsset::load_or_skip("/nonexistent/logo.png").is_none());
    }
}

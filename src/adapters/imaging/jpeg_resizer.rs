//! Implements ImageProcessor with Lanczos3 resampling and JPEG output.

use crate::domain::DomainError;
use crate::ports::ImageProcessor;
use crate::shared::config::DEFAULT_JPEG_QUALITY;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::debug;

pub struct JpegResizer {
    quality: u8,
}

impl JpegResizer {
    pub fn new(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
        }
    }

    /// Decode by content, not extension: cached covers are all named `.jpg`
    /// but BGG serves PNG and GIF covers too.
    fn open(path: &Path) -> Result<ImageReader<std::io::BufReader<File>>, DomainError> {
        ImageReader::open(path)
            .and_then(|r| r.with_guessed_format())
            .map_err(|e| DomainError::Image(format!("open {}: {}", path.display(), e)))
    }
}

impl Default for JpegResizer {
    fn default() -> Self {
        Self::new(DEFAULT_JPEG_QUALITY)
    }
}

impl ImageProcessor for JpegResizer {
    fn dimensions(&self, path: &Path) -> Result<(u32, u32), DomainError> {
        Self::open(path)?
            .into_dimensions()
            .map_err(|e| DomainError::Image(format!("read size of {}: {}", path.display(), e)))
    }

    fn resize(&self, src: &Path, dest: &Path, width: u32, height: u32) -> Result<(), DomainError> {
        let img = Self::open(src)?
            .decode()
            .map_err(|e| DomainError::Image(format!("decode {}: {}", src.display(), e)))?;
        let resized = img.resize_exact(width, height, FilterType::Lanczos3);
        // JPEG has no alpha channel.
        let rgb = DynamicImage::ImageRgb8(resized.to_rgb8());

        let out = File::create(dest)
            .map_err(|e| DomainError::Image(format!("create {}: {}", dest.display(), e)))?;
        let encoder = JpegEncoder::new_with_quality(BufWriter::new(out), self.quality);
        rgb.write_with_encoder(encoder)
            .map_err(|e| DomainError::Image(format!("encode {}: {}", dest.display(), e)))?;
        debug!(src = %src.display(), dest = %dest.display(), width, height, "resized");
        Ok(())
    }
}

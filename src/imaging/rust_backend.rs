//! Pure Rust image backend on top of the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | `ImageReader::with_guessed_format` + `into_dimensions` (header only) |
//! | Decode (JPEG, PNG) | `ImageReader::decode` |
//! | Drop alpha | `DynamicImage::to_rgb8` |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder::new_with_quality` |
//!
//! Formats are sniffed from file content rather than trusted from the
//! extension: artwork extracted from audio tags is written to `cover.jpg`
//! byte-for-byte and is sometimes a PNG payload.

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::params::ConvertParams;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageEncoder, ImageReader};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Production backend. See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn unreadable(path: &Path, e: impl std::fmt::Display) -> BackendError {
    BackendError::UnreadableImage {
        path: path.to_path_buf(),
        reason: e.to_string(),
    }
}

fn open_reader(path: &Path) -> Result<ImageReader<std::io::BufReader<File>>, BackendError> {
    ImageReader::open(path)?
        .with_guessed_format()
        .map_err(BackendError::Io)
}

/// Load and decode an image from disk.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    open_reader(path)?.decode().map_err(|e| unreadable(path, e))
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let (width, height) = open_reader(path)?
            .into_dimensions()
            .map_err(|e| unreadable(path, e))?;
        Ok(Dimensions { width, height })
    }

    fn convert_to_jpeg(&self, params: &ConvertParams) -> Result<(), BackendError> {
        let rgb = load_image(&params.source)?.to_rgb8();

        let file = File::create(&params.output)?;
        let writer = BufWriter::new(file);
        JpegEncoder::new_with_quality(writer, params.quality.value())
            .write_image(
                rgb.as_raw(),
                rgb.width(),
                rgb.height(),
                image::ExtendedColorType::Rgb8,
            )
            .map_err(|e| BackendError::EncodeFailed {
                path: params.output.clone(),
                reason: e.to_string(),
            })
    }
}

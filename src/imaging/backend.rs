//! Image backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the two operations cover reconciliation
//! needs from an image codec: identify (read dimensions) and convert to JPEG.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image` crate.

use super::params::ConvertParams;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unreadable image {path}: {reason}")]
    UnreadableImage { path: PathBuf, reason: String },
    #[error("JPEG encoding failed for {path}: {reason}")]
    EncodeFailed { path: PathBuf, reason: String },
}

/// Pixel size of a decoded image.
///
/// Ordering is lexicographic over `(width, height)`: a wider image is always
/// larger, and height only breaks ties between equal widths. Field order
/// matters for the derived `Ord`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Trait for image codecs.
pub trait ImageBackend {
    /// Get image dimensions. Fails with [`BackendError::UnreadableImage`] when
    /// the file is not a decodable image.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Decode the source, drop any alpha channel, and write a JPEG.
    fn convert_to_jpeg(&self, params: &ConvertParams) -> Result<(), BackendError>;
}

//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. The reconciler
//! builds them and hands them to an [`ImageBackend`](super::backend::ImageBackend),
//! which does the pixel work. Swapping the backend for a mock leaves the
//! decision logic untouched.
//!
//! - [`Quality`]: JPEG encoding quality (1–100, default 90). Clamped on construction.
//! - [`ConvertParams`]: source image, JPEG destination, quality.

use std::path::PathBuf;

/// Quality setting for JPEG encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u8);

impl Quality {
    pub fn new(value: u8) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

/// Re-encode `source` as a three-channel JPEG at `output`.
///
/// `output` may already exist; it is overwritten.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertParams {
    pub source: PathBuf,
    pub output: PathBuf,
    pub quality: Quality,
}

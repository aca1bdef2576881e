//! Embedded artwork access for the two supported audio containers.
//!
//! | Format | Container | Crate |
//! |---|---|---|
//! | MP3 | ID3v2 `APIC` (v2.3/2.4) and `PIC` (v2.2) frames | `id3` |
//! | FLAC | `METADATA_BLOCK_PICTURE` blocks | `lofty` |
//!
//! The format is resolved once from the file extension ([`AudioFormat::from_path`])
//! and every operation dispatches through [`TagBackend`]. Callers above this
//! module only see the [`ArtworkBackend`] trait, which the reconciler tests
//! replace with an in-memory fixture.

mod flac;
mod mp3;

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ArtworkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unreadable audio file {path}: {reason}")]
    UnreadableAudioFile { path: PathBuf, reason: String },
    #[error("Failed to write tags to {path}: {reason}")]
    WriteFailed { path: PathBuf, reason: String },
    #[error("Not a supported audio file: {0}")]
    Unsupported(PathBuf),
}

/// Audio container formats that can carry cover art.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioFormat {
    Flac,
    Mp3,
}

impl AudioFormat {
    /// Classify by extension, case-insensitively. `None` for anything that
    /// is not a recognized music file.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        if ext.eq_ignore_ascii_case("flac") {
            Some(Self::Flac)
        } else if ext.eq_ignore_ascii_case("mp3") {
            Some(Self::Mp3)
        } else {
            None
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Flac => "FLAC",
            Self::Mp3 => "MP3",
        }
    }
}

/// Read/extract/strip capability over embedded pictures.
pub trait ArtworkBackend {
    /// True iff the file's tag container holds at least one picture.
    fn has_embedded_picture(&self, path: &Path) -> Result<bool, ArtworkError>;

    /// Raw bytes of the first picture in container order, `None` if there is none.
    fn extract_first_picture(&self, path: &Path) -> Result<Option<Vec<u8>>, ArtworkError>;

    /// Delete every picture and persist the file. Succeeds when there was
    /// nothing to delete.
    fn remove_all_pictures(&self, path: &Path) -> Result<(), ArtworkError>;
}

/// Production backend: `id3` for MP3, `lofty` for FLAC.
#[derive(Debug, Default)]
pub struct TagBackend;

impl TagBackend {
    pub fn new() -> Self {
        Self
    }
}

fn format_of(path: &Path) -> Result<AudioFormat, ArtworkError> {
    AudioFormat::from_path(path).ok_or_else(|| ArtworkError::Unsupported(path.to_path_buf()))
}

impl ArtworkBackend for TagBackend {
    fn has_embedded_picture(&self, path: &Path) -> Result<bool, ArtworkError> {
        match format_of(path)? {
            AudioFormat::Flac => flac::has_picture(path),
            AudioFormat::Mp3 => mp3::has_picture(path),
        }
    }

    fn extract_first_picture(&self, path: &Path) -> Result<Option<Vec<u8>>, ArtworkError> {
        match format_of(path)? {
            AudioFormat::Flac => flac::first_picture(path),
            AudioFormat::Mp3 => mp3::first_picture(path),
        }
    }

    fn remove_all_pictures(&self, path: &Path) -> Result<(), ArtworkError> {
        let format = format_of(path)?;
        debug!(path = %path.display(), format = format.name(), "rewriting tags without pictures");
        match format {
            AudioFormat::Flac => flac::remove_pictures(path),
            AudioFormat::Mp3 => mp3::remove_pictures(path),
        }
    }
}

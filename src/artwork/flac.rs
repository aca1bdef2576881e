//! FLAC artwork through picture metadata blocks.
//!
//! lofty folds `METADATA_BLOCK_PICTURE` blocks into the Vorbis comments tag
//! on read and writes the tag's pictures back as picture blocks, so the
//! generic [`Tag`](lofty::tag::Tag) picture list is the whole story.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use lofty::config::{ParseOptions, ParsingMode, WriteOptions};
use lofty::file::{FileType, TaggedFile};
use lofty::prelude::*;
use lofty::probe::Probe;
use lofty::tag::TagType;

use super::ArtworkError;

fn parse_options() -> ParseOptions {
    ParseOptions::new()
        .read_cover_art(true)
        .parsing_mode(ParsingMode::BestAttempt)
}

fn unreadable(path: &Path, reason: impl std::fmt::Display) -> ArtworkError {
    ArtworkError::UnreadableAudioFile {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

/// Open and parse, sniffing the container from content.
fn read_flac(path: &Path) -> Result<TaggedFile, ArtworkError> {
    let file = File::open(path)?;
    let tagged_file = Probe::new(BufReader::new(file))
        .guess_file_type()?
        .options(parse_options())
        .read()
        .map_err(|e| unreadable(path, e))?;

    if tagged_file.file_type() != FileType::Flac {
        return Err(unreadable(path, "not a FLAC stream"));
    }
    Ok(tagged_file)
}

pub(super) fn has_picture(path: &Path) -> Result<bool, ArtworkError> {
    let tagged_file = read_flac(path)?;
    Ok(tagged_file
        .tag(TagType::VorbisComments)
        .is_some_and(|tag| !tag.pictures().is_empty()))
}

pub(super) fn first_picture(path: &Path) -> Result<Option<Vec<u8>>, ArtworkError> {
    let tagged_file = read_flac(path)?;
    Ok(tagged_file
        .tag(TagType::VorbisComments)
        .and_then(|tag| tag.pictures().first())
        .map(|picture| picture.data().to_vec()))
}

pub(super) fn remove_pictures(path: &Path) -> Result<(), ArtworkError> {
    let mut tagged_file = read_flac(path)?;
    let Some(tag) = tagged_file.tag_mut(TagType::VorbisComments) else {
        return Ok(());
    };
    if tag.pictures().is_empty() {
        return Ok(());
    }

    while let Some(pic_type) = tag.pictures().first().map(|p| p.pic_type()) {
        tag.remove_picture_type(pic_type);
    }

    tag.save_to_path(path, WriteOptions::default())
        .map_err(|e| ArtworkError::WriteFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}

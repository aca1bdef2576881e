//! MP3 artwork through ID3v2 picture frames.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use id3::{ErrorKind, Tag, TagLike, Version};
use lofty::file::FileType;
use lofty::probe::Probe;

use super::ArtworkError;

/// True when the content starts like an MPEG audio stream.
fn is_mpeg_stream(path: &Path) -> Result<bool, ArtworkError> {
    let file = File::open(path)?;
    let probe = Probe::new(BufReader::new(file)).guess_file_type()?;
    Ok(probe.file_type() == Some(FileType::Mpeg))
}

/// Read the ID3v2 tag. An MPEG stream without any tag has no art; anything
/// else without a tag is not an MP3 at all.
fn read_tag(path: &Path) -> Result<Option<Tag>, ArtworkError> {
    match Tag::read_from_path(path) {
        Ok(tag) => Ok(Some(tag)),
        Err(e) if matches!(e.kind, ErrorKind::NoTag) => {
            if is_mpeg_stream(path)? {
                Ok(None)
            } else {
                Err(ArtworkError::UnreadableAudioFile {
                    path: path.to_path_buf(),
                    reason: "no ID3 tag and no MPEG frame sync".to_string(),
                })
            }
        }
        Err(e) => match e.kind {
            ErrorKind::Io(io) => Err(ArtworkError::Io(io)),
            _ => Err(ArtworkError::UnreadableAudioFile {
                path: path.to_path_buf(),
                reason: e.description.clone(),
            }),
        },
    }
}

pub(super) fn has_picture(path: &Path) -> Result<bool, ArtworkError> {
    Ok(read_tag(path)?.is_some_and(|tag| tag.pictures().next().is_some()))
}

pub(super) fn first_picture(path: &Path) -> Result<Option<Vec<u8>>, ArtworkError> {
    Ok(read_tag(path)?.and_then(|tag| tag.pictures().next().map(|p| p.data.clone())))
}

pub(super) fn remove_pictures(path: &Path) -> Result<(), ArtworkError> {
    let Some(mut tag) = read_tag(path)? else {
        return Ok(());
    };

    tag.remove_all_pictures();

    // id3 only writes v2.3 and v2.4
    let version = match tag.version() {
        Version::Id3v22 => Version::Id3v24,
        v => v,
    };
    tag.write_to_path(path, version)
        .map_err(|e| ArtworkError::WriteFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}

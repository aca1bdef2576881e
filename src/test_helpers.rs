//! Shared test utilities.
//!
//! Two kinds of fixtures:
//!
//! - **Real files** ([`write_jpeg`], [`write_png`], [`write_mp3_with_pictures`],
//!   [`write_flac`]) for backend tests that go through `image`, `id3` and
//!   `lofty`.
//! - **[`MemoryLibrary`]**, an in-memory folder tree that implements all three
//!   capability traits, so reconciliation logic runs without touching disk and
//!   every call is recorded for assertions.
//!
//! # Usage
//!
//! ```ignore
//! use crate::test_helpers::*;
//!
//! let lib = MemoryLibrary::new()
//!     .with_image("/m/a/folder.jpg", 500, 500)
//!     .with_audio("/m/a/01.mp3", &["art"]);
//!
//! Reconciler::new(&lib, &lib, &lib, ReconcileOptions::default())
//!     .reconcile_folder(Path::new("/m/a"))
//!     .unwrap();
//!
//! assert_eq!(lib.names("/m/a"), vec!["01.mp3", "cover.jpg"]);
//! assert_eq!(lib.pictures(Path::new("/m/a/01.mp3")), 0);
//! ```

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::io::{Error as IoError, ErrorKind};
use std::path::{Path, PathBuf};

use image::{ImageEncoder, RgbImage, RgbaImage};

use crate::artwork::{ArtworkBackend, ArtworkError};
use crate::imaging::{BackendError, ConvertParams, Dimensions, ImageBackend};
use crate::store::{DirEntryInfo, FileStore, StoreError};

// =========================================================================
// Real-file fixtures
// =========================================================================

/// Write a small valid JPEG with the given dimensions.
pub fn write_jpeg(path: &Path, width: u32, height: u32) {
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let file = std::fs::File::create(path).unwrap();
    let writer = std::io::BufWriter::new(file);
    image::codecs::jpeg::JpegEncoder::new(writer)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
}

/// Write a PNG with an alpha channel, whatever the extension of `path`.
pub fn write_png(path: &Path, width: u32, height: u32) {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        image::Rgba([(x % 256) as u8, 64, (y % 256) as u8, 200])
    });
    img.save_with_format(path, image::ImageFormat::Png).unwrap();
}

/// Write an MP3 without any ID3 tag: a frame header and silence.
pub fn write_mp3(path: &Path) {
    let mut bytes = vec![0xFF, 0xFB, 0x90, 0x00];
    bytes.resize(417, 0);
    std::fs::write(path, bytes).unwrap();
}

/// Write an MP3 whose ID3v2.4 tag holds a title and one APIC frame per
/// payload, in order.
pub fn write_mp3_with_pictures(path: &Path, pictures: &[&str]) {
    use id3::frame::{Picture, PictureType};
    use id3::{Tag, TagLike, Version};

    write_mp3(path);
    let mut tag = Tag::new();
    tag.set_title("Fixture");
    for (i, data) in pictures.iter().enumerate() {
        tag.add_frame(Picture {
            mime_type: "image/jpeg".to_string(),
            picture_type: if i == 0 {
                PictureType::CoverFront
            } else {
                PictureType::Other
            },
            description: format!("picture {i}"),
            data: data.as_bytes().to_vec(),
        });
    }
    tag.write_to_path(path, Version::Id3v24).unwrap();
}

fn flac_block(out: &mut Vec<u8>, block_type: u8, last: bool, body: &[u8]) {
    out.push(if last { 0x80 | block_type } else { block_type });
    out.extend_from_slice(&(body.len() as u32).to_be_bytes()[1..]);
    out.extend_from_slice(body);
}

/// Write a FLAC file made of metadata blocks only: STREAMINFO, a
/// VORBIS_COMMENT block when `comments` is non-empty, then one PICTURE block
/// per payload, in order.
pub fn write_flac(path: &Path, comments: &[(&str, &str)], pictures: &[&str]) {
    let mut streaminfo = Vec::with_capacity(34);
    streaminfo.extend_from_slice(&4096u16.to_be_bytes()); // min block size
    streaminfo.extend_from_slice(&4096u16.to_be_bytes()); // max block size
    streaminfo.extend_from_slice(&[0; 6]); // frame sizes unknown
    // 44.1 kHz, 2 channels, 16 bits, sample count unknown
    streaminfo.extend_from_slice(&[0x0A, 0xC4, 0x42, 0xF0, 0, 0, 0, 0]);
    streaminfo.extend_from_slice(&[0; 16]); // MD5

    let mut blocks: Vec<(u8, Vec<u8>)> = vec![(0, streaminfo)];

    if !comments.is_empty() {
        let vendor = b"album-art-tidy fixture";
        let mut body = Vec::new();
        body.extend_from_slice(&(vendor.len() as u32).to_le_bytes());
        body.extend_from_slice(vendor);
        body.extend_from_slice(&(comments.len() as u32).to_le_bytes());
        for (key, value) in comments {
            let field = format!("{key}={value}");
            body.extend_from_slice(&(field.len() as u32).to_le_bytes());
            body.extend_from_slice(field.as_bytes());
        }
        blocks.push((4, body));
    }

    for (i, data) in pictures.iter().enumerate() {
        let mime = b"image/jpeg";
        let description = format!("picture {i}");
        // front cover first, "other" after
        let picture_type: u32 = if i == 0 { 3 } else { 0 };
        let mut body = Vec::new();
        body.extend_from_slice(&picture_type.to_be_bytes());
        body.extend_from_slice(&(mime.len() as u32).to_be_bytes());
        body.extend_from_slice(mime);
        body.extend_from_slice(&(description.len() as u32).to_be_bytes());
        body.extend_from_slice(description.as_bytes());
        body.extend_from_slice(&[0; 16]); // width, height, depth, colors
        body.extend_from_slice(&(data.len() as u32).to_be_bytes());
        body.extend_from_slice(data.as_bytes());
        blocks.push((6, body));
    }

    let mut bytes = b"fLaC".to_vec();
    let count = blocks.len();
    for (i, (block_type, body)) in blocks.iter().enumerate() {
        flac_block(&mut bytes, *block_type, i + 1 == count, body);
    }
    std::fs::write(path, bytes).unwrap();
}

// =========================================================================
// In-memory library
// =========================================================================

/// Contents of an in-memory file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemFile {
    Image { width: u32, height: u32 },
    Audio { pictures: Vec<Vec<u8>> },
    /// Opaque bytes, e.g. extracted artwork.
    Blob(Vec<u8>),
    /// Neither a decodable image nor a parseable audio file.
    Corrupt,
}

impl MemFile {
    pub fn image(width: u32, height: u32) -> Self {
        Self::Image { width, height }
    }
}

/// One recorded call into the library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    List(PathBuf),
    Identify(PathBuf),
    Convert {
        source: PathBuf,
        output: PathBuf,
        quality: u8,
    },
    Remove(PathBuf),
    Rename { from: PathBuf, to: PathBuf },
    WriteNew(PathBuf),
    HasPicture(PathBuf),
    Extract(PathBuf),
    Strip(PathBuf),
}

impl Op {
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Op::Convert { .. } | Op::Remove(_) | Op::Rename { .. } | Op::WriteNew(_) | Op::Strip(_)
        )
    }
}

#[derive(Debug, Default)]
pub struct MemoryLibrary {
    files: RefCell<BTreeMap<PathBuf, MemFile>>,
    dirs: RefCell<BTreeSet<PathBuf>>,
    ops: RefCell<Vec<Op>>,
}

fn not_found(path: &Path) -> IoError {
    IoError::new(ErrorKind::NotFound, path.display().to_string())
}

impl MemoryLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dir(self, dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        for ancestor in dir.ancestors() {
            self.dirs.borrow_mut().insert(ancestor.to_path_buf());
        }
        self
    }

    pub fn with_file(self, path: impl Into<PathBuf>, file: MemFile) -> Self {
        let path = path.into();
        let lib = match path.parent() {
            Some(parent) => self.with_dir(parent),
            None => self,
        };
        lib.files.borrow_mut().insert(path, file);
        lib
    }

    pub fn with_image(self, path: impl Into<PathBuf>, width: u32, height: u32) -> Self {
        self.with_file(path, MemFile::image(width, height))
    }

    pub fn with_audio(self, path: impl Into<PathBuf>, pictures: &[&str]) -> Self {
        let pictures = pictures.iter().map(|p| p.as_bytes().to_vec()).collect();
        self.with_file(path, MemFile::Audio { pictures })
    }

    pub fn get(&self, path: &Path) -> Option<MemFile> {
        self.files.borrow().get(path).cloned()
    }

    /// Names of the files directly inside `dir`, sorted.
    pub fn names(&self, dir: impl AsRef<Path>) -> Vec<String> {
        let dir = dir.as_ref();
        self.files
            .borrow()
            .keys()
            .filter(|p| p.parent() == Some(dir))
            .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            .collect()
    }

    /// Number of embedded pictures in an audio file. Panics if it is not one.
    pub fn pictures(&self, path: &Path) -> usize {
        match self.get(path) {
            Some(MemFile::Audio { pictures }) => pictures.len(),
            other => panic!("{} is not an audio file: {other:?}", path.display()),
        }
    }

    pub fn snapshot(&self) -> BTreeMap<PathBuf, MemFile> {
        self.files.borrow().clone()
    }

    pub fn operations(&self) -> Vec<Op> {
        self.ops.borrow().clone()
    }

    fn record(&self, op: Op) {
        self.ops.borrow_mut().push(op);
    }

    fn audio(&self, path: &Path) -> Result<Vec<Vec<u8>>, ArtworkError> {
        match self.get(path) {
            Some(MemFile::Audio { pictures }) => Ok(pictures),
            Some(_) => Err(ArtworkError::UnreadableAudioFile {
                path: path.to_path_buf(),
                reason: "corrupt fixture".to_string(),
            }),
            None => Err(ArtworkError::Io(not_found(path))),
        }
    }
}

impl FileStore for MemoryLibrary {
    fn list_entries(&self, dir: &Path) -> Result<Vec<DirEntryInfo>, StoreError> {
        self.record(Op::List(dir.to_path_buf()));
        if !self.dirs.borrow().contains(dir) {
            return Err(StoreError::List {
                path: dir.to_path_buf(),
                source: not_found(dir),
            });
        }

        let entry = |path: &PathBuf, is_dir: bool| DirEntryInfo {
            name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            path: path.clone(),
            is_file: !is_dir,
            is_dir,
        };

        let mut entries: Vec<DirEntryInfo> = self
            .files
            .borrow()
            .keys()
            .filter(|p| p.parent() == Some(dir))
            .map(|p| entry(p, false))
            .chain(
                self.dirs
                    .borrow()
                    .iter()
                    .filter(|p| p.parent() == Some(dir))
                    .map(|p| entry(p, true)),
            )
            .collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn remove_file(&self, path: &Path) -> Result<(), StoreError> {
        self.record(Op::Remove(path.to_path_buf()));
        match self.files.borrow_mut().remove(path) {
            Some(_) => Ok(()),
            None => Err(StoreError::Remove {
                path: path.to_path_buf(),
                source: not_found(path),
            }),
        }
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<(), StoreError> {
        self.record(Op::Rename {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
        });
        let mut files = self.files.borrow_mut();
        let file = files.remove(from).ok_or_else(|| StoreError::Rename {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            source: not_found(from),
        })?;
        files.insert(to.to_path_buf(), file);
        Ok(())
    }

    fn write_new(&self, path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
        self.record(Op::WriteNew(path.to_path_buf()));
        let mut files = self.files.borrow_mut();
        if files.contains_key(path) {
            return Err(StoreError::Write {
                path: path.to_path_buf(),
                source: IoError::new(ErrorKind::AlreadyExists, path.display().to_string()),
            });
        }
        files.insert(path.to_path_buf(), MemFile::Blob(bytes.to_vec()));
        Ok(())
    }
}

impl ImageBackend for MemoryLibrary {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        self.record(Op::Identify(path.to_path_buf()));
        match self.get(path) {
            Some(MemFile::Image { width, height }) => Ok(Dimensions { width, height }),
            Some(_) => Err(BackendError::UnreadableImage {
                path: path.to_path_buf(),
                reason: "not an image fixture".to_string(),
            }),
            None => Err(BackendError::Io(not_found(path))),
        }
    }

    fn convert_to_jpeg(&self, params: &ConvertParams) -> Result<(), BackendError> {
        self.record(Op::Convert {
            source: params.source.clone(),
            output: params.output.clone(),
            quality: params.quality.value(),
        });
        match self.get(&params.source) {
            Some(image @ MemFile::Image { .. }) => {
                self.files
                    .borrow_mut()
                    .insert(params.output.clone(), image);
                Ok(())
            }
            _ => Err(BackendError::UnreadableImage {
                path: params.source.clone(),
                reason: "not an image fixture".to_string(),
            }),
        }
    }
}

impl ArtworkBackend for MemoryLibrary {
    fn has_embedded_picture(&self, path: &Path) -> Result<bool, ArtworkError> {
        self.record(Op::HasPicture(path.to_path_buf()));
        Ok(!self.audio(path)?.is_empty())
    }

    fn extract_first_picture(&self, path: &Path) -> Result<Option<Vec<u8>>, ArtworkError> {
        self.record(Op::Extract(path.to_path_buf()));
        Ok(self.audio(path)?.into_iter().next())
    }

    fn remove_all_pictures(&self, path: &Path) -> Result<(), ArtworkError> {
        self.record(Op::Strip(path.to_path_buf()));
        self.audio(path)?;
        self.files.borrow_mut().insert(
            path.to_path_buf(),
            MemFile::Audio {
                pictures: Vec::new(),
            },
        );
        Ok(())
    }
}

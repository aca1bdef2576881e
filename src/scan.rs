//! Folder inventory: which cover candidates and music files a directory holds.
//!
//! Classification is by file name only, case-insensitively, never by content:
//!
//! | Name | Role |
//! |---|---|
//! | `cover.jpg` | canonical cover |
//! | `folder.jpg` | competing cover, folded into `cover.jpg` |
//! | `cover.png` | lower-priority cover, converted into `cover.jpg` |
//! | `*.flac`, `*.mp3` | music files that may carry embedded pictures |
//!
//! Only regular files count. Subdirectories and symlinks are ignored here;
//! the tree walker handles descent.
//!
//! If a case-sensitive filesystem holds two spellings of the same candidate
//! (`cover.jpg` and `Cover.JPG`), the first in name order is used and the
//! other is left alone.

use crate::artwork::AudioFormat;
use crate::store::{DirEntryInfo, FileStore, StoreError};
use std::path::{Path, PathBuf};

pub const COVER_JPG: &str = "cover.jpg";
pub const FOLDER_JPG: &str = "folder.jpg";
pub const COVER_PNG: &str = "cover.png";

/// Classification of one directory's direct children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderInventory {
    pub folder: PathBuf,
    pub cover_jpg: Option<PathBuf>,
    pub folder_jpg: Option<PathBuf>,
    pub cover_png: Option<PathBuf>,
    /// Music files in enumeration order; the first one with art wins extraction.
    pub music_files: Vec<PathBuf>,
}

impl FolderInventory {
    /// Where a newly created cover goes.
    pub fn new_cover_path(&self) -> PathBuf {
        self.folder.join(COVER_JPG)
    }

    /// True when there is nothing in the folder the reconciler could act on.
    pub fn is_empty(&self) -> bool {
        self.cover_jpg.is_none()
            && self.folder_jpg.is_none()
            && self.cover_png.is_none()
            && self.music_files.is_empty()
    }
}

fn set_once(slot: &mut Option<PathBuf>, path: &Path) {
    if slot.is_none() {
        *slot = Some(path.to_path_buf());
    }
}

/// Classify entries already listed from `folder`.
pub fn classify(folder: &Path, entries: &[DirEntryInfo]) -> FolderInventory {
    let mut inventory = FolderInventory {
        folder: folder.to_path_buf(),
        ..Default::default()
    };

    for entry in entries.iter().filter(|e| e.is_file) {
        let lower = entry.name.to_lowercase();
        match lower.as_str() {
            COVER_JPG => set_once(&mut inventory.cover_jpg, &entry.path),
            FOLDER_JPG => set_once(&mut inventory.folder_jpg, &entry.path),
            COVER_PNG => set_once(&mut inventory.cover_png, &entry.path),
            _ if AudioFormat::from_path(&entry.path).is_some() => {
                inventory.music_files.push(entry.path.clone())
            }
            _ => {}
        }
    }

    inventory
}

/// List `folder` through the store and classify its children.
pub fn scan_folder(store: &impl FileStore, folder: &Path) -> Result<FolderInventory, StoreError> {
    let entries = store.list_entries(folder)?;
    Ok(classify(folder, &entries))
}

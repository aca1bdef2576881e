//! Filesystem access for one folder: enumeration and the plain file
//! mutations the reconciler performs (remove, rename, write).
//!
//! [`FileStore`] is the seam that lets the decision logic run against an
//! in-memory library in tests; [`DiskStore`] is the production adapter over
//! `std::fs`.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to list {path}: {source}")]
    List {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to remove {path}: {source}")]
    Remove {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to move {from} to {to}: {source}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// One direct child of a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntryInfo {
    pub name: String,
    pub path: PathBuf,
    pub is_file: bool,
    pub is_dir: bool,
}

pub trait FileStore {
    /// Direct children of `dir`, sorted by name.
    fn list_entries(&self, dir: &Path) -> Result<Vec<DirEntryInfo>, StoreError>;

    fn remove_file(&self, path: &Path) -> Result<(), StoreError>;

    /// Move `from` to `to`, replacing `to` if it exists.
    fn rename(&self, from: &Path, to: &Path) -> Result<(), StoreError>;

    /// Create `path` with `bytes`. Fails if `path` already exists.
    fn write_new(&self, path: &Path, bytes: &[u8]) -> Result<(), StoreError>;
}

#[derive(Debug, Default)]
pub struct DiskStore;

impl DiskStore {
    pub fn new() -> Self {
        Self
    }
}

impl FileStore for DiskStore {
    fn list_entries(&self, dir: &Path) -> Result<Vec<DirEntryInfo>, StoreError> {
        let list_err = |source: std::io::Error| StoreError::List {
            path: dir.to_path_buf(),
            source,
        };

        let mut entries = Vec::new();
        for entry in fs::read_dir(dir).map_err(list_err)? {
            let entry = entry.map_err(list_err)?;
            // file_type() does not follow symlinks: a link is neither file nor dir here
            let file_type = entry.file_type().map_err(list_err)?;
            entries.push(DirEntryInfo {
                name: entry.file_name().to_string_lossy().into_owned(),
                path: entry.path(),
                is_file: file_type.is_file(),
                is_dir: file_type.is_dir(),
            });
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn remove_file(&self, path: &Path) -> Result<(), StoreError> {
        fs::remove_file(path).map_err(|source| StoreError::Remove {
            path: path.to_path_buf(),
            source,
        })
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<(), StoreError> {
        fs::rename(from, to).map_err(|source| StoreError::Rename {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            source,
        })
    }

    fn write_new(&self, path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
        let write_err = |source: std::io::Error| StoreError::Write {
            path: path.to_path_buf(),
            source,
        };
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(write_err)?;
        file.write_all(bytes).map_err(write_err)
    }
}

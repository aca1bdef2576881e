//! Recursive, pre-order traversal of a music tree.
//!
//! The root directory is reconciled first, then each subdirectory in name
//! order, depth first. A directory is reconciled before it is descended
//! into, so its own listing reflects the state after reconciliation.
//!
//! Only real directories are followed. Symbolic links are never descended,
//! which rules out cycles without keeping a visited set.
//!
//! ## Error policy
//!
//! By default the first failing folder stops the walk and its error is
//! returned. With `keep_going`, the failure is logged, reported as a
//! [`WalkEvent::FolderFailed`], counted in the [`WalkSummary`], and the walk
//! moves on to the next folder.

use crate::artwork::{ArtworkBackend, TagBackend};
use crate::config::RunConfig;
use crate::imaging::{ImageBackend, RustBackend};
use crate::reconcile::{FolderReport, ReconcileError, Reconciler};
use crate::store::{DiskStore, FileStore};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;
use tracing::{info, warn};
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum WalkError {
    #[error("Failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        source: walkdir::Error,
    },
    #[error("Failed to reconcile {folder}: {source}")]
    Folder {
        folder: PathBuf,
        source: ReconcileError,
    },
}

/// Per-folder progress, sent as each folder finishes.
#[derive(Debug)]
pub enum WalkEvent {
    Reconciled(FolderReport),
    /// `report` holds whatever was applied before the error.
    FolderFailed { report: FolderReport, error: String },
    /// A directory that could not be read at all.
    Unreadable { path: PathBuf, error: String },
}

/// Totals for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalkSummary {
    pub dry_run: bool,
    pub folders_visited: usize,
    pub folders_changed: usize,
    pub actions: usize,
    pub failures: Vec<PathBuf>,
}

impl WalkSummary {
    fn record(&mut self, report: &FolderReport) {
        self.folders_visited += 1;
        if report.changed() {
            self.folders_changed += 1;
            self.actions += report.actions.len();
        }
    }
}

/// Walk `config.root` with the production backends.
pub fn walk(config: &RunConfig, events: Option<Sender<WalkEvent>>) -> Result<WalkSummary, WalkError> {
    let images = RustBackend::new();
    let artwork = TagBackend::new();
    let files = DiskStore::new();
    let reconciler = Reconciler::new(&images, &artwork, &files, config.reconcile_options());
    walk_with(&reconciler, &config.root, config.keep_going, events)
}

fn send(events: &Option<Sender<WalkEvent>>, event: WalkEvent) {
    if let Some(tx) = events {
        // A closed receiver only means nobody is printing.
        let _ = tx.send(event);
    }
}

/// Walk `root` with any reconciler (allows testing with mock backends).
pub fn walk_with<I, A, F>(
    reconciler: &Reconciler<'_, I, A, F>,
    root: &Path,
    keep_going: bool,
    events: Option<Sender<WalkEvent>>,
) -> Result<WalkSummary, WalkError>
where
    I: ImageBackend,
    A: ArtworkBackend,
    F: FileStore,
{
    let mut summary = WalkSummary {
        dry_run: reconciler.is_dry_run(),
        ..Default::default()
    };

    let dirs = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.file_type().is_dir());

    for entry in dirs {
        let entry = match entry {
            Ok(entry) => entry,
            Err(source) => {
                let path = source.path().unwrap_or(root).to_path_buf();
                if !keep_going {
                    return Err(WalkError::Walk { path, source });
                }
                warn!(path = %path.display(), error = %source, "skipping unreadable directory");
                send(
                    &events,
                    WalkEvent::Unreadable {
                        path: path.clone(),
                        error: source.to_string(),
                    },
                );
                summary.failures.push(path);
                continue;
            }
        };

        let folder = entry.path();
        let mut report = FolderReport::new(folder, reconciler.is_dry_run());
        match reconciler.reconcile_folder_into(folder, &mut report) {
            Ok(()) => {
                summary.record(&report);
                send(&events, WalkEvent::Reconciled(report));
            }
            Err(source) if keep_going => {
                warn!(folder = %folder.display(), error = %source, "folder failed, continuing");
                summary.record(&report);
                summary.failures.push(folder.to_path_buf());
                send(
                    &events,
                    WalkEvent::FolderFailed {
                        report,
                        error: source.to_string(),
                    },
                );
            }
            Err(source) => {
                send(
                    &events,
                    WalkEvent::FolderFailed {
                        report,
                        error: source.to_string(),
                    },
                );
                return Err(WalkError::Folder {
                    folder: folder.to_path_buf(),
                    source,
                });
            }
        }
    }

    info!(
        visited = summary.folders_visited,
        changed = summary.folders_changed,
        actions = summary.actions,
        failed = summary.failures.len(),
        "walk finished"
    );
    Ok(summary)
}

//! Per-folder cover reconciliation.
//!
//! Given one folder's [`FolderInventory`], fold every cover candidate into a
//! single `cover.jpg` and drop embedded pictures that duplicate it. Steps run
//! in a fixed order:
//!
//! 1. **`cover.png`**: converted to JPEG (quality 90) when there is no
//!    `cover.jpg` or when it is strictly larger than the existing one, then
//!    deleted in every case.
//! 2. **`folder.jpg`**: renamed to `cover.jpg` when there is none; moved
//!    over `cover.jpg` when strictly larger; deleted otherwise.
//! 3. **Embedded art**: with a `cover.jpg` present, stripped from every
//!    music file that carries a picture. Without one, the first music file
//!    (enumeration order) with a picture has it extracted to `cover.jpg`,
//!    then every music file with a picture is stripped.
//!
//! "Larger" compares [`Dimensions`] lexicographically: width first, height
//! as the tie-break.
//!
//! One pass leaves the folder in a fixed point, so a second pass performs no
//! actions. Music files without pictures are never rewritten.
//!
//! ## Dry run
//!
//! Every mutation goes through [`Reconciler::perform`]. In dry-run mode the
//! [`Action`] is recorded but not applied, and the tracked cover state is not
//! advanced. Later steps therefore decide against the folder as it is on
//! disk, not as earlier steps would have left it: with `cover.png` and
//! `folder.jpg` but no `cover.jpg`, a dry run reports a rename of
//! `folder.jpg`, while a live run converts the PNG first and then compares
//! `folder.jpg` against the result.

use crate::artwork::{ArtworkBackend, ArtworkError};
use crate::config::ReconcileOptions;
use crate::imaging::{BackendError, ConvertParams, Dimensions, ImageBackend};
use crate::scan::{self, FolderInventory};
use crate::store::{FileStore, StoreError};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Image(#[from] BackendError),
    #[error(transparent)]
    Artwork(#[from] ArtworkError),
    #[error("Embedded picture disappeared from {0} before it could be extracted")]
    PictureVanished(PathBuf),
}

/// A single filesystem or tag mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Encode `from` (a PNG) as JPEG at `to`, creating or overwriting it.
    ConvertPng { from: PathBuf, to: PathBuf },
    RemoveFile { path: PathBuf },
    /// Move a larger `folder.jpg` over the existing `cover.jpg`.
    ReplaceCover { from: PathBuf, to: PathBuf },
    /// Rename `folder.jpg` into the empty `cover.jpg` slot.
    RenameToCover { from: PathBuf, to: PathBuf },
    /// Write the first embedded picture of `from` to a new `to`.
    ExtractArtwork { from: PathBuf, to: PathBuf },
    StripArtwork { path: PathBuf },
}

/// What happened (or would happen) in one folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderReport {
    pub folder: PathBuf,
    pub dry_run: bool,
    /// In order. Under dry run none of these were applied.
    pub actions: Vec<Action>,
}

impl FolderReport {
    pub fn new(folder: &Path, dry_run: bool) -> Self {
        Self {
            folder: folder.to_path_buf(),
            dry_run,
            actions: Vec::new(),
        }
    }

    pub fn changed(&self) -> bool {
        !self.actions.is_empty()
    }
}

/// Decision procedure wired to its three collaborators.
pub struct Reconciler<'a, I, A, F> {
    images: &'a I,
    artwork: &'a A,
    files: &'a F,
    options: ReconcileOptions,
}

impl<'a, I, A, F> Reconciler<'a, I, A, F>
where
    I: ImageBackend,
    A: ArtworkBackend,
    F: FileStore,
{
    pub fn new(images: &'a I, artwork: &'a A, files: &'a F, options: ReconcileOptions) -> Self {
        Self {
            images,
            artwork,
            files,
            options,
        }
    }

    pub fn is_dry_run(&self) -> bool {
        self.options.dry_run
    }

    /// List, classify and reconcile `folder`, returning the full report.
    pub fn reconcile_folder(&self, folder: &Path) -> Result<FolderReport, ReconcileError> {
        let mut report = FolderReport::new(folder, self.options.dry_run);
        self.reconcile_folder_into(folder, &mut report)?;
        Ok(report)
    }

    /// Like [`reconcile_folder`](Self::reconcile_folder), but actions are
    /// appended to `report` as they happen, so a caller still sees what was
    /// applied before a failure.
    pub fn reconcile_folder_into(
        &self,
        folder: &Path,
        report: &mut FolderReport,
    ) -> Result<(), ReconcileError> {
        let inventory = scan::scan_folder(self.files, folder)?;
        debug!(
            folder = %folder.display(),
            cover_jpg = inventory.cover_jpg.is_some(),
            folder_jpg = inventory.folder_jpg.is_some(),
            cover_png = inventory.cover_png.is_some(),
            music_files = inventory.music_files.len(),
            "scanned folder"
        );
        self.reconcile(&inventory, report)
    }

    /// Run the three steps over an already-built inventory.
    pub fn reconcile(
        &self,
        inventory: &FolderInventory,
        report: &mut FolderReport,
    ) -> Result<(), ReconcileError> {
        if inventory.is_empty() {
            return Ok(());
        }

        let mut cover = inventory.cover_jpg.clone();
        self.resolve_cover_png(inventory, &mut cover, report)?;
        self.resolve_folder_jpg(inventory, &mut cover, report)?;
        self.resolve_embedded(inventory, cover.as_deref(), report)
    }

    fn resolve_cover_png(
        &self,
        inventory: &FolderInventory,
        cover: &mut Option<PathBuf>,
        report: &mut FolderReport,
    ) -> Result<(), ReconcileError> {
        let Some(png) = &inventory.cover_png else {
            return Ok(());
        };

        match cover.clone() {
            Some(jpg) => {
                if self.is_strictly_larger(png, &jpg)? {
                    self.perform(
                        Action::ConvertPng {
                            from: png.clone(),
                            to: jpg,
                        },
                        report,
                    )?;
                }
            }
            None => {
                let to = inventory.new_cover_path();
                let applied = self.perform(
                    Action::ConvertPng {
                        from: png.clone(),
                        to: to.clone(),
                    },
                    report,
                )?;
                if applied {
                    *cover = Some(to);
                }
            }
        }

        self.perform(Action::RemoveFile { path: png.clone() }, report)?;
        Ok(())
    }

    fn resolve_folder_jpg(
        &self,
        inventory: &FolderInventory,
        cover: &mut Option<PathBuf>,
        report: &mut FolderReport,
    ) -> Result<(), ReconcileError> {
        let Some(folder_jpg) = &inventory.folder_jpg else {
            return Ok(());
        };

        match cover.clone() {
            Some(jpg) => {
                let action = if self.is_strictly_larger(folder_jpg, &jpg)? {
                    Action::ReplaceCover {
                        from: folder_jpg.clone(),
                        to: jpg,
                    }
                } else {
                    Action::RemoveFile {
                        path: folder_jpg.clone(),
                    }
                };
                self.perform(action, report)?;
            }
            None => {
                let to = inventory.new_cover_path();
                let applied = self.perform(
                    Action::RenameToCover {
                        from: folder_jpg.clone(),
                        to: to.clone(),
                    },
                    report,
                )?;
                if applied {
                    *cover = Some(to);
                }
            }
        }
        Ok(())
    }

    fn resolve_embedded(
        &self,
        inventory: &FolderInventory,
        cover: Option<&Path>,
        report: &mut FolderReport,
    ) -> Result<(), ReconcileError> {
        let music = &inventory.music_files;

        if cover.is_some() {
            return self.strip_all(music, report);
        }

        for (index, source) in music.iter().enumerate() {
            if !self.artwork.has_embedded_picture(source)? {
                continue;
            }
            self.perform(
                Action::ExtractArtwork {
                    from: source.clone(),
                    to: inventory.new_cover_path(),
                },
                report,
            )?;
            // Files before `index` were just checked and carry no picture.
            return self.strip_all(&music[index..], report);
        }

        debug!(folder = %inventory.folder.display(), "no cover art found");
        Ok(())
    }

    fn strip_all(&self, music: &[PathBuf], report: &mut FolderReport) -> Result<(), ReconcileError> {
        for path in music {
            if self.artwork.has_embedded_picture(path)? {
                self.perform(Action::StripArtwork { path: path.clone() }, report)?;
            }
        }
        Ok(())
    }

    fn is_strictly_larger(&self, candidate: &Path, cover: &Path) -> Result<bool, ReconcileError> {
        let candidate_dims: Dimensions = self.images.identify(candidate)?;
        let cover_dims: Dimensions = self.images.identify(cover)?;
        debug!(
            candidate = %candidate.display(),
            %candidate_dims,
            cover = %cover.display(),
            %cover_dims,
            "compared cover sizes"
        );
        Ok(candidate_dims > cover_dims)
    }

    /// Record `action` and, unless dry-running, apply it. Returns whether the
    /// filesystem was changed.
    fn perform(&self, action: Action, report: &mut FolderReport) -> Result<bool, ReconcileError> {
        if self.options.dry_run {
            debug!(?action, "dry run, not applied");
            report.actions.push(action);
            return Ok(false);
        }

        self.apply(&action)?;
        debug!(?action, "applied");
        report.actions.push(action);
        Ok(true)
    }

    fn apply(&self, action: &Action) -> Result<(), ReconcileError> {
        match action {
            Action::ConvertPng { from, to } => {
                self.images.convert_to_jpeg(&ConvertParams {
                    source: from.clone(),
                    output: to.clone(),
                    quality: self.options.quality,
                })?;
            }
            Action::RemoveFile { path } => self.files.remove_file(path)?,
            Action::ReplaceCover { from, to } | Action::RenameToCover { from, to } => {
                self.files.rename(from, to)?
            }
            Action::ExtractArtwork { from, to } => {
                let bytes = self
                    .artwork
                    .extract_first_picture(from)?
                    .ok_or_else(|| ReconcileError::PictureVanished(from.clone()))?;
                self.files.write_new(to, &bytes)?;
            }
            Action::StripArtwork { path } => self.artwork.remove_all_pictures(path)?,
        }
        Ok(())
    }
}

//! Run configuration.
//!
//! There is no config file and no environment lookup: every option comes from
//! the command line and is validated once before the walk starts.
//!
//! | Option | Default | Effect |
//! |---|---|---|
//! | `root` | required | Directory tree to process |
//! | `dry_run` | `false` | Report planned mutations, apply none |
//! | `keep_going` | `false` | Log a failing folder and continue instead of aborting |
//! | `quality` | `90` | JPEG quality for PNG conversion |

use crate::imaging::Quality;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Everything a run needs to know.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub root: PathBuf,
    pub dry_run: bool,
    /// Isolate failures per folder instead of stopping the walk.
    pub keep_going: bool,
    pub quality: Quality,
}

impl RunConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            dry_run: false,
            keep_going: false,
            quality: Quality::default(),
        }
    }

    /// The root must exist and be a directory.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let meta = std::fs::metadata(&self.root)?;
        if !meta.is_dir() {
            return Err(ConfigError::Validation(format!(
                "{} is not a directory",
                self.root.display()
            )));
        }
        Ok(())
    }

    pub fn reconcile_options(&self) -> ReconcileOptions {
        ReconcileOptions {
            dry_run: self.dry_run,
            quality: self.quality,
        }
    }
}

/// The subset of [`RunConfig`] the per-folder reconciler uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReconcileOptions {
    pub dry_run: bool,
    pub quality: Quality,
}

impl ReconcileOptions {
    pub fn dry_run() -> Self {
        Self {
            dry_run: true,
            ..Self::default()
        }
    }
}

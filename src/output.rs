//! CLI output formatting for the walk.
//!
//! # Folder-First Display
//!
//! Output is grouped by folder. Each folder that changed (or would change)
//! gets a header with its path relative to the walk root, followed by one
//! indented line per action naming files by their file name. Folders with
//! nothing to do print nothing, so a clean tree produces only the summary.
//!
//! # Output Format
//!
//! ## Dry run
//!
//! ```text
//! Artist/Album
//!     Would convert cover.png to cover.jpg
//!     Would remove cover.png
//!     Would remove embedded artwork from 01.mp3
//!
//! Dry run: 1 of 3 folders would change (3 actions)
//! ```
//!
//! ## Live
//!
//! ```text
//! Artist/Album
//!     Renamed folder.jpg to cover.jpg
//!     Removed embedded artwork from 01.mp3
//! Artist/Broken
//!     Failed: Unreadable image /music/Artist/Broken/cover.png: ...
//!
//! Changed 1 of 3 folders (2 actions), 1 failed
//! ```
//!
//! # Architecture
//!
//! Each event has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::reconcile::{Action, FolderReport};
use crate::walk::{WalkEvent, WalkSummary};
use std::path::Path;

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// File name of `path`, falling back to the whole path.
fn name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Folder path relative to the walk root. The root itself shows as `.`.
fn folder_label(folder: &Path, root: &Path) -> String {
    match folder.strip_prefix(root) {
        Ok(rel) if rel.as_os_str().is_empty() => ".".to_string(),
        Ok(rel) => rel.display().to_string(),
        Err(_) => folder.display().to_string(),
    }
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

// ============================================================================
// Actions
// ============================================================================

/// One action as a sentence: `Would ...` under dry run, past tense otherwise.
///
/// ```text
/// Would convert cover.png to cover.jpg
/// Converted cover.png to cover.jpg
/// ```
pub fn format_action(action: &Action, dry_run: bool) -> String {
    let (planned, done, detail) = match action {
        Action::ConvertPng { from, to } => (
            "Would convert",
            "Converted",
            format!("{} to {}", name(from), name(to)),
        ),
        Action::RemoveFile { path } => ("Would remove", "Removed", name(path)),
        Action::ReplaceCover { from, to } => (
            "Would overwrite",
            "Overwrote",
            format!("{} with {}", name(to), name(from)),
        ),
        Action::RenameToCover { from, to } => (
            "Would rename",
            "Renamed",
            format!("{} to {}", name(from), name(to)),
        ),
        Action::ExtractArtwork { from, to } => (
            "Would extract",
            "Extracted",
            format!("artwork from {} to {}", name(from), name(to)),
        ),
        Action::StripArtwork { path } => (
            "Would remove",
            "Removed",
            format!("embedded artwork from {}", name(path)),
        ),
    };
    let verb = if dry_run { planned } else { done };
    format!("{verb} {detail}")
}

/// Header plus one indented line per action. Empty when nothing happened.
pub fn format_folder_report(report: &FolderReport, root: &Path) -> Vec<String> {
    if !report.changed() {
        return Vec::new();
    }
    let mut lines = vec![folder_label(&report.folder, root)];
    lines.extend(
        report
            .actions
            .iter()
            .map(|a| format!("{}{}", indent(1), format_action(a, report.dry_run))),
    );
    lines
}

// ============================================================================
// Walk events
// ============================================================================

/// Format one walk event. Failed folders always print, with whatever was
/// applied before the failure listed first.
pub fn format_walk_event(event: &WalkEvent, root: &Path) -> Vec<String> {
    match event {
        WalkEvent::Reconciled(report) => format_folder_report(report, root),
        WalkEvent::FolderFailed { report, error } => {
            let mut lines = format_folder_report(report, root);
            if lines.is_empty() {
                lines.push(folder_label(&report.folder, root));
            }
            lines.push(format!("{}Failed: {}", indent(1), error));
            lines
        }
        WalkEvent::Unreadable { path, error } => vec![
            folder_label(path, root),
            format!("{}Failed: {}", indent(1), error),
        ],
    }
}

pub fn print_walk_event(event: &WalkEvent, root: &Path) {
    for line in format_walk_event(event, root) {
        println!("{}", line);
    }
}

// ============================================================================
// Summary
// ============================================================================

/// Final one-line summary.
///
/// ```text
/// Changed 2 of 14 folders (5 actions)
/// Dry run: 2 of 14 folders would change (5 actions)
/// ```
pub fn format_summary(summary: &WalkSummary) -> String {
    let folders = plural(summary.folders_visited, "folder", "folders");
    let actions = plural(summary.actions, "action", "actions");
    let mut line = if summary.dry_run {
        format!(
            "Dry run: {} of {} would change ({})",
            summary.folders_changed, folders, actions
        )
    } else {
        format!(
            "Changed {} of {} ({})",
            summary.folders_changed, folders, actions
        )
    };
    if !summary.failures.is_empty() {
        line.push_str(&format!(", {} failed", summary.failures.len()));
    }
    line
}

pub fn print_summary(summary: &WalkSummary) {
    println!();
    println!("{}", format_summary(summary));
}

//! # Album Art Tidy
//!
//! Normalizes the cover art of a music library. Every album folder ends up
//! with at most one image, `cover.jpg`, and music files stop carrying
//! embedded pictures that duplicate it.
//!
//! # Architecture: Scan, Reconcile, Walk
//!
//! ```text
//! walk       root/      →  every directory, pre-order
//! scan       folder/    →  FolderInventory   (classification only, no I/O beyond listing)
//! reconcile  inventory  →  FolderReport      (actions applied, or only recorded in dry run)
//! ```
//!
//! The reconciler never touches the filesystem directly. It talks to three
//! capability traits, so the whole decision procedure runs in unit tests
//! against an in-memory library:
//!
//! - [`store::FileStore`]: list, remove, rename, write a new file
//! - [`imaging::ImageBackend`]: read dimensions, convert PNG to JPEG
//! - [`artwork::ArtworkBackend`]: detect, extract and strip embedded pictures
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`walk`] | Recursive traversal, error policy, per-folder events and run summary |
//! | [`scan`] | Classifies a folder listing into cover candidates and music files |
//! | [`reconcile`] | The per-folder decision procedure and its [`reconcile::Action`]s |
//! | [`imaging`] | Pure-Rust image identify and PNG→JPEG conversion |
//! | [`artwork`] | Embedded pictures in MP3 (ID3v2) and FLAC (picture blocks) |
//! | [`store`] | Directory listing and file mutations over `std::fs` |
//! | [`config`] | Run options and their validation |
//! | [`output`] | CLI output formatting of folder reports and the summary |
//!
//! # Design Decisions
//!
//! ## One Cover Per Folder
//!
//! `cover.jpg` is the only image that survives. `cover.png` and `folder.jpg`
//! are folded into it when they are strictly larger (width first, then
//! height) and deleted otherwise. Filename matching is case-insensitive, but
//! an existing cover keeps its original spelling.
//!
//! ## Embedded Art Is Redundant Once a Cover Exists
//!
//! With a `cover.jpg` in place, pictures embedded in MP3 and FLAC files only
//! duplicate it, so they are stripped. Without one, the first music file
//! carrying a picture donates it as `cover.jpg` before everything is stripped.
//! Files without pictures are never rewritten, which makes a second run a
//! no-op.
//!
//! ## Dry Run Does Not Simulate
//!
//! A dry run records the same [`reconcile::Action`]s a live run would apply
//! but leaves the tracked cover state alone. Later steps in the same folder
//! decide against what is on disk, so a dry run can report a slightly
//! different plan than a live run performs. See [`reconcile`].
//!
//! ## Symlinks Are Not Followed
//!
//! The walker only descends real directories, and only regular files are
//! classified. A library assembled from symlinks is left untouched.

pub mod artwork;
pub mod config;
pub mod imaging;
pub mod output;
pub mod reconcile;
pub mod scan;
pub mod store;
pub mod walk;

#[cfg(test)]
pub(crate) mod test_helpers;

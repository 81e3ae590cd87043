//! Workspace scanning for skein.
//!
//! This crate discovers the packages that make up an npm/pnpm/yarn-style
//! workspace and locates the source files they own. It produces the
//! [`PackageRecord`] list consumed by `skein-graph`, which attributes
//! import edges to packages and assembles the final dependency report.
//!
//! Discovery is read-only and tolerant: unreadable or malformed manifests
//! are skipped with a log line rather than aborting the scan.

pub mod discover;
pub mod error;
pub mod locate;
pub mod manifest;
pub mod package;
pub mod tooling;

pub use discover::{WorkspaceScanner, DEFAULT_EXCLUDES};
pub use error::{Result, WorkspaceError};
pub use locate::{
    dir_exclude_pattern, is_source_file, locate_named_files, locate_source_files, ExcludeSet,
    SOURCE_EXTENSIONS,
};
pub use manifest::Manifest;
pub use package::PackageRecord;

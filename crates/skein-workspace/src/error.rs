//! Error types for workspace scanning.

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by workspace discovery and source location.
///
/// Per-manifest failures are deliberately *not* represented here: a broken
/// `package.json` is skipped during discovery, not raised. Only conditions
/// that make the whole scan meaningless become errors.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    /// The workspace root does not exist or is not a directory.
    #[error("workspace root not found: {}", .0.display())]
    RootNotFound(PathBuf),

    /// An exclusion pattern could not be compiled.
    #[error("invalid exclude pattern {pattern:?}: {source}")]
    InvalidExclude {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    /// I/O errors from walking the filesystem.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, WorkspaceError>;

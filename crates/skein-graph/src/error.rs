//! Error types for the analysis core.

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by graph construction and report assembly.
///
/// The propagation policy is narrow on purpose: a single unreadable or
/// unparseable source file contributes nothing instead of failing the
/// scan, and a broken alias config is treated as absent. Only conditions
/// that leave nothing to analyze become errors.
#[derive(Debug, Error)]
pub enum GraphError {
    /// No packages were discovered under the given root.
    #[error("no packages found at {}", .0.display())]
    NoPackagesFound(PathBuf),

    /// The workspace root does not exist.
    #[error("workspace root not found: {}", .0.display())]
    RootNotFound(PathBuf),

    /// Errors from workspace discovery.
    #[error(transparent)]
    Workspace(#[from] skein_workspace::WorkspaceError),

    /// I/O errors outside the per-file recovery path.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, GraphError>;

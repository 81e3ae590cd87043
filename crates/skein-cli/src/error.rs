//! CLI error types.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

/// Top-level CLI error. Domain errors convert automatically via
/// `#[from]`.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Analysis error: {0}")]
    Graph(#[from] skein_graph::GraphError),

    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Watch error: {0}")]
    Watch(#[from] notify::Error),

    #[error("Server error: {0}")]
    Server(String),
}

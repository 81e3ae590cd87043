//! Watch mode: file watching, shared state, and the live report server.

mod server;
mod state;
mod watcher;

pub use server::WatchServer;
pub use state::{SharedState, WatchState};
pub use watcher::{FileChange, FileWatcher};

use serde::Serialize;
use skein_graph::DependencyReport;

/// Events pushed to connected SSE clients.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum WatchEvent {
    /// A rebuild made progress.
    #[serde(rename_all = "camelCase")]
    Progress {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        progress: Option<f32>,
    },

    /// A new (possibly interim) report is available.
    #[serde(rename_all = "camelCase")]
    Report { report: DependencyReport },

    /// A rebuild failed; the previous report stays current.
    #[serde(rename_all = "camelCase")]
    BuildFailed { message: String },
}

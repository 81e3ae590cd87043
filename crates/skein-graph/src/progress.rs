//! Progress and snapshot callback protocol.
//!
//! Callbacks are explicit optional-function fields with fixed signatures
//! rather than overloaded arguments, so hosts can wire in whichever
//! subset they need.

use serde::Serialize;

use crate::report::DependencyReport;

/// Progress callback: human-readable message plus optional percentage
/// in `[0, 100]`.
pub type ProgressFn = Box<dyn Fn(&str, Option<f32>) + Send + Sync>;

/// Snapshot callback fired during full rebuilds in incremental mode.
pub type SnapshotFn = Box<dyn Fn(&Snapshot<'_>) + Send + Sync>;

/// A point-in-time view of a rebuild, including the report as composed
/// so far. Serializable so live consumers can forward it verbatim.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot<'a> {
    pub message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<f32>,
    pub report: &'a DependencyReport,
}

/// Optional observer hooks for a build.
#[derive(Default)]
pub struct AnalysisEvents {
    pub on_progress: Option<ProgressFn>,
    pub on_snapshot: Option<SnapshotFn>,
}

impl AnalysisEvents {
    /// Fire the progress callback, if any.
    pub fn progress(&self, message: &str, percent: Option<f32>) {
        if let Some(callback) = &self.on_progress {
            callback(message, percent);
        }
    }

    /// Fire the snapshot callback, if any.
    pub fn snapshot(&self, message: &str, progress: Option<f32>, report: &DependencyReport) {
        if let Some(callback) = &self.on_snapshot {
            callback(&Snapshot {
                message,
                progress,
                report,
            });
        }
    }

    /// True if someone is listening for snapshots; composing an interim
    /// report is skipped entirely otherwise.
    pub fn wants_snapshots(&self) -> bool {
        self.on_snapshot.is_some()
    }
}

impl std::fmt::Debug for AnalysisEvents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisEvents")
            .field("on_progress", &self.on_progress.is_some())
            .field("on_snapshot", &self.on_snapshot.is_some())
            .finish()
    }
}

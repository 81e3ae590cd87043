//! The per-file analysis loop.
//!
//! Analysis is CPU-bound but runs on the async runtime so callers can
//! share it with servers and watchers; the loop yields back to the
//! scheduler at a fixed interval instead of monopolizing a worker.

use std::path::PathBuf;

use rustc_hash::FxHashMap;

use crate::analyzer::{analyze_file, AnalyzerContext, FileAnalysis};
use crate::progress::AnalysisEvents;

/// Files analyzed between cooperative yields and checkpoints.
const CHECKPOINT_INTERVAL: usize = 25;

/// Progress range claimed by file analysis; discovery sits below it and
/// cycle detection plus assembly above.
pub(crate) const ANALYSIS_PROGRESS_START: f32 = 10.0;
pub(crate) const ANALYSIS_PROGRESS_END: f32 = 90.0;

/// Drives [`analyze_file`] over a file list, reporting progress and
/// invoking a checkpoint hook with the analyses accumulated so far.
pub struct GraphBuilder<'a> {
    context: &'a AnalyzerContext<'a>,
    events: &'a AnalysisEvents,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(context: &'a AnalyzerContext<'a>, events: &'a AnalysisEvents) -> Self {
        Self { context, events }
    }

    /// Analyze every file, in order. The checkpoint hook fires every
    /// [`CHECKPOINT_INTERVAL`] files and once more after the last file,
    /// with `(files_done, files_total, analyses_so_far)`.
    pub async fn analyze_all<F>(
        &self,
        files: &[PathBuf],
        mut checkpoint: F,
    ) -> FxHashMap<PathBuf, FileAnalysis>
    where
        F: FnMut(usize, usize, &FxHashMap<PathBuf, FileAnalysis>),
    {
        let total = files.len();
        let mut analyses =
            FxHashMap::with_capacity_and_hasher(total, Default::default());

        for (done, file) in files.iter().enumerate() {
            let analysis = analyze_file(file, self.context).await;
            analyses.insert(file.clone(), analysis);

            let done = done + 1;
            if done % CHECKPOINT_INTERVAL == 0 || done == total {
                self.events.progress(
                    &format!("Analyzing source files ({done}/{total})"),
                    Some(analysis_percent(done, total)),
                );
                checkpoint(done, total, &analyses);
                if done != total {
                    tokio::task::yield_now().await;
                }
            }
        }

        analyses
    }
}

/// Map `done / total` into the analysis progress range.
pub(crate) fn analysis_percent(done: usize, total: usize) -> f32 {
    if total == 0 {
        return ANALYSIS_PROGRESS_END;
    }
    let span = ANALYSIS_PROGRESS_END - ANALYSIS_PROGRESS_START;
    ANALYSIS_PROGRESS_START + span * (done as f32 / total as f32)
}

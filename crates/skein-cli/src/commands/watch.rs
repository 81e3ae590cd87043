//! The `skein watch` command: rebuild on change, serve over HTTP.
//!
//! Layout: the analysis events feed an unbounded channel whose consumer
//! broadcasts to SSE clients; the rebuild loop owns the `ReportBuilder`
//! and coalesces change batches, so changes arriving mid-build queue up
//! for the next pass instead of triggering overlapping rebuilds.

use std::sync::Arc;
use std::time::Duration;

use skein_graph::{AnalysisEvents, BuildRequest, ReportBuilder, ReportBuilderOptions};
use skein_workspace::{dir_exclude_pattern, WorkspaceScanner};

use crate::cli::WatchArgs;
use crate::error::{CliError, Result};
use crate::watch::{FileWatcher, SharedState, WatchEvent, WatchServer, WatchState};

pub async fn watch_execute(args: WatchArgs) -> Result<()> {
    let root = args
        .root
        .canonicalize()
        .map_err(|_| CliError::FileNotFound(args.root.clone()))?;

    let mut excludes = WorkspaceScanner::default_excludes();
    excludes.extend(args.exclude.iter().map(|name| dir_exclude_pattern(name)));

    let state: SharedState = Arc::new(WatchState::new());

    // Analysis callbacks are synchronous; bridge them to the async
    // broadcast path through a channel.
    let (event_tx, mut event_rx) = tokio::sync::mpsc::unbounded_channel::<WatchEvent>();
    let progress_tx = event_tx.clone();
    let snapshot_tx = event_tx;
    let events = AnalysisEvents {
        on_progress: Some(Box::new(move |message, progress| {
            let _ = progress_tx.send(WatchEvent::Progress {
                message: message.to_string(),
                progress,
            });
        })),
        on_snapshot: Some(Box::new(move |snapshot| {
            let _ = snapshot_tx.send(WatchEvent::Report {
                report: snapshot.report.clone(),
            });
        })),
    };

    let broadcast_state = Arc::clone(&state);
    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            if let WatchEvent::Report { report } = &event {
                broadcast_state.set_report(report.clone());
            }
            broadcast_state.broadcast(&event).await;
        }
    });

    let mut builder = ReportBuilder::new(&root, ReportBuilderOptions {
        excludes: excludes.clone(),
        events,
    });
    let report = builder.build(BuildRequest::full()).await?;
    tracing::info!(
        packages = report.packages.len(),
        root = %root.display(),
        "initial analysis complete"
    );

    let (_watcher, mut changes) = FileWatcher::new(root.clone(), excludes, args.debounce_ms)?;

    let server = WatchServer::new(args.port, Arc::clone(&state));
    tokio::spawn(async move {
        if let Err(err) = server.start().await {
            tracing::error!("{err}");
        }
    });

    let debounce = Duration::from_millis(args.debounce_ms);
    loop {
        let change = tokio::select! {
            change = changes.recv() => change,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutting down");
                return Ok(());
            }
        };
        let Some(change) = change else {
            return Ok(());
        };

        // Let the burst settle, then drain whatever queued up; changes
        // arriving during the rebuild below are picked up next round.
        tokio::time::sleep(debounce).await;
        let mut batch = vec![change.into_path()];
        while let Ok(more) = changes.try_recv() {
            batch.push(more.into_path());
        }
        batch.sort();
        batch.dedup();

        tracing::debug!(files = batch.len(), "rebuilding");
        match builder.build(BuildRequest::changes(batch)).await {
            Ok(_) => {
                // The final snapshot already reached clients through the
                // event channel.
            }
            Err(err) => {
                tracing::warn!("rebuild failed: {err}");
                state
                    .broadcast(&WatchEvent::BuildFailed {
                        message: err.to_string(),
                    })
                    .await;
            }
        }
    }
}

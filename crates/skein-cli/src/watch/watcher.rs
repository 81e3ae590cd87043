//! File system watcher with per-path debouncing.
//!
//! Watches the workspace root recursively and forwards changes that can
//! affect the report: source files and structural files like manifests
//! and tool configs. Everything under an excluded directory is dropped
//! at the watcher level so rapid node_modules churn never reaches the
//! rebuild loop.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use skein_graph::is_critical_path;
use skein_workspace::{is_source_file, ExcludeSet};
use tokio::sync::mpsc;

use crate::error::{CliError, Result};

/// One file change, already filtered to relevant paths.
#[derive(Debug, Clone)]
pub enum FileChange {
    Modified(PathBuf),
    Created(PathBuf),
    Removed(PathBuf),
}

impl FileChange {
    pub fn path(&self) -> &Path {
        match self {
            FileChange::Modified(p) | FileChange::Created(p) | FileChange::Removed(p) => p,
        }
    }

    pub fn into_path(self) -> PathBuf {
        match self {
            FileChange::Modified(p) | FileChange::Created(p) | FileChange::Removed(p) => p,
        }
    }
}

/// Recursive watcher handle. Dropping it stops the watch.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
}

impl FileWatcher {
    /// Watch `root` recursively, sending filtered changes through the
    /// returned channel. Repeat events for the same path inside the
    /// debounce window are dropped.
    pub fn new(
        root: PathBuf,
        excludes: Vec<String>,
        debounce_ms: u64,
    ) -> Result<(Self, mpsc::Receiver<FileChange>)> {
        if !root.is_dir() {
            return Err(CliError::FileNotFound(root));
        }

        // VCS metadata never affects the report.
        let mut patterns = excludes;
        patterns.push("**/.git/**".to_string());
        let exclude_set =
            ExcludeSet::compile(&patterns).map_err(skein_graph::GraphError::from)?;

        let (tx, rx) = mpsc::channel(100);
        let debounce = Duration::from_millis(debounce_ms);
        let mut last_event: Option<(PathBuf, Instant)> = None;
        let watch_root = root.clone();

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let Ok(event) = res else { return };
            for path in &event.paths {
                if should_ignore(path, &watch_root, &exclude_set) {
                    continue;
                }

                let now = Instant::now();
                if let Some((last_path, last_time)) = &last_event {
                    if last_path == path && now.duration_since(*last_time) < debounce {
                        continue;
                    }
                }
                last_event = Some((path.clone(), now));

                let change = match event.kind {
                    notify::EventKind::Create(_) => FileChange::Created(path.clone()),
                    notify::EventKind::Modify(_) => FileChange::Modified(path.clone()),
                    notify::EventKind::Remove(_) => FileChange::Removed(path.clone()),
                    _ => continue,
                };

                // The handler runs on notify's own thread.
                let _ = tx.blocking_send(change);
            }
        })?;

        watcher.watch(&root, RecursiveMode::Recursive)?;

        Ok((Self { _watcher: watcher }, rx))
    }
}

/// Drop paths outside the root, under excluded directories, or that
/// cannot affect the report.
fn should_ignore(path: &Path, root: &Path, excludes: &ExcludeSet) -> bool {
    if !path.starts_with(root) {
        return true;
    }
    if excludes.is_match(root, path) {
        return true;
    }
    !(is_source_file(path) || is_critical_path(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ignores_excluded_and_irrelevant_paths() {
        let root = Path::new("/ws");
        let excludes = ExcludeSet::compile(&[
            "**/node_modules/**".to_string(),
            "**/dist/**".to_string(),
            "**/.git/**".to_string(),
        ])
        .unwrap();

        assert!(should_ignore(
            Path::new("/ws/node_modules/react/index.js"),
            root,
            &excludes
        ));
        assert!(should_ignore(Path::new("/ws/.git/HEAD"), root, &excludes));
        assert!(should_ignore(Path::new("/elsewhere/a.ts"), root, &excludes));
        assert!(should_ignore(Path::new("/ws/README.md"), root, &excludes));

        assert!(!should_ignore(
            Path::new("/ws/packages/a/src/index.ts"),
            root,
            &excludes
        ));
        assert!(!should_ignore(
            Path::new("/ws/packages/a/package.json"),
            root,
            &excludes
        ));
        assert!(!should_ignore(
            Path::new("/ws/tsconfig.json"),
            root,
            &excludes
        ));
    }
}

//! Incremental report building.
//!
//! `ReportBuilder` owns everything a rebuild needs: the discovered
//! packages, the package index, alias scopes, and a cache of per-file
//! analyses keyed by absolute path. Source edits re-analyze only the
//! touched files and recompose the graph from the cache; structural
//! edits (manifests, tool configs) invalidate the world and trigger a
//! full rescan.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use rustc_hash::FxHashMap;
use skein_workspace::{
    is_source_file, locate_named_files, locate_source_files, ExcludeSet, PackageRecord,
    WorkspaceScanner,
};

use crate::aggregate::AggregatedGraph;
use crate::aliases::AliasStore;
use crate::analyzer::{analyze_file, AnalyzerContext, FileAnalysis};
use crate::builder::GraphBuilder;
use crate::cycles::find_cyclic_edges;
use crate::error::{GraphError, Result};
use crate::index::PackageIndex;
use crate::progress::AnalysisEvents;
use crate::report::{assemble_report, DependencyReport};

/// Minimum spacing between interim snapshots during a full rebuild.
const SNAPSHOT_INTERVAL: Duration = Duration::from_millis(250);

/// One rebuild request.
#[derive(Debug, Default, Clone)]
pub struct BuildRequest {
    /// Absolute paths reported as changed since the last build. Ignored
    /// when a full rebuild is forced or no prior state exists.
    pub changed_files: Vec<PathBuf>,
    pub force_full_rebuild: bool,
}

impl BuildRequest {
    /// A request that unconditionally rescans the workspace.
    pub fn full() -> Self {
        Self {
            changed_files: Vec::new(),
            force_full_rebuild: true,
        }
    }

    /// A request carrying a change batch.
    pub fn changes(changed_files: Vec<PathBuf>) -> Self {
        Self {
            changed_files,
            force_full_rebuild: false,
        }
    }
}

/// Construction options; the defaults match the scanner's.
#[derive(Debug)]
pub struct ReportBuilderOptions {
    pub excludes: Vec<String>,
    pub events: AnalysisEvents,
}

impl Default for ReportBuilderOptions {
    fn default() -> Self {
        Self {
            excludes: WorkspaceScanner::default_excludes(),
            events: AnalysisEvents::default(),
        }
    }
}

/// Everything retained between builds.
struct BuilderState {
    packages: Vec<PackageRecord>,
    index: PackageIndex,
    aliases: AliasStore,
    analyses: FxHashMap<PathBuf, FileAnalysis>,
}

/// Stateful report builder for one workspace root.
pub struct ReportBuilder {
    root: PathBuf,
    excludes: Vec<String>,
    events: AnalysisEvents,
    state: Option<BuilderState>,
    last_report: Option<DependencyReport>,
}

impl ReportBuilder {
    pub fn new(root: impl Into<PathBuf>, options: ReportBuilderOptions) -> Self {
        Self {
            root: root.into(),
            excludes: options.excludes,
            events: options.events,
            state: None,
            last_report: None,
        }
    }

    /// The most recently composed report, if any build has completed.
    pub fn last_report(&self) -> Option<&DependencyReport> {
        self.last_report.as_ref()
    }

    /// Run one build. Chooses between a full rescan and an incremental
    /// update based on the request and the kinds of files changed.
    pub async fn build(&mut self, request: BuildRequest) -> Result<DependencyReport> {
        let needs_full = request.force_full_rebuild
            || self.state.is_none()
            || request.changed_files.iter().any(|p| is_critical_path(p));

        if needs_full {
            if let Some(path) = request.changed_files.iter().find(|p| is_critical_path(p)) {
                tracing::debug!(path = %path.display(), "structural change, full rebuild");
            }
            return self.full_rebuild().await;
        }
        self.incremental_build(&request.changed_files).await
    }

    async fn full_rebuild(&mut self) -> Result<DependencyReport> {
        let started = Instant::now();
        self.events.progress("Discovering packages", Some(0.0));

        let root = self
            .root
            .canonicalize()
            .map_err(|_| GraphError::RootNotFound(self.root.clone()))?;

        let packages = WorkspaceScanner::new(&root, self.excludes.clone()).collect()?;
        if packages.is_empty() {
            return Err(GraphError::NoPackagesFound(root));
        }

        let mut files = locate_source_files(&root, &self.excludes)?;
        files.sort();
        let configs = locate_named_files(&root, &self.excludes, |name| {
            AliasStore::is_alias_config_name(name)
        })?;
        let aliases = AliasStore::load(&root, &configs);
        let index = PackageIndex::new(&packages);

        self.events.progress(
            &format!(
                "Discovered {} packages, {} source files",
                packages.len(),
                files.len()
            ),
            Some(10.0),
        );

        let context = AnalyzerContext {
            index: &index,
            aliases: &aliases,
        };
        let builder = GraphBuilder::new(&context, &self.events);

        let mut last_snapshot = Instant::now();
        let events = &self.events;
        let packages_ref = &packages;
        let root_ref = root.as_path();
        let analyses = builder
            .analyze_all(&files, |done, total, partial| {
                if !events.wants_snapshots() {
                    return;
                }
                let finished = done == total;
                if !finished && last_snapshot.elapsed() < SNAPSHOT_INTERVAL {
                    return;
                }
                last_snapshot = Instant::now();
                let graph = AggregatedGraph::from_analyses(partial.iter());
                let cyclic = find_cyclic_edges(&graph.edges);
                let interim = assemble_report(packages_ref, &graph, &cyclic, root_ref);
                events.snapshot(
                    &format!("Analyzed {done}/{total} files"),
                    Some(crate::builder::analysis_percent(done, total)),
                    &interim,
                );
            })
            .await;

        self.events.progress("Detecting cycles", Some(90.0));
        let graph = AggregatedGraph::from_analyses(analyses.iter());
        let cyclic = find_cyclic_edges(&graph.edges);

        self.events.progress("Assembling report", Some(95.0));
        let report = assemble_report(&packages, &graph, &cyclic, &root);

        tracing::info!(
            packages = packages.len(),
            files = analyses.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "full analysis complete"
        );
        self.events.progress("Analysis complete", Some(100.0));
        self.events.snapshot("Analysis complete", Some(100.0), &report);

        self.state = Some(BuilderState {
            packages,
            index,
            aliases,
            analyses,
        });
        self.last_report = Some(report.clone());
        Ok(report)
    }

    async fn incremental_build(&mut self, changed: &[PathBuf]) -> Result<DependencyReport> {
        let root = self
            .root
            .canonicalize()
            .map_err(|_| GraphError::RootNotFound(self.root.clone()))?;
        let exclude_set = ExcludeSet::compile(&self.excludes)?;

        // state is always present on this path.
        let Some(state) = self.state.as_mut() else {
            return self.full_rebuild().await;
        };

        let mut dirty = false;
        for path in changed {
            if !is_source_file(path) || exclude_set.is_match(&root, path) {
                continue;
            }
            match tokio::fs::metadata(path).await {
                Err(_) => {
                    // Deleted (or unreadable): drop its contribution.
                    if state.analyses.remove(path).is_some() {
                        tracing::debug!(path = %path.display(), "removed deleted file");
                        dirty = true;
                    }
                }
                Ok(_) => {
                    let context = AnalyzerContext {
                        index: &state.index,
                        aliases: &state.aliases,
                    };
                    let analysis = analyze_file(path, &context).await;
                    let unchanged = state
                        .analyses
                        .get(path)
                        .is_some_and(|prev| prev.content_hash == analysis.content_hash);
                    if unchanged {
                        continue;
                    }
                    state.analyses.insert(path.clone(), analysis);
                    dirty = true;
                }
            }
        }

        if !dirty {
            if let Some(report) = &self.last_report {
                tracing::debug!("no effective changes, reusing last report");
                return Ok(report.clone());
            }
            return self.full_rebuild().await;
        }

        // File counts drift as retained analyses come and go; refresh
        // them before assembling so the recomposed report matches what a
        // fresh scan would produce.
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for analysis in state.analyses.values() {
            if let Some(owner) = &analysis.package {
                *counts.entry(owner.clone()).or_insert(0) += 1;
            }
        }
        for record in &mut state.packages {
            record.file_count = counts.get(&record.name).copied().unwrap_or(0);
        }

        self.events.progress("Recomposing report", Some(95.0));
        let graph = AggregatedGraph::from_analyses(state.analyses.iter());
        let cyclic = find_cyclic_edges(&graph.edges);
        let report = assemble_report(&state.packages, &graph, &cyclic, &root);
        self.events.progress("Analysis complete", Some(100.0));
        self.events.snapshot("Analysis complete", Some(100.0), &report);

        self.last_report = Some(report.clone());
        Ok(report)
    }
}

/// Files whose edits can change package boundaries, declared deps, or
/// resolution rules; any of these forces a full rescan.
pub fn is_critical_path(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    name == "package.json"
        || AliasStore::is_alias_config_name(name)
        || name.starts_with(".eslintrc")
        || name.starts_with("eslint.config.")
        || name.starts_with("tailwind.config.")
        || name.starts_with("postcss.config.")
        || name.starts_with("jest.config.")
        || name.starts_with("vitest.config.")
}

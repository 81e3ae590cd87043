//! Workspace-wide aggregation of per-file analyses.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use crate::analyzer::FileAnalysis;

/// Package-level adjacency: owner name to the set of package names it
/// imports. Self-loops are never present.
pub type EdgeMap = BTreeMap<String, BTreeSet<String>>;

/// Everything the report assembler needs about the import graph.
///
/// Rebuilt from scratch on every (re)composition; only the per-file
/// analyses persist across incremental updates.
#[derive(Debug, Default, Clone)]
pub struct AggregatedGraph {
    /// Internal package-level edges.
    pub edges: EdgeMap,
    /// Per-edge reference counts: owner → target → count.
    pub edge_counts: BTreeMap<String, BTreeMap<String, u32>>,
    /// Total inbound internal reference count per target package.
    pub reference_count: BTreeMap<String, u32>,
    /// External reference counts: owner → external name → count.
    pub external_reference_count: BTreeMap<String, BTreeMap<String, u32>>,
    /// Evidence trail: owner → target → files that caused the edge.
    pub dependency_origins: BTreeMap<String, BTreeMap<String, BTreeSet<PathBuf>>>,
}

impl AggregatedGraph {
    /// Fold one file's analysis into the graph.
    pub fn absorb(&mut self, path: &Path, analysis: &FileAnalysis) {
        let Some(owner) = analysis.package.as_deref() else {
            // Files outside every package carry no edges.
            return;
        };

        for (target, count) in &analysis.internal_refs {
            if target == owner {
                continue;
            }
            self.edges
                .entry(owner.to_string())
                .or_default()
                .insert(target.clone());
            *self
                .edge_counts
                .entry(owner.to_string())
                .or_default()
                .entry(target.clone())
                .or_insert(0) += count;
            *self.reference_count.entry(target.clone()).or_insert(0) += count;
            self.dependency_origins
                .entry(owner.to_string())
                .or_default()
                .entry(target.clone())
                .or_default()
                .insert(path.to_path_buf());
        }

        for (name, count) in &analysis.external_refs {
            *self
                .external_reference_count
                .entry(owner.to_string())
                .or_default()
                .entry(name.clone())
                .or_insert(0) += count;
        }
    }

    /// Build a graph from a set of retained analyses.
    pub fn from_analyses<'a, I>(analyses: I) -> Self
    where
        I: IntoIterator<Item = (&'a PathBuf, &'a FileAnalysis)>,
    {
        let mut graph = Self::default();
        // Sorted for deterministic evidence sets regardless of cache
        // iteration order.
        let mut items: Vec<_> = analyses.into_iter().collect();
        items.sort_by(|a, b| a.0.cmp(b.0));
        for (path, analysis) in items {
            graph.absorb(path, analysis);
        }
        graph
    }
}

//! Report assembly.
//!
//! Combines package metadata, the aggregated import graph, and cycle
//! information into the externally visible `DependencyReport`. The
//! report is a plain JSON-serializable tree: cycles appear as name
//! lists, never as object references.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use skein_workspace::{tooling, PackageRecord};

use crate::aggregate::AggregatedGraph;
use crate::cycles::edge_key;

/// The final report for one workspace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyReport {
    pub root_dir: String,
    pub packages: Vec<ReportPackage>,
}

/// Evidence for one internal dependency edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyDetail {
    pub name: String,
    /// Total reference count from the owning package.
    pub count: u32,
    /// Deduplicated, sorted file paths relative to the owning package
    /// (or to the workspace root for files outside it).
    pub files: Vec<String>,
}

/// One classified external dependency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalDependencyRecord {
    pub name: String,
    pub is_declared: bool,
    pub is_used: bool,
    pub usage_count: u32,
    pub declared_in_dependencies: bool,
    pub declared_in_dev_dependencies: bool,
    pub is_likely_type_package: bool,
    pub is_tooling_only: bool,
}

/// Per-package result record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportPackage {
    pub name: String,
    pub version: Option<String>,
    pub description: Option<String>,
    pub dir: String,
    pub is_root: bool,
    pub file_count: usize,
    pub has_child_packages: bool,
    /// Inbound internal reference count.
    pub references: u32,
    /// Internal dependencies after container filtering.
    pub dependencies: Vec<String>,
    /// Dependencies also declared in the manifest.
    pub declared_deps: Vec<String>,
    /// Dependencies missing from the manifest.
    pub undeclared_deps: Vec<String>,
    /// Dependencies participating in a cycle.
    pub cyclic_deps: Vec<String>,
    pub dependency_details: Vec<DependencyDetail>,
    pub external_dependencies: Vec<ExternalDependencyRecord>,
    /// External names used by source but not declared anywhere.
    pub undeclared_external_deps: Vec<String>,
    /// External names declared but never used, excluding type packages
    /// and tooling.
    pub unused_external_deps: Vec<String>,
}

/// Assemble the final report.
pub fn assemble_report(
    packages: &[PackageRecord],
    graph: &AggregatedGraph,
    cyclic_edges: &BTreeSet<String>,
    root: &Path,
) -> DependencyReport {
    let workspace_names: BTreeSet<&str> = packages.iter().map(|p| p.name.as_str()).collect();
    let by_name: BTreeMap<&str, &PackageRecord> =
        packages.iter().map(|p| (p.name.as_str(), p)).collect();

    let packages = packages
        .iter()
        .map(|record| {
            assemble_package(record, graph, cyclic_edges, root, &workspace_names, &by_name)
        })
        .collect();

    DependencyReport {
        root_dir: root.display().to_string(),
        packages,
    }
}

fn assemble_package(
    record: &PackageRecord,
    graph: &AggregatedGraph,
    cyclic_edges: &BTreeSet<String>,
    root: &Path,
    workspace_names: &BTreeSet<&str>,
    by_name: &BTreeMap<&str, &PackageRecord>,
) -> ReportPackage {
    static EMPTY: BTreeSet<String> = BTreeSet::new();
    let raw_deps = graph.edges.get(&record.name).unwrap_or(&EMPTY);

    // Container filtering: a package owning nested child packages must
    // not appear to depend on them just because a file referenced them
    // by workspace name.
    let dependencies: Vec<String> = raw_deps
        .iter()
        .filter(|target| {
            if !record.has_child_packages {
                return true;
            }
            match by_name.get(target.as_str()) {
                Some(target_record) => {
                    !(target_record.dir.starts_with(&record.dir)
                        && target_record.dir != record.dir)
                }
                None => true,
            }
        })
        .cloned()
        .collect();

    let declared_deps: Vec<String> = dependencies
        .iter()
        .filter(|dep| record.declares(dep))
        .cloned()
        .collect();
    let undeclared_deps: Vec<String> = dependencies
        .iter()
        .filter(|dep| !record.declares(dep))
        .cloned()
        .collect();

    let cyclic_deps: Vec<String> = dependencies
        .iter()
        .filter(|dep| cyclic_edges.contains(&edge_key(&record.name, dep)))
        .cloned()
        .collect();

    let dependency_details = dependencies
        .iter()
        .map(|dep| {
            let files: Vec<String> = graph
                .dependency_origins
                .get(&record.name)
                .and_then(|targets| targets.get(dep))
                .map(|paths| {
                    paths
                        .iter()
                        .map(|path| relative_display(path, &record.dir, root))
                        .collect::<BTreeSet<String>>()
                        .into_iter()
                        .collect()
                })
                .unwrap_or_default();
            let count = graph
                .edge_counts
                .get(&record.name)
                .and_then(|targets| targets.get(dep))
                .copied()
                .unwrap_or(0);
            DependencyDetail {
                name: dep.clone(),
                count,
                files,
            }
        })
        .collect();

    let external_dependencies =
        classify_externals(record, graph, workspace_names);

    let undeclared_external_deps: Vec<String> = external_dependencies
        .iter()
        .filter(|ext| ext.usage_count > 0 && !ext.is_declared)
        .map(|ext| ext.name.clone())
        .collect();
    let unused_external_deps: Vec<String> = external_dependencies
        .iter()
        .filter(|ext| {
            ext.is_declared
                && ext.usage_count == 0
                && !ext.is_likely_type_package
                && !ext.is_tooling_only
        })
        .map(|ext| ext.name.clone())
        .collect();

    ReportPackage {
        name: record.name.clone(),
        version: record.version.clone(),
        description: record.description.clone(),
        dir: record.dir.display().to_string(),
        is_root: record.is_root,
        file_count: record.file_count,
        has_child_packages: record.has_child_packages,
        references: graph
            .reference_count
            .get(&record.name)
            .copied()
            .unwrap_or(0),
        dependencies,
        declared_deps,
        undeclared_deps,
        cyclic_deps,
        dependency_details,
        external_dependencies,
        undeclared_external_deps,
        unused_external_deps,
    }
}

/// Classify every external dependency of one package: the union of
/// declared-but-not-workspace names and names seen as external
/// references.
fn classify_externals(
    record: &PackageRecord,
    graph: &AggregatedGraph,
    workspace_names: &BTreeSet<&str>,
) -> Vec<ExternalDependencyRecord> {
    static EMPTY: BTreeMap<String, u32> = BTreeMap::new();
    let used = graph
        .external_reference_count
        .get(&record.name)
        .unwrap_or(&EMPTY);

    let mut names: BTreeSet<&str> = record
        .declared_prod_deps
        .iter()
        .chain(record.declared_dev_deps.iter())
        .map(String::as_str)
        .filter(|name| !workspace_names.contains(name))
        .collect();
    names.extend(
        used.keys()
            .map(String::as_str)
            .filter(|name| !workspace_names.contains(name)),
    );

    let records: Vec<ExternalDependencyRecord> = names
        .into_iter()
        .map(|name| {
            let usage_count = used.get(name).copied().unwrap_or(0);
            let declared_in_dependencies = record.declared_prod_deps.contains(name);
            let declared_in_dev_dependencies = record.declared_dev_deps.contains(name);
            let is_tooling_only = is_tooling_only(name, record);
            ExternalDependencyRecord {
                name: name.to_string(),
                is_declared: declared_in_dependencies || declared_in_dev_dependencies,
                is_used: usage_count > 0 || is_tooling_only,
                usage_count,
                declared_in_dependencies,
                declared_in_dev_dependencies,
                is_likely_type_package: is_likely_type_package(name),
                is_tooling_only,
            }
        })
        .collect();

    // Container packages would otherwise surface every hoisted declared
    // dependency of the whole workspace; keep only what they actually
    // use.
    if record.has_child_packages {
        records
            .into_iter()
            .filter(|ext| ext.is_used || ext.is_tooling_only)
            .collect()
    } else {
        records
    }
}

/// Type-definition naming conventions.
fn is_likely_type_package(name: &str) -> bool {
    name.starts_with("@types/")
        || name.ends_with("-types")
        || name.starts_with("types-")
        || name.starts_with("types/")
}

/// Tooling-only classification per the package's tooling context.
fn is_tooling_only(name: &str, record: &PackageRecord) -> bool {
    if record.tooling_deps.contains(name) {
        return true;
    }
    if tooling::is_typecheck_tool(name) && record.has_tsconfig {
        return true;
    }
    if tooling::is_css_tool(name) && (record.has_tailwind_config || record.has_autoprefixer) {
        return true;
    }
    if tooling::is_lint_tool(name) && record.has_eslint_config {
        return true;
    }
    let dev_only =
        record.declared_dev_deps.contains(name) && !record.declared_prod_deps.contains(name);
    dev_only && tooling::matches_tooling_pattern(name)
}

/// Display a file path relative to the package directory, falling back
/// to the workspace root, then to the absolute path.
fn relative_display(path: &Path, package_dir: &Path, root: &Path) -> String {
    path.strip_prefix(package_dir)
        .or_else(|_| path.strip_prefix(root))
        .unwrap_or(path)
        .display()
        .to_string()
}

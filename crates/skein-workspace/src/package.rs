//! The per-package record produced by workspace discovery.

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One discovered workspace package.
///
/// This is the unit of dependency-graph nodes: every edge in the final
/// report connects two `PackageRecord` names. The tooling flags describe
/// build/lint context and are only consulted when classifying external
/// dependencies as tooling-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageRecord {
    /// Unique package name from the manifest.
    pub name: String,
    /// Manifest version, if present.
    pub version: Option<String>,
    /// Manifest description, if present.
    pub description: Option<String>,
    /// Absolute directory path; the package's ownership boundary.
    pub dir: PathBuf,
    /// Names declared under `dependencies`.
    pub declared_prod_deps: BTreeSet<String>,
    /// Names declared under `devDependencies`.
    pub declared_dev_deps: BTreeSet<String>,
    /// A tsconfig.json sits in the package directory.
    pub has_tsconfig: bool,
    /// A tailwind config sits in the package directory.
    pub has_tailwind_config: bool,
    /// A postcss config referencing autoprefixer sits in the package
    /// directory (or autoprefixer is declared).
    pub has_autoprefixer: bool,
    /// An eslint config sits in the package directory.
    pub has_eslint_config: bool,
    /// Other discovered packages are nested inside this one's directory.
    pub has_child_packages: bool,
    /// Dependency names invoked by npm scripts rather than imports.
    pub tooling_deps: BTreeSet<String>,
    /// Source files owned directly by this package; files inside nested
    /// child packages are excluded.
    pub file_count: usize,
    /// This record's directory is the workspace root.
    pub is_root: bool,
}

impl PackageRecord {
    /// True if `name` appears in either declared dependency section.
    pub fn declares(&self, name: &str) -> bool {
        self.declared_prod_deps.contains(name) || self.declared_dev_deps.contains(name)
    }
}

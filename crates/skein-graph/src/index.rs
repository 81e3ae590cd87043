//! Package lookup index.
//!
//! Maps file paths to their owning package (most specific directory wins)
//! and provides the known-name set used by specifier resolution.

use std::path::{Path, PathBuf};

use rustc_hash::FxHashSet;
use skein_workspace::PackageRecord;

/// Fast lookups over the discovered package list.
#[derive(Debug, Default)]
pub struct PackageIndex {
    /// Package directories sorted by component count, deepest first, so
    /// the first `starts_with` hit is the most specific owner.
    dirs: Vec<(PathBuf, String)>,
    names: FxHashSet<String>,
}

impl PackageIndex {
    /// Build an index over the discovered packages.
    pub fn new(packages: &[PackageRecord]) -> Self {
        let mut dirs: Vec<(PathBuf, String)> = packages
            .iter()
            .map(|p| (p.dir.clone(), p.name.clone()))
            .collect();
        dirs.sort_by(|a, b| {
            let depth_a = a.0.components().count();
            let depth_b = b.0.components().count();
            depth_b.cmp(&depth_a).then_with(|| a.0.cmp(&b.0))
        });

        let names = packages.iter().map(|p| p.name.clone()).collect();

        Self { dirs, names }
    }

    /// The package owning `path`: the deepest package directory that is
    /// an ancestor of (or equals) the path.
    pub fn owner_of(&self, path: &Path) -> Option<&str> {
        self.dirs
            .iter()
            .find(|(dir, _)| path.starts_with(dir))
            .map(|(_, name)| name.as_str())
    }

    /// True if `name` is a known workspace package.
    pub fn contains_name(&self, name: &str) -> bool {
        self.names.contains(name)
    }
}

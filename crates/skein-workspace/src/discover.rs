//! Package discovery.
//!
//! Walks the workspace root for `package.json` manifests and turns each
//! one into a [`PackageRecord`]. Discovery is deterministic: manifests are
//! processed in sorted path order, and when two manifests declare the same
//! name the first discovered wins (the collision is logged).

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

use crate::error::{Result, WorkspaceError};
use crate::locate::{compile_excludes, is_source_file};
use crate::manifest::Manifest;
use crate::package::PackageRecord;
use crate::tooling;

/// Default exclusion globs: dependency installs and common build output.
pub const DEFAULT_EXCLUDES: &[&str] = &[
    "**/node_modules/**",
    "**/dist/**",
    "**/build/**",
    "**/out/**",
    "**/.next/**",
    "**/coverage/**",
];

/// Tailwind config file names checked per package directory.
const TAILWIND_CONFIGS: &[&str] = &[
    "tailwind.config.js",
    "tailwind.config.cjs",
    "tailwind.config.mjs",
    "tailwind.config.ts",
];

/// PostCSS config file names checked for autoprefixer references.
const POSTCSS_CONFIGS: &[&str] = &[
    "postcss.config.js",
    "postcss.config.cjs",
    "postcss.config.mjs",
    "postcss.config.ts",
    ".postcssrc",
    ".postcssrc.json",
];

/// ESLint config file names checked per package directory.
const ESLINT_CONFIGS: &[&str] = &[
    ".eslintrc",
    ".eslintrc.js",
    ".eslintrc.cjs",
    ".eslintrc.json",
    ".eslintrc.yaml",
    ".eslintrc.yml",
    "eslint.config.js",
    "eslint.config.mjs",
    "eslint.config.cjs",
    "eslint.config.ts",
];

/// Scans a workspace root for packages.
///
/// Idempotent and side-effect-free aside from reading the filesystem.
pub struct WorkspaceScanner {
    root: PathBuf,
    excludes: Vec<String>,
}

impl WorkspaceScanner {
    /// Create a scanner for `root` with the given exclusion globs.
    pub fn new(root: impl Into<PathBuf>, excludes: Vec<String>) -> Self {
        Self {
            root: root.into(),
            excludes,
        }
    }

    /// Default exclusion globs as owned strings.
    pub fn default_excludes() -> Vec<String> {
        DEFAULT_EXCLUDES.iter().map(|s| s.to_string()).collect()
    }

    /// Discover every package under the root.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::RootNotFound`] when the root directory
    /// does not exist. Broken manifests are skipped, not raised.
    pub fn collect(&self) -> Result<Vec<PackageRecord>> {
        if !self.root.is_dir() {
            return Err(WorkspaceError::RootNotFound(self.root.clone()));
        }
        let root = self.root.canonicalize()?;

        let mut manifest_paths = self.find_manifests(&root)?;
        manifest_paths.sort();

        let manifests: Vec<Manifest> = manifest_paths
            .iter()
            .filter_map(|path| Manifest::load(path))
            .filter(|manifest| {
                if manifest.name.as_deref().unwrap_or("").is_empty() {
                    tracing::debug!(path = %manifest.path.display(), "skipping nameless manifest");
                    return false;
                }
                true
            })
            .collect();

        // First discovered name wins; duplicates are likely copy-paste
        // mistakes and analyzing both would make edges ambiguous.
        let mut seen = BTreeSet::new();
        let mut records = Vec::new();
        let package_dirs: Vec<PathBuf> = manifests.iter().map(|m| m.dir().to_path_buf()).collect();

        for manifest in &manifests {
            let name = manifest.name.clone().unwrap_or_default();
            if !seen.insert(name.clone()) {
                tracing::warn!(
                    name,
                    path = %manifest.path.display(),
                    "duplicate package name; first discovered record wins"
                );
                continue;
            }
            records.push(self.build_record(manifest, &root, &package_dirs));
        }

        Ok(records)
    }

    /// Find every manifest path under `root`, honoring exclusion globs.
    fn find_manifests(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let exclude_set = compile_excludes(&self.excludes)?;
        let mut paths = Vec::new();

        let walker = WalkBuilder::new(root)
            .standard_filters(false)
            .hidden(true)
            .follow_links(false)
            .build();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::debug!(%err, "skipping unreadable walk entry");
                    continue;
                }
            };
            let path = entry.path();
            if exclude_set.is_match(path.strip_prefix(root).unwrap_or(path)) {
                continue;
            }
            if entry.file_type().is_some_and(|ft| ft.is_file())
                && path.file_name().is_some_and(|n| n == "package.json")
            {
                paths.push(path.to_path_buf());
            }
        }

        Ok(paths)
    }

    /// Turn a manifest into a full package record.
    fn build_record(
        &self,
        manifest: &Manifest,
        root: &Path,
        package_dirs: &[PathBuf],
    ) -> PackageRecord {
        let dir = manifest.dir().to_path_buf();

        let child_dirs: Vec<&PathBuf> = package_dirs
            .iter()
            .filter(|other| **other != dir && other.starts_with(&dir))
            .collect();

        let declared_prod_deps: BTreeSet<String> =
            manifest.dependencies.keys().cloned().collect();
        let declared_dev_deps: BTreeSet<String> =
            manifest.dev_dependencies.keys().cloned().collect();
        let declared = declared_prod_deps
            .union(&declared_dev_deps)
            .cloned()
            .collect();

        PackageRecord {
            name: manifest.name.clone().unwrap_or_default(),
            version: manifest.version.clone(),
            description: manifest.description.clone(),
            has_tsconfig: dir.join("tsconfig.json").is_file(),
            has_tailwind_config: TAILWIND_CONFIGS.iter().any(|f| dir.join(f).is_file()),
            has_autoprefixer: self.detect_autoprefixer(&dir, &declared),
            has_eslint_config: ESLINT_CONFIGS.iter().any(|f| dir.join(f).is_file()),
            has_child_packages: !child_dirs.is_empty(),
            tooling_deps: tooling::script_invoked_tools(&manifest.scripts, &declared),
            file_count: self.count_owned_files(&dir, &child_dirs),
            is_root: dir == root,
            declared_prod_deps,
            declared_dev_deps,
            dir,
        }
    }

    /// Autoprefixer presence: declared, or referenced by a postcss config.
    fn detect_autoprefixer(&self, dir: &Path, declared: &BTreeSet<String>) -> bool {
        if declared.contains("autoprefixer") {
            return true;
        }
        POSTCSS_CONFIGS.iter().any(|f| {
            let path = dir.join(f);
            path.is_file()
                && std::fs::read_to_string(&path)
                    .map(|content| content.contains("autoprefixer"))
                    .unwrap_or(false)
        })
    }

    /// Count source files owned directly by a package.
    ///
    /// Ownership stops at the boundary of any nested child package
    /// directory; those files belong to the child.
    fn count_owned_files(&self, dir: &Path, child_dirs: &[&PathBuf]) -> usize {
        let exclude_set = match compile_excludes(&self.excludes) {
            Ok(set) => set,
            Err(_) => return 0,
        };

        let walker = WalkBuilder::new(dir)
            .standard_filters(false)
            .hidden(true)
            .follow_links(false)
            .build();

        let mut count = 0;
        for entry in walker.flatten() {
            let path = entry.path();
            if exclude_set.is_match(path.strip_prefix(dir).unwrap_or(path)) {
                continue;
            }
            if !entry.file_type().is_some_and(|ft| ft.is_file()) || !is_source_file(path) {
                continue;
            }
            if child_dirs.iter().any(|child| path.starts_with(child)) {
                continue;
            }
            count += 1;
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn scanner(root: &Path) -> WorkspaceScanner {
        WorkspaceScanner::new(root, WorkspaceScanner::default_excludes())
    }

    #[test]
    fn discovers_root_and_nested_packages() {
        let temp = tempfile::TempDir::new().unwrap();
        let root = temp.path();
        write(
            &root.join("package.json"),
            r#"{ "name": "root", "workspaces": ["packages/*"] }"#,
        );
        write(
            &root.join("packages/app/package.json"),
            r#"{ "name": "@acme/app", "dependencies": { "react": "*" } }"#,
        );
        write(&root.join("packages/app/src/index.tsx"), "export {};");
        write(&root.join("packages/app/src/util.ts"), "export {};");

        let records = scanner(root).collect().unwrap();
        assert_eq!(records.len(), 2);

        let root_record = records.iter().find(|r| r.name == "root").unwrap();
        assert!(root_record.is_root);
        assert!(root_record.has_child_packages);

        let app = records.iter().find(|r| r.name == "@acme/app").unwrap();
        assert!(!app.is_root);
        assert_eq!(app.file_count, 2);
        assert!(app.declared_prod_deps.contains("react"));
    }

    #[test]
    fn parent_file_count_stops_at_child_boundary() {
        let temp = tempfile::TempDir::new().unwrap();
        let root = temp.path();
        write(&root.join("package.json"), r#"{ "name": "root" }"#);
        write(&root.join("scripts/tool.js"), "export {};");
        write(
            &root.join("packages/lib/package.json"),
            r#"{ "name": "lib" }"#,
        );
        write(&root.join("packages/lib/src/a.ts"), "export {};");
        write(&root.join("packages/lib/src/b.ts"), "export {};");

        let records = scanner(root).collect().unwrap();
        let root_record = records.iter().find(|r| r.name == "root").unwrap();
        let lib = records.iter().find(|r| r.name == "lib").unwrap();
        assert_eq!(root_record.file_count, 1);
        assert_eq!(lib.file_count, 2);
    }

    #[test]
    fn duplicate_names_first_discovered_wins() {
        let temp = tempfile::TempDir::new().unwrap();
        let root = temp.path();
        write(&root.join("package.json"), r#"{ "name": "root" }"#);
        write(&root.join("a/package.json"), r#"{ "name": "dup", "version": "1.0.0" }"#);
        write(&root.join("b/package.json"), r#"{ "name": "dup", "version": "2.0.0" }"#);

        let records = scanner(root).collect().unwrap();
        let dups: Vec<_> = records.iter().filter(|r| r.name == "dup").collect();
        assert_eq!(dups.len(), 1);
        // "a" sorts before "b", so the 1.0.0 record survives.
        assert_eq!(dups[0].version.as_deref(), Some("1.0.0"));
    }

    #[test]
    fn malformed_manifest_is_skipped() {
        let temp = tempfile::TempDir::new().unwrap();
        let root = temp.path();
        write(&root.join("package.json"), r#"{ "name": "root" }"#);
        write(&root.join("broken/package.json"), "{ nope");

        let records = scanner(root).collect().unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn node_modules_manifests_are_excluded() {
        let temp = tempfile::TempDir::new().unwrap();
        let root = temp.path();
        write(&root.join("package.json"), r#"{ "name": "root" }"#);
        write(
            &root.join("node_modules/react/package.json"),
            r#"{ "name": "react" }"#,
        );

        let records = scanner(root).collect().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "root");
    }

    #[test]
    fn tooling_flags_are_detected() {
        let temp = tempfile::TempDir::new().unwrap();
        let root = temp.path();
        write(
            &root.join("package.json"),
            r#"{
                "name": "root",
                "devDependencies": { "typescript": "*", "autoprefixer": "*" },
                "scripts": { "build": "tsc -b" }
            }"#,
        );
        write(&root.join("tsconfig.json"), "{}");
        write(&root.join("tailwind.config.js"), "module.exports = {}");
        write(&root.join(".eslintrc.json"), "{}");

        let records = scanner(root).collect().unwrap();
        let record = &records[0];
        assert!(record.has_tsconfig);
        assert!(record.has_tailwind_config);
        assert!(record.has_autoprefixer);
        assert!(record.has_eslint_config);
        assert!(record.tooling_deps.contains("typescript"));
    }

    #[test]
    fn missing_root_is_an_error() {
        let temp = tempfile::TempDir::new().unwrap();
        let missing = temp.path().join("gone");
        assert!(matches!(
            scanner(&missing).collect(),
            Err(WorkspaceError::RootNotFound(_))
        ));
    }
}

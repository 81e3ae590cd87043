//! Source file location.
//!
//! Walks a directory tree and returns every analyzable JavaScript or
//! TypeScript file, honoring exclusion globs. Ordering is whatever the
//! walker produces; callers must not rely on it for correctness.

use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;

use crate::error::{Result, WorkspaceError};

/// Extensions recognized as analyzable source files.
pub const SOURCE_EXTENSIONS: &[&str] = &["js", "jsx", "ts", "tsx", "mjs", "cjs", "mts", "cts"];

/// True if the path carries a recognized source extension.
pub fn is_source_file(path: &Path) -> bool {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => SOURCE_EXTENSIONS.contains(&ext),
        None => false,
    }
}

/// Compile exclusion globs into a matcher.
///
/// Patterns are matched against paths relative to the walk root, so
/// `**/node_modules/**` behaves the same regardless of where the root
/// lives on disk.
pub(crate) fn compile_excludes(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|source| WorkspaceError::InvalidExclude {
            pattern: pattern.clone(),
            source,
        })?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|source| WorkspaceError::InvalidExclude {
            pattern: patterns.join(","),
            source,
        })
}

/// Compiled exclusion matcher, for callers that check individual paths
/// instead of walking a tree.
///
/// Matching follows the same convention as the walkers here: patterns
/// apply to the path relative to the root.
#[derive(Debug, Clone)]
pub struct ExcludeSet {
    set: GlobSet,
}

impl ExcludeSet {
    pub fn compile(patterns: &[String]) -> Result<Self> {
        Ok(Self {
            set: compile_excludes(patterns)?,
        })
    }

    /// True if `path` is excluded relative to `root`. Paths outside the
    /// root are matched as given.
    pub fn is_match(&self, root: &Path, path: &Path) -> bool {
        self.set.is_match(path.strip_prefix(root).unwrap_or(path))
    }
}

/// Turn a plain directory name into a glob excluding everything under
/// any directory of that name. Values already containing glob syntax
/// pass through untouched.
pub fn dir_exclude_pattern(name: &str) -> String {
    if name.chars().any(|c| matches!(c, '*' | '?' | '[' | '{')) {
        name.to_string()
    } else {
        format!("**/{name}/**")
    }
}

/// Locate every analyzable source file under `root`.
///
/// Hidden directories are skipped; `.gitignore` files are deliberately
/// ignored so the analysis does not change shape based on VCS metadata.
pub fn locate_source_files(root: &Path, excludes: &[String]) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(WorkspaceError::RootNotFound(root.to_path_buf()));
    }
    let exclude_set = compile_excludes(excludes)?;

    let mut files = Vec::new();
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
        let relative = path.strip_prefix(root).unwrap_or(path);
        if exclude_set.is_match(relative) {
            continue;
        }
        if entry.file_type().is_some_and(|ft| ft.is_file()) && is_source_file(path) {
            files.push(path.to_path_buf());
        }
    }

    Ok(files)
}

/// Locate files whose name satisfies a predicate, honoring the same
/// exclusion and hidden-directory rules as source location.
///
/// Used by the alias resolver to find tsconfig-style config files.
pub fn locate_named_files(
    root: &Path,
    excludes: &[String],
    matches: impl Fn(&str) -> bool,
) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(WorkspaceError::RootNotFound(root.to_path_buf()));
    }
    let exclude_set = compile_excludes(excludes)?;

    let mut files = Vec::new();
    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .hidden(true)
        .follow_links(false)
        .build();

    for entry in walker.flatten() {
        let path = entry.path();
        if exclude_set.is_match(path.strip_prefix(root).unwrap_or(path)) {
            continue;
        }
        if entry.file_type().is_some_and(|ft| ft.is_file())
            && path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(&matches)
        {
            files.push(path.to_path_buf());
        }
    }

    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "export {};\n").unwrap();
    }

    #[test]
    fn recognizes_source_extensions() {
        assert!(is_source_file(Path::new("a.ts")));
        assert!(is_source_file(Path::new("a.tsx")));
        assert!(is_source_file(Path::new("a.cjs")));
        assert!(is_source_file(Path::new("a.mts")));
        assert!(!is_source_file(Path::new("a.css")));
        assert!(!is_source_file(Path::new("a.json")));
        assert!(!is_source_file(Path::new("Makefile")));
    }

    #[test]
    fn locates_files_and_respects_excludes() {
        let temp = tempfile::TempDir::new().unwrap();
        let root = temp.path();
        touch(&root.join("src/index.ts"));
        touch(&root.join("src/util.js"));
        touch(&root.join("node_modules/react/index.js"));
        touch(&root.join("dist/out.js"));
        fs::write(root.join("src/readme.md"), "hi").unwrap();

        let excludes = vec![
            "**/node_modules/**".to_string(),
            "**/dist/**".to_string(),
        ];
        let mut files = locate_source_files(root, &excludes).unwrap();
        files.sort();

        assert_eq!(
            files,
            vec![root.join("src/index.ts"), root.join("src/util.js")]
        );
    }

    #[test]
    fn exclude_set_matches_root_relative_paths() {
        let excludes = vec!["**/node_modules/**".to_string(), "**/dist/**".to_string()];
        let set = ExcludeSet::compile(&excludes).unwrap();
        let root = Path::new("/ws");

        assert!(set.is_match(root, Path::new("/ws/node_modules/react/index.js")));
        assert!(set.is_match(root, Path::new("/ws/pkg/dist/out.js")));
        assert!(!set.is_match(root, Path::new("/ws/pkg/src/index.ts")));
        // A path under a differently-rooted workspace still matches by
        // its own shape.
        assert!(set.is_match(Path::new("/other"), Path::new("a/node_modules/b.js")));
    }

    #[test]
    fn plain_names_become_directory_globs() {
        assert_eq!(dir_exclude_pattern("vendor"), "**/vendor/**");
        assert_eq!(dir_exclude_pattern("**/tmp/**"), "**/tmp/**");
        assert_eq!(dir_exclude_pattern("*.gen.ts"), "*.gen.ts");
    }

    #[test]
    fn missing_root_is_an_error() {
        let temp = tempfile::TempDir::new().unwrap();
        let missing = temp.path().join("nope");
        assert!(matches!(
            locate_source_files(&missing, &[]),
            Err(WorkspaceError::RootNotFound(_))
        ));
    }

    #[test]
    fn hidden_directories_are_skipped() {
        let temp = tempfile::TempDir::new().unwrap();
        let root = temp.path();
        touch(&root.join(".cache/gen.ts"));
        touch(&root.join("src/index.ts"));

        let files = locate_source_files(root, &[]).unwrap();
        assert_eq!(files, vec![root.join("src/index.ts")]);
    }
}

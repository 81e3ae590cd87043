//! Single-file import analysis.
//!
//! Parses one source file, collects its outward module references, and
//! classifies each as internal (another workspace package) or external
//! (a registry package). Relative paths and platform builtins never
//! cross a package boundary and are dropped.

pub mod visitor;

use std::collections::BTreeMap;
use std::path::Path;

use oxc_allocator::Allocator;
use oxc_ast_visit::Visit;
use sha2::{Digest, Sha256};

use crate::aliases::AliasStore;
use crate::builtins::is_builtin_module;
use crate::index::PackageIndex;
use crate::parse::parse_source;
use visitor::ImportCollector;

/// Shared lookup context for per-file analysis.
pub struct AnalyzerContext<'a> {
    pub index: &'a PackageIndex,
    pub aliases: &'a AliasStore,
}

/// The analysis result for one source file.
///
/// Retained by the incremental builder keyed by absolute path; the
/// content hash decides whether a changed file actually needs
/// re-aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileAnalysis {
    /// Owning package name, or `None` for files outside every package.
    pub package: Option<String>,
    /// Hex SHA-256 of the file content.
    pub content_hash: String,
    /// Internal reference counts keyed by target package name.
    pub internal_refs: BTreeMap<String, u32>,
    /// External reference counts keyed by normalized package name.
    pub external_refs: BTreeMap<String, u32>,
}

impl FileAnalysis {
    /// An analysis contributing nothing; used for unreadable files.
    pub fn empty(package: Option<String>, content_hash: String) -> Self {
        Self {
            package,
            content_hash,
            internal_refs: BTreeMap::new(),
            external_refs: BTreeMap::new(),
        }
    }

    /// The set of packages this file depends on.
    pub fn internal_deps(&self) -> impl Iterator<Item = &str> {
        self.internal_refs.keys().map(String::as_str)
    }
}

/// Hex SHA-256 of file content.
pub fn content_hash(source: &str) -> String {
    let digest = Sha256::digest(source.as_bytes());
    let mut out = String::with_capacity(64);
    for byte in digest {
        use std::fmt::Write;
        let _ = write!(out, "{byte:02x}");
    }
    out
}

/// Analyze a file on disk.
///
/// Unreadable files degrade to an empty analysis (owning package still
/// attributed) rather than failing the scan.
pub async fn analyze_file(path: &Path, ctx: &AnalyzerContext<'_>) -> FileAnalysis {
    match tokio::fs::read_to_string(path).await {
        Ok(source) => analyze_source(path, &source, ctx),
        Err(err) => {
            tracing::debug!(path = %path.display(), %err, "unreadable source file; empty analysis");
            let package = ctx.index.owner_of(path).map(str::to_string);
            FileAnalysis::empty(package, content_hash(""))
        }
    }
}

/// Analyze source text as if it lived at `path`.
pub fn analyze_source(path: &Path, source: &str, ctx: &AnalyzerContext<'_>) -> FileAnalysis {
    let package = ctx.index.owner_of(path).map(str::to_string);
    let hash = content_hash(source);

    let allocator = Allocator::default();
    let Some(parsed) = parse_source(&allocator, source, path) else {
        return FileAnalysis::empty(package, hash);
    };

    // Declaration files only ever contribute types, whatever the
    // per-import markers say.
    let force_type_only = parsed.source_type.is_typescript_definition();

    let mut collector = ImportCollector::default();
    collector.visit_program(&parsed.program);

    let mut analysis = FileAnalysis::empty(package, hash);
    for reference in &collector.refs {
        let type_only = force_type_only || reference.type_only;
        classify_specifier(&reference.specifier, type_only, path, ctx, &mut analysis);
    }
    analysis
}

/// Classify one specifier into the analysis, per the resolution order:
/// relative/builtin skip, alias candidates, direct workspace name,
/// external fallback.
fn classify_specifier(
    specifier: &str,
    type_only: bool,
    file: &Path,
    ctx: &AnalyzerContext<'_>,
    analysis: &mut FileAnalysis,
) {
    if specifier.is_empty()
        || specifier.starts_with('.')
        || specifier.starts_with('/')
        || specifier.starts_with("file:")
    {
        return;
    }
    if is_builtin_module(specifier) {
        return;
    }

    let owner = analysis.package.as_deref();

    // Alias resolution: the first candidate mapping to a known package
    // settles the specifier, internal or self.
    if !ctx.aliases.is_empty() {
        for candidate in ctx.aliases.candidates(file, specifier) {
            if let Some(target) = ctx.index.owner_of(&candidate) {
                if !type_only && Some(target) != owner {
                    let target = target.to_string();
                    *analysis.internal_refs.entry(target).or_insert(0) += 1;
                }
                return;
            }
        }
    }

    // Direct workspace-name resolution. A self-import is discarded, not
    // counted as external.
    if let Some(target) = resolve_workspace_package(specifier, ctx.index) {
        if !type_only && Some(target.as_str()) != owner {
            *analysis.internal_refs.entry(target).or_insert(0) += 1;
        }
        return;
    }

    let name = normalize_external_name(specifier);
    *analysis.external_refs.entry(name).or_insert(0) += 1;
}

/// Match a specifier against known workspace package names by trying
/// progressively shorter path-segment prefixes.
///
/// Scoped specifiers keep at least two segments so nested workspace
/// names like `@scope/app/ui/button` can resolve to `@scope/app` or
/// even `@scope/app/ui`; unscoped specifiers go down to one segment.
pub fn resolve_workspace_package(specifier: &str, index: &PackageIndex) -> Option<String> {
    let segments: Vec<&str> = specifier.split('/').collect();
    let min_segments = if specifier.starts_with('@') { 2 } else { 1 };

    let mut len = segments.len();
    while len >= min_segments {
        let candidate = segments[..len].join("/");
        if index.contains_name(&candidate) {
            return Some(candidate);
        }
        len -= 1;
    }
    None
}

/// Reduce a specifier to its external package name: scoped names keep
/// `@scope/name`, unscoped names keep the first path segment.
pub fn normalize_external_name(specifier: &str) -> String {
    let mut segments = specifier.split('/');
    if specifier.starts_with('@') {
        match (segments.next(), segments.next()) {
            (Some(scope), Some(name)) => format!("{scope}/{name}"),
            _ => specifier.to_string(),
        }
    } else {
        segments.next().unwrap_or(specifier).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skein_workspace::PackageRecord;
    use std::collections::BTreeSet;
    use std::path::PathBuf;

    fn record(name: &str, dir: &str) -> PackageRecord {
        PackageRecord {
            name: name.to_string(),
            version: None,
            description: None,
            dir: PathBuf::from(dir),
            declared_prod_deps: BTreeSet::new(),
            declared_dev_deps: BTreeSet::new(),
            has_tsconfig: false,
            has_tailwind_config: false,
            has_autoprefixer: false,
            has_eslint_config: false,
            has_child_packages: false,
            tooling_deps: BTreeSet::new(),
            file_count: 0,
            is_root: false,
        }
    }

    fn index() -> PackageIndex {
        PackageIndex::new(&[
            record("@acme/app", "/ws/packages/app"),
            record("@acme/lib", "/ws/packages/lib"),
            record("plain", "/ws/packages/plain"),
            record("@acme/app/ui", "/ws/packages/app/ui"),
        ])
    }

    fn analyze(file: &str, source: &str) -> FileAnalysis {
        let index = index();
        let aliases = AliasStore::default();
        let ctx = AnalyzerContext {
            index: &index,
            aliases: &aliases,
        };
        analyze_source(Path::new(file), source, &ctx)
    }

    #[test]
    fn attributes_owner_by_longest_prefix() {
        let analysis = analyze("/ws/packages/app/ui/button.ts", "export {};");
        assert_eq!(analysis.package.as_deref(), Some("@acme/app/ui"));

        let analysis = analyze("/ws/packages/app/index.ts", "export {};");
        assert_eq!(analysis.package.as_deref(), Some("@acme/app"));

        let analysis = analyze("/elsewhere/x.ts", "export {};");
        assert_eq!(analysis.package, None);
    }

    #[test]
    fn classifies_internal_and_external() {
        let analysis = analyze(
            "/ws/packages/app/index.ts",
            "import { x } from '@acme/lib';\n\
             import lodash from 'lodash';\n\
             import merge from 'lodash/merge';\n\
             import fs from 'node:fs';\n\
             import local from './local';\n",
        );
        assert_eq!(analysis.internal_refs.get("@acme/lib"), Some(&1));
        assert_eq!(analysis.external_refs.get("lodash"), Some(&2));
        assert_eq!(analysis.external_refs.len(), 1);
    }

    #[test]
    fn self_import_is_discarded() {
        let analysis = analyze(
            "/ws/packages/app/index.ts",
            "import { x } from '@acme/app';\n",
        );
        assert!(analysis.internal_refs.is_empty());
        assert!(analysis.external_refs.is_empty());
    }

    #[test]
    fn nested_scoped_name_prefers_longest_prefix() {
        let analysis = analyze(
            "/ws/packages/lib/index.ts",
            "import { Button } from '@acme/app/ui/button';\n",
        );
        // `@acme/app/ui` is itself a workspace package and wins over
        // `@acme/app`.
        assert_eq!(analysis.internal_refs.get("@acme/app/ui"), Some(&1));
        assert!(analysis.internal_refs.get("@acme/app").is_none());
    }

    #[test]
    fn deep_import_resolves_to_package_prefix() {
        let analysis = analyze(
            "/ws/packages/app/index.ts",
            "import util from '@acme/lib/dist/util';\nimport x from 'plain/sub/path';\n",
        );
        assert_eq!(analysis.internal_refs.get("@acme/lib"), Some(&1));
        assert_eq!(analysis.internal_refs.get("plain"), Some(&1));
    }

    #[test]
    fn type_only_imports_do_not_create_internal_edges() {
        let analysis = analyze(
            "/ws/packages/app/index.ts",
            "import type { T } from '@acme/lib';\n\
             import type { U } from 'some-types';\n",
        );
        assert!(analysis.internal_refs.is_empty());
        // External accounting does not distinguish type-only.
        assert_eq!(analysis.external_refs.get("some-types"), Some(&1));
    }

    #[test]
    fn declaration_files_are_entirely_type_only() {
        let analysis = analyze(
            "/ws/packages/app/types.d.ts",
            "import { T } from '@acme/lib';\nimport { U } from 'ext';\n",
        );
        assert!(analysis.internal_refs.is_empty());
        assert_eq!(analysis.external_refs.get("ext"), Some(&1));
    }

    #[test]
    fn scoped_external_names_normalize() {
        assert_eq!(normalize_external_name("@scope/pkg/deep/path"), "@scope/pkg");
        assert_eq!(normalize_external_name("lodash/merge"), "lodash");
        assert_eq!(normalize_external_name("@broken"), "@broken");
    }

    #[test]
    fn alias_candidates_win_over_external() {
        let index = index();
        let temp = tempfile::TempDir::new().unwrap();
        let config = temp.path().join("tsconfig.json");
        std::fs::write(
            &config,
            r##"{ "compilerOptions": { "baseUrl": ".", "paths": { "#app/*": ["/ws/packages/app/src/*"] } } }"##,
        )
        .unwrap();
        let aliases = AliasStore::load(temp.path(), &[config]);
        let ctx = AnalyzerContext {
            index: &index,
            aliases: &aliases,
        };

        let file = temp.path().join("src/index.ts");
        let analysis = analyze_source(
            &file,
            "import { x } from '#app/util';\n",
            &ctx,
        );
        assert_eq!(analysis.internal_refs.get("@acme/app"), Some(&1));
        assert!(analysis.external_refs.is_empty());
    }

    #[test]
    fn sha256_hash_is_stable() {
        assert_eq!(content_hash("abc").len(), 64);
        assert_eq!(content_hash("abc"), content_hash("abc"));
        assert_ne!(content_hash("abc"), content_hash("abd"));
    }
}

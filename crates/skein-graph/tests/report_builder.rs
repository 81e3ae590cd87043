//! End-to-end builds against on-disk workspace fixtures.

use std::fs;
use std::path::{Path, PathBuf};

use skein_graph::{
    BuildRequest, DependencyReport, ReportBuilder, ReportBuilderOptions, ReportPackage,
};

fn write(root: &Path, rel: &str, contents: &str) -> PathBuf {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, contents).unwrap();
    path
}

fn manifest(name: &str, deps: &[&str], dev_deps: &[&str], container: bool) -> String {
    let deps: serde_json::Map<String, serde_json::Value> = deps
        .iter()
        .map(|d| (d.to_string(), serde_json::json!("^1.0.0")))
        .collect();
    let dev_deps: serde_json::Map<String, serde_json::Value> = dev_deps
        .iter()
        .map(|d| (d.to_string(), serde_json::json!("^1.0.0")))
        .collect();
    let mut value = serde_json::json!({
        "name": name,
        "version": "0.1.0",
        "dependencies": deps,
        "devDependencies": dev_deps,
    });
    if container {
        value["workspaces"] = serde_json::json!(["packages/*"]);
    }
    serde_json::to_string_pretty(&value).unwrap()
}

/// Two-package workspace: `@ws/a` imports `@ws/b` (declared), `lodash`
/// (declared), and `axios` (undeclared).
fn seed_basic_workspace(root: &Path) {
    write(root, "package.json", &manifest("root", &[], &[], true));
    write(
        root,
        "packages/a/package.json",
        &manifest("@ws/a", &["@ws/b", "lodash"], &[], false),
    );
    write(
        root,
        "packages/a/src/index.ts",
        "import { x } from \"@ws/b\";\nimport _ from \"lodash\";\nimport axios from \"axios\";\nexport const y = x;\n",
    );
    write(
        root,
        "packages/b/package.json",
        &manifest("@ws/b", &[], &[], false),
    );
    write(root, "packages/b/src/index.ts", "export const x = 1;\n");
}

async fn build_full(root: &Path) -> DependencyReport {
    ReportBuilder::new(root, ReportBuilderOptions::default())
        .build(BuildRequest::full())
        .await
        .unwrap()
}

fn pkg<'a>(report: &'a DependencyReport, name: &str) -> &'a ReportPackage {
    report
        .packages
        .iter()
        .find(|p| p.name == name)
        .unwrap_or_else(|| panic!("package {name} missing from report"))
}

#[tokio::test]
async fn full_build_links_packages_and_classifies_externals() {
    let tmp = tempfile::tempdir().unwrap();
    seed_basic_workspace(tmp.path());
    let report = build_full(tmp.path()).await;

    assert_eq!(report.packages.len(), 3);

    let a = pkg(&report, "@ws/a");
    assert_eq!(a.dependencies, vec!["@ws/b"]);
    assert_eq!(a.declared_deps, vec!["@ws/b"]);
    assert!(a.undeclared_deps.is_empty());
    assert_eq!(a.dependency_details[0].files, vec!["src/index.ts"]);

    let b = pkg(&report, "@ws/b");
    assert_eq!(b.references, 1);
    assert!(b.dependencies.is_empty());

    let lodash = a
        .external_dependencies
        .iter()
        .find(|e| e.name == "lodash")
        .unwrap();
    assert!(lodash.is_declared && lodash.is_used);
    assert_eq!(a.undeclared_external_deps, vec!["axios"]);

    // The container root owns both children but has no source imports
    // of its own.
    let root = pkg(&report, "root");
    assert!(root.has_child_packages);
    assert!(root.dependencies.is_empty());
}

#[tokio::test]
async fn full_build_is_idempotent() {
    let tmp = tempfile::tempdir().unwrap();
    seed_basic_workspace(tmp.path());
    let first = build_full(tmp.path()).await;
    let second = build_full(tmp.path()).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn self_imports_never_create_loops() {
    let tmp = tempfile::tempdir().unwrap();
    seed_basic_workspace(tmp.path());
    write(
        tmp.path(),
        "packages/a/src/selfish.ts",
        "import { y } from \"@ws/a\";\nexport const z = y;\n",
    );
    let report = build_full(tmp.path()).await;
    let a = pkg(&report, "@ws/a");
    assert!(!a.dependencies.contains(&"@ws/a".to_string()));
    assert!(!a.external_dependencies.iter().any(|e| e.name == "@ws/a"));
}

#[tokio::test]
async fn cycles_are_marked_on_both_ends() {
    let tmp = tempfile::tempdir().unwrap();
    seed_basic_workspace(tmp.path());
    write(
        tmp.path(),
        "packages/b/src/back.ts",
        "import { y } from \"@ws/a\";\nexport const w = y;\n",
    );
    let report = build_full(tmp.path()).await;

    assert_eq!(pkg(&report, "@ws/a").cyclic_deps, vec!["@ws/b"]);
    assert_eq!(pkg(&report, "@ws/b").cyclic_deps, vec!["@ws/a"]);
}

#[tokio::test]
async fn type_only_imports_carry_no_internal_edge() {
    let tmp = tempfile::tempdir().unwrap();
    write(tmp.path(), "package.json", &manifest("root", &[], &[], true));
    write(
        tmp.path(),
        "packages/a/package.json",
        &manifest("@ws/a", &[], &[], false),
    );
    write(
        tmp.path(),
        "packages/a/src/index.ts",
        "import type { X } from \"@ws/b\";\nexport const n: X = 1 as X;\n",
    );
    write(
        tmp.path(),
        "packages/b/package.json",
        &manifest("@ws/b", &[], &[], false),
    );
    write(
        tmp.path(),
        "packages/b/src/index.ts",
        "export type X = number;\nexport const x = 1;\n",
    );

    let report = build_full(tmp.path()).await;
    assert!(pkg(&report, "@ws/a").dependencies.is_empty());
    assert_eq!(pkg(&report, "@ws/b").references, 0);
}

#[tokio::test]
async fn path_aliases_resolve_to_workspace_packages() {
    let tmp = tempfile::tempdir().unwrap();
    write(tmp.path(), "package.json", &manifest("root", &[], &[], true));
    write(
        tmp.path(),
        "tsconfig.json",
        r##"{
  "compilerOptions": {
    // Workspace-internal shorthand.
    "paths": { "#b/*": ["./packages/b/src/*"] }
  }
}"##,
    );
    write(
        tmp.path(),
        "packages/a/package.json",
        &manifest("@ws/a", &[], &[], false),
    );
    write(
        tmp.path(),
        "packages/a/src/index.ts",
        "import { x } from \"#b/thing\";\nexport const y = x;\n",
    );
    write(
        tmp.path(),
        "packages/b/package.json",
        &manifest("@ws/b", &[], &[], false),
    );
    write(
        tmp.path(),
        "packages/b/src/thing.ts",
        "export const x = 1;\n",
    );

    let report = build_full(tmp.path()).await;
    assert_eq!(pkg(&report, "@ws/a").dependencies, vec!["@ws/b"]);
    assert!(
        pkg(&report, "@ws/a").external_dependencies.is_empty(),
        "aliased specifier must not leak into externals"
    );
}

#[tokio::test]
async fn incremental_edit_matches_a_fresh_full_build() {
    let tmp = tempfile::tempdir().unwrap();
    seed_basic_workspace(tmp.path());

    let mut builder = ReportBuilder::new(tmp.path(), ReportBuilderOptions::default());
    builder.build(BuildRequest::full()).await.unwrap();

    let edited = write(
        tmp.path(),
        "packages/b/src/extra.ts",
        "import dayjs from \"dayjs\";\nexport const now = dayjs();\n",
    );
    let changed = edited.canonicalize().unwrap();
    let incremental = builder
        .build(BuildRequest::changes(vec![changed]))
        .await
        .unwrap();

    let fresh = build_full(tmp.path()).await;
    assert_eq!(incremental, fresh);
    assert_eq!(
        pkg(&incremental, "@ws/b").undeclared_external_deps,
        vec!["dayjs"]
    );
    // The new file must show up in the owner's file count, not just its
    // reference lists.
    assert_eq!(pkg(&incremental, "@ws/b").file_count, 2);
}

#[tokio::test]
async fn changes_under_excluded_directories_are_ignored() {
    let tmp = tempfile::tempdir().unwrap();
    seed_basic_workspace(tmp.path());

    let mut builder = ReportBuilder::new(tmp.path(), ReportBuilderOptions::default());
    let first = builder.build(BuildRequest::full()).await.unwrap();

    let planted = write(
        tmp.path(),
        "packages/a/node_modules/evil/index.js",
        "import \"bogus-pkg\";\n",
    );
    let changed = planted.canonicalize().unwrap();
    let incremental = builder
        .build(BuildRequest::changes(vec![changed]))
        .await
        .unwrap();

    assert_eq!(first, incremental);
    assert!(pkg(&incremental, "@ws/a")
        .external_dependencies
        .iter()
        .all(|ext| ext.name != "bogus-pkg"));
}

#[tokio::test]
async fn plain_exclude_names_filter_directories_anywhere() {
    let tmp = tempfile::tempdir().unwrap();
    seed_basic_workspace(tmp.path());
    write(
        tmp.path(),
        "packages/a/generated/client.ts",
        "import \"left-pad\";\n",
    );

    let mut excludes = skein_workspace::WorkspaceScanner::default_excludes();
    excludes.push(skein_workspace::dir_exclude_pattern("generated"));

    let report = ReportBuilder::new(
        tmp.path(),
        ReportBuilderOptions {
            excludes,
            ..Default::default()
        },
    )
    .build(BuildRequest::full())
    .await
    .unwrap();

    assert_eq!(pkg(&report, "@ws/a").file_count, 1);
    assert!(pkg(&report, "@ws/a")
        .external_dependencies
        .iter()
        .all(|ext| ext.name != "left-pad"));
}

#[tokio::test]
async fn unchanged_content_reuses_the_last_report() {
    let tmp = tempfile::tempdir().unwrap();
    seed_basic_workspace(tmp.path());

    let mut builder = ReportBuilder::new(tmp.path(), ReportBuilderOptions::default());
    let first = builder.build(BuildRequest::full()).await.unwrap();

    // Rewrite a file with identical bytes; the hash gate must keep the
    // cached analysis.
    let path = tmp.path().join("packages/b/src/index.ts");
    let contents = fs::read_to_string(&path).unwrap();
    fs::write(&path, contents).unwrap();

    let again = builder
        .build(BuildRequest::changes(vec![path.canonicalize().unwrap()]))
        .await
        .unwrap();
    assert_eq!(first, again);
}

#[tokio::test]
async fn deleting_a_file_drops_its_edges() {
    let tmp = tempfile::tempdir().unwrap();
    seed_basic_workspace(tmp.path());

    let mut builder = ReportBuilder::new(tmp.path(), ReportBuilderOptions::default());
    let before = builder.build(BuildRequest::full()).await.unwrap();
    assert_eq!(pkg(&before, "@ws/b").references, 1);

    let path = tmp
        .path()
        .join("packages/a/src/index.ts")
        .canonicalize()
        .unwrap();
    fs::remove_file(&path).unwrap();

    let after = builder
        .build(BuildRequest::changes(vec![path]))
        .await
        .unwrap();
    assert!(pkg(&after, "@ws/a").dependencies.is_empty());
    assert_eq!(pkg(&after, "@ws/b").references, 0);
}

#[tokio::test]
async fn manifest_changes_force_a_full_rescan() {
    let tmp = tempfile::tempdir().unwrap();
    seed_basic_workspace(tmp.path());

    let mut builder = ReportBuilder::new(tmp.path(), ReportBuilderOptions::default());
    let before = builder.build(BuildRequest::full()).await.unwrap();
    assert_eq!(before.packages.len(), 3);

    let new_manifest = write(
        tmp.path(),
        "packages/c/package.json",
        &manifest("@ws/c", &[], &[], false),
    );
    write(
        tmp.path(),
        "packages/c/src/index.ts",
        "export const c = 1;\n",
    );

    let after = builder
        .build(BuildRequest::changes(vec![new_manifest
            .canonicalize()
            .unwrap()]))
        .await
        .unwrap();
    assert_eq!(after.packages.len(), 4);
    assert_eq!(pkg(&after, "@ws/c").file_count, 1);
}

#[tokio::test]
async fn missing_workspaces_fail_with_a_clear_error() {
    let tmp = tempfile::tempdir().unwrap();
    let err = ReportBuilder::new(tmp.path().join("nope"), ReportBuilderOptions::default())
        .build(BuildRequest::full())
        .await
        .unwrap_err();
    assert!(matches!(err, skein_graph::GraphError::RootNotFound(_)));

    // An existing directory with no manifests is a distinct failure.
    let err = ReportBuilder::new(tmp.path(), ReportBuilderOptions::default())
        .build(BuildRequest::full())
        .await
        .unwrap_err();
    assert!(matches!(err, skein_graph::GraphError::NoPackagesFound(_)));
}

#[tokio::test]
async fn dependency_partition_is_complete() {
    let tmp = tempfile::tempdir().unwrap();
    seed_basic_workspace(tmp.path());
    write(
        tmp.path(),
        "packages/a/src/more.ts",
        "import { x } from \"@ws/b/deep/path\";\nexport const m = x;\n",
    );
    let report = build_full(tmp.path()).await;

    for package in &report.packages {
        let mut union: Vec<String> = package
            .declared_deps
            .iter()
            .chain(package.undeclared_deps.iter())
            .cloned()
            .collect();
        union.sort();
        assert_eq!(union, package.dependencies, "{}", package.name);
    }
}

//! `package.json` parsing.
//!
//! Focuses on the dependency-related fields and `scripts`; other manifest
//! metadata (engines, exports maps, etc.) is irrelevant to dependency
//! analysis and ignored by serde.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Maximum allowed size for package.json files (10MB).
///
/// Anything larger is treated as malformed rather than read into memory.
const MAX_MANIFEST_SIZE: u64 = 10 * 1024 * 1024;

/// Parsed `package.json` structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    /// Package name. Manifests without a name cannot become graph nodes.
    pub name: Option<String>,
    /// Package version (display only).
    pub version: Option<String>,
    /// Package description (display only).
    pub description: Option<String>,
    /// Production dependencies.
    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,
    /// Development dependencies.
    #[serde(default, rename = "devDependencies")]
    pub dev_dependencies: BTreeMap<String, String>,
    /// npm scripts, used to infer script-invoked tooling.
    #[serde(default)]
    pub scripts: BTreeMap<String, String>,
    /// Workspace globs. Either an array or the `{ "packages": [...] }`
    /// object form; kept as a raw value because only presence matters.
    #[serde(default)]
    pub workspaces: Option<serde_json::Value>,
    /// File path this was loaded from.
    #[serde(skip)]
    pub path: PathBuf,
}

impl Manifest {
    /// Load a manifest from disk.
    ///
    /// Returns `None` for unreadable, oversized, or syntactically invalid
    /// files; discovery treats those manifests as absent.
    pub fn load(path: &Path) -> Option<Self> {
        let metadata = match fs::metadata(path) {
            Ok(m) => m,
            Err(err) => {
                tracing::debug!(path = %path.display(), %err, "skipping unreadable manifest");
                return None;
            }
        };
        if metadata.len() > MAX_MANIFEST_SIZE {
            tracing::warn!(path = %path.display(), size = metadata.len(), "skipping oversized manifest");
            return None;
        }

        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(err) => {
                tracing::debug!(path = %path.display(), %err, "skipping unreadable manifest");
                return None;
            }
        };

        match serde_json::from_str::<Manifest>(&content) {
            Ok(mut manifest) => {
                manifest.path = path.to_path_buf();
                Some(manifest)
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "skipping malformed manifest");
                None
            }
        }
    }

    /// The directory that owns this manifest.
    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or(Path::new(""))
    }

    /// True if the manifest declares `name` under `dependencies` or
    /// `devDependencies`.
    pub fn declares(&self, name: &str) -> bool {
        self.dependencies.contains_key(name) || self.dev_dependencies.contains_key(name)
    }
}

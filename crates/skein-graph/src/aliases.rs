//! Path alias resolution.
//!
//! tsconfig/jsconfig files scattered through a workspace each define path
//! mappings scoped to their own directory subtree. This module loads them
//! (following `extends` chains, tolerating comments and trailing commas)
//! and turns an import specifier into candidate filesystem paths.
//!
//! The parsed-config cache is owned by the loader instance rather than a
//! process-wide singleton, so concurrent analyses of different workspaces
//! in one process cannot cross-contaminate.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use path_clean::PathClean;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Deserialize;

/// Config file names that can define path aliases.
const ALIAS_CONFIG_NAMES: &[&str] = &["tsconfig.json", "jsconfig.json"];

/// One alias pattern with its target templates.
///
/// Patterns carry at most one `*` wildcard; the matched text substitutes
/// into each target template.
#[derive(Debug, Clone)]
struct AliasEntry {
    pattern: String,
    targets: Vec<String>,
}

/// The aliases in force for one directory subtree.
#[derive(Debug, Clone)]
struct AliasScope {
    /// Directory of the defining config; only files under it are covered.
    dir: PathBuf,
    /// Base directory target templates resolve against.
    base_url: PathBuf,
    entries: Vec<AliasEntry>,
}

/// All alias configuration discovered in a workspace.
///
/// Scopes are held deepest-first: for an importing file, the closest
/// enclosing config applies first and shallower ones are fallbacks.
#[derive(Debug, Default)]
pub struct AliasStore {
    scopes: Vec<AliasScope>,
}

impl AliasStore {
    /// Load alias configuration for every tsconfig/jsconfig under `root`.
    ///
    /// Config files that cannot be read or parsed are treated as absent.
    pub fn load(root: &Path, config_paths: &[PathBuf]) -> Self {
        let mut loader = ConfigLoader::default();
        let mut scopes = Vec::new();

        for path in config_paths {
            let Some(resolved) = loader.resolve(path) else {
                continue;
            };
            if resolved.paths.is_empty() {
                continue;
            }
            let dir = path.parent().unwrap_or(root).to_path_buf();

            let mut entries: Vec<AliasEntry> = resolved
                .paths
                .iter()
                .map(|(pattern, targets)| AliasEntry {
                    pattern: pattern.clone(),
                    targets: targets.clone(),
                })
                .collect();
            // Most specific pattern first: longer fixed prefix wins when
            // several patterns could match the same specifier.
            entries.sort_by(|a, b| {
                let fixed = |p: &AliasEntry| p.pattern.split('*').next().unwrap_or("").len();
                fixed(b).cmp(&fixed(a)).then_with(|| a.pattern.cmp(&b.pattern))
            });

            scopes.push(AliasScope {
                dir,
                base_url: resolved.base_url.clone(),
                entries,
            });
        }

        // Deepest scope first.
        scopes.sort_by(|a, b| {
            let depth_a = a.dir.components().count();
            let depth_b = b.dir.components().count();
            depth_b.cmp(&depth_a).then_with(|| a.dir.cmp(&b.dir))
        });

        Self { scopes }
    }

    /// True if a file name is an alias config candidate.
    pub fn is_alias_config_name(name: &str) -> bool {
        ALIAS_CONFIG_NAMES.contains(&name)
            || (name.starts_with("tsconfig.") && name.ends_with(".json"))
    }

    /// True if no scope defines any alias.
    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Candidate paths an import specifier could resolve to, for an
    /// import appearing in `importing_file`.
    ///
    /// Only configs whose directory contains the importing file apply;
    /// the deepest one that yields any candidate wins. Candidates are
    /// extension-less templates and are not checked for existence.
    pub fn candidates(&self, importing_file: &Path, specifier: &str) -> Vec<PathBuf> {
        let Some(file_dir) = importing_file.parent() else {
            return Vec::new();
        };

        for scope in &self.scopes {
            if !file_dir.starts_with(&scope.dir) {
                continue;
            }
            let mut out = Vec::new();
            for entry in &scope.entries {
                let Some(captured) = match_wildcard(&entry.pattern, specifier) else {
                    continue;
                };
                for target in &entry.targets {
                    let substituted = target.replacen('*', captured, 1);
                    out.push(scope.base_url.join(substituted).clean());
                }
            }
            if !out.is_empty() {
                return out;
            }
        }

        Vec::new()
    }
}

/// Match `specifier` against an alias pattern with at most one `*`.
///
/// Returns the text captured by the wildcard, or `""` for an exact match
/// of a wildcard-free pattern.
fn match_wildcard<'s>(pattern: &str, specifier: &'s str) -> Option<&'s str> {
    match pattern.split_once('*') {
        None => (pattern == specifier).then_some(""),
        Some((prefix, suffix)) => {
            if specifier.len() < prefix.len() + suffix.len() {
                return None;
            }
            if specifier.starts_with(prefix) && specifier.ends_with(suffix) {
                Some(&specifier[prefix.len()..specifier.len() - suffix.len()])
            } else {
                None
            }
        }
    }
}

/// Raw tsconfig shape; only the fields alias resolution needs.
#[derive(Debug, Deserialize)]
struct RawTsconfig {
    extends: Option<serde_json::Value>,
    #[serde(rename = "compilerOptions")]
    compiler_options: Option<RawCompilerOptions>,
}

#[derive(Debug, Deserialize)]
struct RawCompilerOptions {
    #[serde(rename = "baseUrl")]
    base_url: Option<String>,
    paths: Option<std::collections::BTreeMap<String, Vec<String>>>,
}

/// Fully merged view of one config file after its extends chain.
#[derive(Debug)]
struct ResolvedConfig {
    base_url: PathBuf,
    paths: std::collections::BTreeMap<String, Vec<String>>,
}

/// Loads and memoizes alias configs, following `extends`.
#[derive(Default)]
struct ConfigLoader {
    cache: FxHashMap<PathBuf, Option<Arc<ResolvedConfig>>>,
}

impl ConfigLoader {
    fn resolve(&mut self, path: &Path) -> Option<Arc<ResolvedConfig>> {
        let mut visiting = FxHashSet::default();
        self.resolve_inner(path, &mut visiting)
    }

    fn resolve_inner(
        &mut self,
        path: &Path,
        visiting: &mut FxHashSet<PathBuf>,
    ) -> Option<Arc<ResolvedConfig>> {
        let key = path.to_path_buf().clean();
        if let Some(cached) = self.cache.get(&key) {
            return cached.clone();
        }
        // Circular extends: treat the repeat as a no-op.
        if !visiting.insert(key.clone()) {
            tracing::warn!(path = %key.display(), "circular tsconfig extends chain");
            return None;
        }

        let resolved = self.load_merged(&key, visiting);
        visiting.remove(&key);
        self.cache.insert(key, resolved.clone());
        resolved
    }

    fn load_merged(
        &mut self,
        path: &Path,
        visiting: &mut FxHashSet<PathBuf>,
    ) -> Option<Arc<ResolvedConfig>> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(err) => {
                tracing::debug!(path = %path.display(), %err, "unreadable alias config");
                return None;
            }
        };
        let raw: RawTsconfig = match serde_json::from_str(&strip_jsonc(&content)) {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "malformed alias config; ignoring");
                return None;
            }
        };

        let config_dir = path.parent().unwrap_or(Path::new("")).to_path_buf();

        // Parent table first; child entries overlay it (child wins).
        let mut paths = std::collections::BTreeMap::new();
        let mut base_url: Option<PathBuf> = None;
        for parent_path in self.extends_targets(&raw, &config_dir) {
            if let Some(parent) = self.resolve_inner(&parent_path, visiting) {
                paths.extend(parent.paths.clone());
                base_url = Some(parent.base_url.clone());
            }
        }

        if let Some(options) = &raw.compiler_options {
            if let Some(own_base) = &options.base_url {
                base_url = Some(config_dir.join(own_base).clean());
            }
            if let Some(own_paths) = &options.paths {
                paths.extend(own_paths.clone());
            }
        }

        Some(Arc::new(ResolvedConfig {
            base_url: base_url.unwrap_or(config_dir),
            paths,
        }))
    }

    /// Resolve `extends` values (string or array) to config file paths.
    ///
    /// Package-style extends (`"@tsconfig/node20"`) would require npm
    /// resolution; if the target does not exist on disk it is treated as
    /// absent.
    fn extends_targets(&self, raw: &RawTsconfig, config_dir: &Path) -> Vec<PathBuf> {
        let mut specs = Vec::new();
        match &raw.extends {
            Some(serde_json::Value::String(s)) => specs.push(s.clone()),
            Some(serde_json::Value::Array(items)) => {
                for item in items {
                    if let Some(s) = item.as_str() {
                        specs.push(s.to_string());
                    }
                }
            }
            _ => {}
        }

        specs
            .into_iter()
            .filter_map(|spec| {
                let target = config_dir.join(&spec).clean();
                if target.is_file() {
                    return Some(target);
                }
                // "extends": "./tsconfig.base" may omit the extension.
                let with_json = PathBuf::from(format!("{}.json", target.display()));
                if with_json.is_file() {
                    return Some(with_json);
                }
                tracing::debug!(
                    extends = spec,
                    "unresolvable tsconfig extends; treating as absent"
                );
                None
            })
            .collect()
    }
}

/// Strip `//` and `/* */` comments and trailing commas so tsconfig-style
/// JSONC parses with serde_json. Comments are replaced with spaces to
/// keep byte offsets roughly intact for error messages.
pub fn strip_jsonc(input: &str) -> String {
    #[derive(PartialEq)]
    enum State {
        Normal,
        InString,
        LineComment,
        BlockComment,
    }

    let mut out = String::with_capacity(input.len());
    let mut state = State::Normal;
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        match state {
            State::Normal => match ch {
                '"' => {
                    state = State::InString;
                    out.push(ch);
                }
                '/' if chars.peek() == Some(&'/') => {
                    chars.next();
                    state = State::LineComment;
                    out.push_str("  ");
                }
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    state = State::BlockComment;
                    out.push_str("  ");
                }
                _ => out.push(ch),
            },
            State::InString => {
                out.push(ch);
                match ch {
                    '\\' => {
                        if let Some(next) = chars.next() {
                            out.push(next);
                        }
                    }
                    '"' => state = State::Normal,
                    _ => {}
                }
            }
            State::LineComment => {
                if ch == '\n' {
                    state = State::Normal;
                    out.push('\n');
                } else {
                    out.push(' ');
                }
            }
            State::BlockComment => {
                if ch == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    state = State::Normal;
                    out.push_str("  ");
                } else if ch == '\n' {
                    out.push('\n');
                } else {
                    out.push(' ');
                }
            }
        }
    }

    strip_trailing_commas(&out)
}

fn strip_trailing_commas(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = String::with_capacity(input.len());
    let mut in_string = false;
    let mut i = 0;

    while i < bytes.len() {
        let ch = bytes[i] as char;
        if in_string {
            out.push(ch);
            if ch == '\\' && i + 1 < bytes.len() {
                out.push(bytes[i + 1] as char);
                i += 1;
            } else if ch == '"' {
                in_string = false;
            }
        } else if ch == '"' {
            in_string = true;
            out.push(ch);
        } else if ch == ',' {
            // Drop the comma if the next non-whitespace closes a scope.
            let mut j = i + 1;
            while j < bytes.len() && (bytes[j] as char).is_whitespace() {
                j += 1;
            }
            if j < bytes.len() && (bytes[j] == b'}' || bytes[j] == b']') {
                // skip
            } else {
                out.push(ch);
            }
        } else {
            out.push(ch);
        }
        i += 1;
    }

    out
}

//! Tooling heuristics.
//!
//! Two concerns live here: extracting the dependency names a package's npm
//! scripts invoke (so `tsc` in a build script marks `typescript` as
//! script-invoked), and the curated tables of well-known tooling packages
//! the report assembler consults for tooling-only classification.

use std::collections::{BTreeMap, BTreeSet};

/// Wrapper commands that forward to another binary; the real command is
/// the token after them.
const COMMAND_WRAPPERS: &[&str] = &["npx", "yarn", "pnpm", "npm", "bunx", "exec", "dlx", "run"];

/// Binaries whose npm package carries a different name.
const BIN_TO_PACKAGE: &[(&str, &str)] = &[
    ("tsc", "typescript"),
    ("tsserver", "typescript"),
    ("vite", "vite"),
    ("next", "next"),
    ("nuxt", "nuxt"),
    ("vue-cli-service", "@vue/cli-service"),
    ("webpack", "webpack"),
    ("rollup", "rollup"),
    ("esbuild", "esbuild"),
    ("swc", "@swc/cli"),
    ("babel", "@babel/cli"),
    ("eslint", "eslint"),
    ("prettier", "prettier"),
    ("stylelint", "stylelint"),
    ("jest", "jest"),
    ("vitest", "vitest"),
    ("mocha", "mocha"),
    ("playwright", "@playwright/test"),
    ("cypress", "cypress"),
    ("storybook", "storybook"),
    ("tailwindcss", "tailwindcss"),
    ("postcss", "postcss"),
    ("nodemon", "nodemon"),
    ("ts-node", "ts-node"),
    ("tsx", "tsx"),
    ("turbo", "turbo"),
    ("nx", "nx"),
    ("lerna", "lerna"),
    ("rimraf", "rimraf"),
    ("concurrently", "concurrently"),
    ("cross-env", "cross-env"),
    ("husky", "husky"),
    ("lint-staged", "lint-staged"),
];

/// Type-check tooling packages, gated on `hasTsconfig`.
const TYPECHECK_TOOLS: &[&str] = &["typescript", "ts-node", "tsx", "tslib"];

/// CSS tooling packages, gated on the tailwind/autoprefixer flags.
const CSS_TOOLS: &[&str] = &["tailwindcss", "autoprefixer", "postcss", "postcss-cli", "sass", "less"];

/// Lint/format tooling packages, gated on `hasEslintConfig`.
const LINT_TOOLS: &[&str] = &["eslint", "prettier", "stylelint"];

/// Test-runner tooling packages, gated on script invocation.
const TEST_TOOLS: &[&str] = &["jest", "vitest", "mocha", "jasmine", "ava", "karma", "cypress"];

/// Broader patterns of packages that exist to be run, not imported.
const TOOLING_PREFIXES: &[&str] = &[
    "eslint-",
    "prettier-",
    "stylelint-",
    "@typescript-eslint/",
    "@eslint/",
    "babel-",
    "@babel/",
    "webpack-",
    "rollup-",
    "postcss-",
    "jest-",
    "@vitejs/",
    "@swc/",
    "@commitlint/",
    "grunt-",
    "gulp-",
];

const TOOLING_SUFFIXES: &[&str] = &["-loader", "-webpack-plugin", "-cli"];

/// Extract the dependency names invoked by npm scripts.
///
/// Each script is split on shell connectors, env-var assignments and
/// wrapper commands (`npx`, `yarn`, ...) are skipped, and the leading
/// binary of each segment is mapped back to a declared dependency name.
pub fn script_invoked_tools(
    scripts: &BTreeMap<String, String>,
    declared: &BTreeSet<String>,
) -> BTreeSet<String> {
    let mut tools = BTreeSet::new();

    for command in scripts.values() {
        for segment in split_shell_segments(command) {
            if let Some(package) = leading_binary(&segment, declared) {
                tools.insert(package);
            }
        }
    }

    tools
}

/// Split a shell command line on `&&`, `||`, `;` and `|`.
fn split_shell_segments(command: &str) -> Vec<String> {
    command
        .split("&&")
        .flat_map(|part| part.split("||"))
        .flat_map(|part| part.split(';'))
        .flat_map(|part| part.split('|'))
        .map(|part| part.trim().to_string())
        .filter(|part| !part.is_empty())
        .collect()
}

/// Map the first real token of a command segment to a declared package.
fn leading_binary(segment: &str, declared: &BTreeSet<String>) -> Option<String> {
    for token in segment.split_whitespace() {
        // Env-var assignments precede the command (`NODE_ENV=prod tsc`).
        if token.contains('=') {
            continue;
        }
        if COMMAND_WRAPPERS.contains(&token) {
            continue;
        }
        if token.starts_with('-') {
            continue;
        }
        // First real token found; map it or give up on this segment.
        if declared.contains(token) {
            return Some(token.to_string());
        }
        if let Some((_, package)) = BIN_TO_PACKAGE.iter().find(|(bin, _)| *bin == token) {
            if declared.contains(*package) {
                return Some((*package).to_string());
            }
        }
        return None;
    }
    None
}

/// Well-known type-check tooling.
pub fn is_typecheck_tool(name: &str) -> bool {
    TYPECHECK_TOOLS.contains(&name)
}

/// Well-known CSS tooling.
pub fn is_css_tool(name: &str) -> bool {
    CSS_TOOLS.contains(&name)
}

/// Well-known lint/format tooling.
pub fn is_lint_tool(name: &str) -> bool {
    LINT_TOOLS.contains(&name)
}

/// Well-known test runners.
pub fn is_test_tool(name: &str) -> bool {
    TEST_TOOLS.contains(&name)
}

/// Broader check for packages that are plausibly tooling by naming
/// convention. Used only in combination with dev-only declaration or
/// script invocation, never on its own.
pub fn matches_tooling_pattern(name: &str) -> bool {
    if is_typecheck_tool(name)
        || is_css_tool(name)
        || is_lint_tool(name)
        || is_test_tool(name)
    {
        return true;
    }
    if BIN_TO_PACKAGE.iter().any(|(_, package)| *package == name) {
        return true;
    }
    TOOLING_PREFIXES.iter().any(|prefix| name.starts_with(prefix))
        || TOOLING_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
}

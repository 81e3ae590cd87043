//! Node.js builtin module table.
//!
//! Import specifiers naming a platform builtin never cross a package
//! boundary and are excluded from both internal and external accounting.

use phf::phf_set;

/// Builtin module names as of Node 22.
static NODE_BUILTINS: phf::Set<&'static str> = phf_set! {
    "assert",
    "assert/strict",
    "async_hooks",
    "buffer",
    "child_process",
    "cluster",
    "console",
    "constants",
    "crypto",
    "dgram",
    "diagnostics_channel",
    "dns",
    "dns/promises",
    "domain",
    "events",
    "fs",
    "fs/promises",
    "http",
    "http2",
    "https",
    "inspector",
    "inspector/promises",
    "module",
    "net",
    "os",
    "path",
    "path/posix",
    "path/win32",
    "perf_hooks",
    "process",
    "punycode",
    "querystring",
    "readline",
    "readline/promises",
    "repl",
    "stream",
    "stream/consumers",
    "stream/promises",
    "stream/web",
    "string_decoder",
    "sys",
    "timers",
    "timers/promises",
    "tls",
    "trace_events",
    "tty",
    "url",
    "util",
    "util/types",
    "v8",
    "vm",
    "wasi",
    "worker_threads",
    "zlib",
};

/// True if the specifier names a Node builtin, with or without the
/// `node:` prefix.
pub fn is_builtin_module(specifier: &str) -> bool {
    let bare = specifier.strip_prefix("node:").unwrap_or(specifier);
    NODE_BUILTINS.contains(bare)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_bare_and_prefixed_builtins() {
        assert!(is_builtin_module("fs"));
        assert!(is_builtin_module("fs/promises"));
        assert!(is_builtin_module("node:path"));
        assert!(!is_builtin_module("react"));
        assert!(!is_builtin_module("@scope/fs"));
    }
}

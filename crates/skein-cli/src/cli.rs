//! Command-line interface definition using clap's derive macros.
//!
//! - `skein report` - analyze a workspace and emit a dependency report
//! - `skein watch` - keep the report live and serve it over HTTP

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Skein - dependency graph analysis for JavaScript/TypeScript workspaces
#[derive(Parser, Debug)]
#[command(
    name = "skein",
    version,
    about = "Dependency graph analysis for JavaScript/TypeScript workspaces",
    long_about = "Skein discovers the packages of a JavaScript/TypeScript workspace,\n\
                  parses their source files, and reports which packages depend on\n\
                  which, including undeclared dependencies, dependency cycles, and\n\
                  unused external dependencies."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available skein subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Analyze a workspace and print a dependency report
    ///
    /// Scans the workspace for package manifests, parses every source
    /// file, and prints a summary of internal dependencies, cycles, and
    /// external dependency problems.
    Report(ReportArgs),

    /// Watch a workspace and serve a live report over HTTP
    ///
    /// Rebuilds the report when source files change and pushes updates
    /// to connected clients via Server-Sent Events.
    Watch(WatchArgs),
}

/// Arguments for the report command
#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Workspace root to analyze
    #[arg(default_value = ".", value_name = "ROOT")]
    pub root: PathBuf,

    /// Write the full JSON report to a file
    #[arg(short, long, value_name = "FILE")]
    pub out: Option<PathBuf>,

    /// Print the full JSON report to stdout instead of a summary
    #[arg(long)]
    pub json: bool,

    /// Additional directory names or glob patterns to exclude
    ///
    /// Repeatable. Plain names match the directory anywhere in the
    /// tree. node_modules, dist, build, out, .next and coverage are
    /// always excluded.
    #[arg(long = "exclude", value_name = "NAME")]
    pub exclude: Vec<String>,
}

/// Arguments for the watch command
#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Workspace root to watch
    #[arg(default_value = ".", value_name = "ROOT")]
    pub root: PathBuf,

    /// Port for the report server
    #[arg(short, long, default_value_t = 7127)]
    pub port: u16,

    /// Debounce window for batching file changes, in milliseconds
    #[arg(long, default_value_t = 200)]
    pub debounce_ms: u64,

    /// Additional directory names or glob patterns to exclude
    #[arg(long = "exclude", value_name = "NAME")]
    pub exclude: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_defaults() {
        let cli = Cli::try_parse_from(["skein", "report"]).unwrap();
        let Command::Report(args) = cli.command else {
            panic!("expected report command");
        };
        assert_eq!(args.root, PathBuf::from("."));
        assert!(args.out.is_none());
        assert!(!args.json);
        assert!(args.exclude.is_empty());
    }

    #[test]
    fn report_accepts_repeated_excludes() {
        let cli = Cli::try_parse_from([
            "skein", "report", "fixtures", "--exclude", "vendor", "--exclude", "tmp", "--json",
        ])
        .unwrap();
        let Command::Report(args) = cli.command else {
            panic!("expected report command");
        };
        assert_eq!(args.root, PathBuf::from("fixtures"));
        assert_eq!(args.exclude, vec!["vendor", "tmp"]);
        assert!(args.json);
    }

    #[test]
    fn watch_defaults() {
        let cli = Cli::try_parse_from(["skein", "watch"]).unwrap();
        let Command::Watch(args) = cli.command else {
            panic!("expected watch command");
        };
        assert_eq!(args.port, 7127);
        assert_eq!(args.debounce_ms, 200);
    }

    #[test]
    fn verbose_and_quiet_conflict() {
        assert!(Cli::try_parse_from(["skein", "-v", "-q", "report"]).is_err());
    }
}

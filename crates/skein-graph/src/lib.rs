//! # Skein analysis core
//!
//! Builds a package-level dependency graph for a JavaScript/TypeScript
//! workspace and assembles it into a [`report::DependencyReport`].
//!
//! ## Architecture
//!
//! ```text
//! skein-workspace (packages, source files)
//!         │
//!         ▼
//! ┌──────────────────────────────────────────────┐
//! │ GraphBuilder                                 │
//! │   per file: parse (oxc) → ImportCollector    │
//! │             → classify specifiers            │
//! │   aggregate: AggregatedGraph                 │
//! └──────────────┬───────────────────────────────┘
//!                ▼
//!      cycle detection (cycles::find_cyclic_edges)
//!                ▼
//!      report assembly (report::assemble_report)
//! ```
//!
//! The [`incremental::ReportBuilder`] wraps the whole pipeline with
//! per-file caches so a long-running process can re-analyze only the
//! files that changed.
//!
//! All of this is single-threaded by design: long scans periodically
//! yield to the tokio runtime instead of fanning out, so a host process
//! (e.g. the watch server) stays responsive without any locking in the
//! analysis path.

pub mod aggregate;
pub mod aliases;
pub mod analyzer;
pub mod builder;
pub mod builtins;
pub mod cycles;
pub mod error;
pub mod incremental;
pub mod index;
pub mod parse;
pub mod progress;
pub mod report;

pub use aggregate::{AggregatedGraph, EdgeMap};
pub use aliases::AliasStore;
pub use analyzer::{analyze_file, analyze_source, AnalyzerContext, FileAnalysis};
pub use builder::GraphBuilder;
pub use cycles::{edge_key, find_cyclic_edges};
pub use error::{GraphError, Result};
pub use incremental::{is_critical_path, BuildRequest, ReportBuilder, ReportBuilderOptions};
pub use index::PackageIndex;
pub use progress::{AnalysisEvents, Snapshot};
pub use report::{
    assemble_report, DependencyDetail, DependencyReport, ExternalDependencyRecord, ReportPackage,
};

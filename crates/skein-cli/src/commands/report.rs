//! The `skein report` command: one full analysis, printed or written
//! out.

use skein_graph::{
    AnalysisEvents, BuildRequest, DependencyReport, ReportBuilder, ReportBuilderOptions,
};
use skein_workspace::{dir_exclude_pattern, WorkspaceScanner};

use crate::cli::ReportArgs;
use crate::error::Result;

pub async fn report_execute(args: ReportArgs) -> Result<()> {
    let mut excludes = WorkspaceScanner::default_excludes();
    excludes.extend(args.exclude.iter().map(|name| dir_exclude_pattern(name)));

    let events = AnalysisEvents {
        on_progress: Some(Box::new(|message, _| {
            tracing::debug!("{message}");
        })),
        on_snapshot: None,
    };

    let mut builder = ReportBuilder::new(&args.root, ReportBuilderOptions { excludes, events });
    let report = builder.build(BuildRequest::full()).await?;

    if let Some(out) = &args.out {
        let json = serde_json::to_string_pretty(&report)?;
        tokio::fs::write(out, json).await?;
        tracing::info!(path = %out.display(), "report written");
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if args.out.is_none() {
        print_summary(&report);
    }

    Ok(())
}

/// Human-readable digest: one block per package, skipping what is
/// unremarkable.
fn print_summary(report: &DependencyReport) {
    println!("{} packages in {}", report.packages.len(), report.root_dir);

    for package in &report.packages {
        let version = package.version.as_deref().unwrap_or("-");
        println!(
            "\n{} {} ({} files, {} inbound refs)",
            package.name, version, package.file_count, package.references
        );

        if !package.dependencies.is_empty() {
            println!("  depends on: {}", package.dependencies.join(", "));
        }
        if !package.undeclared_deps.is_empty() {
            println!("  undeclared: {}", package.undeclared_deps.join(", "));
        }
        if !package.cyclic_deps.is_empty() {
            println!("  cycles with: {}", package.cyclic_deps.join(", "));
        }
        if !package.undeclared_external_deps.is_empty() {
            println!(
                "  undeclared externals: {}",
                package.undeclared_external_deps.join(", ")
            );
        }
        if !package.unused_external_deps.is_empty() {
            println!(
                "  unused externals: {}",
                package.unused_external_deps.join(", ")
            );
        }
    }
}

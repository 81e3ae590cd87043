//! Skein CLI entry point: argument parsing, logging setup, and command
//! dispatch.

use std::process::ExitCode;

use clap::Parser;
use skein_cli::{cli, commands, logger};

#[tokio::main]
async fn main() -> ExitCode {
    let args = cli::Cli::parse();

    logger::init_logger(args.verbose, args.quiet, args.no_color);

    let result = match args.command {
        cli::Command::Report(report_args) => commands::report_execute(report_args).await,
        cli::Command::Watch(watch_args) => commands::watch_execute(watch_args).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

//! Logging setup built on the `tracing` ecosystem.
//!
//! Verbosity resolution order: `--verbose`, `--quiet`, the `RUST_LOG`
//! environment variable, then an info-level default for skein crates.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the global tracing subscriber. Call once at startup.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    let filter = if verbose {
        EnvFilter::new("skein_cli=debug,skein_graph=debug,skein_workspace=debug")
    } else if quiet {
        EnvFilter::new("skein_cli=error,skein_graph=error,skein_workspace=error")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("skein_cli=info,skein_graph=info,skein_workspace=info")
        })
    };

    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_ansi(!no_color)
        .without_time();

    // Ignore the error if a subscriber is already installed (tests).
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

//! CLI command implementations.

mod report;
mod watch;

pub use report::report_execute;
pub use watch::watch_execute;

//! Skein CLI - dependency graph reports for JavaScript/TypeScript
//! workspaces.
//!
//! This crate wraps `skein-graph` in a command-line interface:
//!
//! - [`cli`] - clap argument definitions
//! - [`commands`] - `report` and `watch` implementations
//! - [`watch`] - file watcher, shared state, and the live report server
//! - [`error`] - CLI error types
//! - [`logger`] - tracing setup

pub mod cli;
pub mod commands;
pub mod error;
pub mod logger;
pub mod watch;

pub use error::{CliError, Result};

//! CLI module for pastebox
//!
//! Provides the command-line interface:
//! - init: create the data directory structure
//! - serve: boot the store and serve HTTP

mod args;
mod commands;
mod errors;

pub use args::{Cli, Command};
pub use commands::{init, run, run_command, serve};
pub use errors::{CliError, CliResult};

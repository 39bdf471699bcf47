//! CLI argument definitions using clap
//!
//! Commands:
//! - pastebox init --config <path>
//! - pastebox serve --config <path> [--port <port>]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// pastebox - a minimal, durable paste and file sharing service
#[derive(Parser, Debug)]
#[command(name = "pastebox")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Initialize a new pastebox data directory
    Init {
        /// Path to configuration file
        #[arg(long, default_value = "./pastebox.json")]
        config: PathBuf,
    },

    /// Start the pastebox HTTP server
    Serve {
        /// Path to configuration file
        #[arg(long, default_value = "./pastebox.json")]
        config: PathBuf,

        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

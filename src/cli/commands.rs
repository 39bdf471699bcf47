//! CLI command implementations
//!
//! Boot is strict: configuration load, directory check, full index scan.
//! Any failure halts startup; the server never serves over a store that
//! did not open cleanly.

use std::fs;
use std::path::Path;

use serde_json::json;

use crate::config::Config;
use crate::http_server::HttpServer;
use crate::observability::{Logger, Severity};
use crate::store::PasteStore;

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Init { config } => init(&config),
        Command::Serve { config, port } => serve(&config, port),
    }
}

/// Initialize a new pastebox data directory
///
/// Creates the directory structure only; writes no records and does not
/// start the server.
pub fn init(config_path: &Path) -> CliResult<()> {
    let config = Config::load(config_path)?;
    let data_dir = config.data_path();

    if is_initialized(data_dir) {
        return Err(CliError::already_initialized());
    }

    let dirs = [data_dir.join("index"), data_dir.join("uploads")];

    for dir in &dirs {
        fs::create_dir_all(dir).map_err(|e| {
            CliError::config_error(format!("Failed to create directory {:?}: {}", dir, e))
        })?;
    }

    println!("{}", json!({"initialized": true, "data_dir": config.data_dir}));

    Ok(())
}

/// Start the pastebox HTTP server
///
/// Startup sequence:
/// 1. Configuration load
/// 2. Initialization check
/// 3. Store open (full checksum-verified index scan; corruption is fatal)
/// 4. HTTP activation
pub fn serve(config_path: &Path, port_override: Option<u16>) -> CliResult<()> {
    let mut config = Config::load(config_path)?;
    if let Some(port) = port_override {
        config.port = port;
    }

    let data_dir = config.data_path();

    if !is_initialized(data_dir) {
        return Err(CliError::not_initialized());
    }

    let store = PasteStore::open(data_dir, config.max_upload_bytes)
        .map_err(|e| CliError::boot_failed(format!("Store open failed: {}", e)))?;

    Logger::log(
        Severity::Info,
        "store_opened",
        &[
            ("data_dir", &config.data_dir),
            ("records", &store.record_count().to_string()),
        ],
    );

    let server = HttpServer::new(config, store);

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(async {
        server
            .start()
            .await
            .map_err(|e| CliError::boot_failed(format!("HTTP server failed: {}", e)))
    })?;

    Ok(())
}

/// Check if a data directory is initialized
fn is_initialized(data_dir: &Path) -> bool {
    data_dir.join("index").exists() && data_dir.join("uploads").exists()
}

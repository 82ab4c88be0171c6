//! CLI command implementations
//!
//! Boot order for `serve`:
//! 1. Configuration load (file, then environment)
//! 2. Logging
//! 3. Record types (built-in, then `schema_dir`)
//! 4. Storage connect; failure degrades instead of aborting
//! 5. HTTP serving until Ctrl-C, then storage close

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::config::Config;
use crate::http_server::{AppState, HttpServer, HttpServerConfig};
use crate::logging;
use crate::schema::{SchemaLoader, SchemaRegistry};
use crate::service::DocumentService;
use crate::storage::StorageHandle;

use super::args::Command;
use super::errors::{CliError, CliResult};

/// Config file read when `--config` is not given, if it exists.
pub const DEFAULT_CONFIG_PATH: &str = "./carebase.json";

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Serve { config, ephemeral } => serve(config.as_deref(), ephemeral),
        Command::CheckConfig { config } => check_config(config.as_deref()),
    }
}

/// Loads the config file (explicit path must exist) and applies the environment.
pub fn resolve_config(path: Option<&Path>) -> CliResult<Config> {
    let mut config = match path {
        Some(path) => Config::load(path)?,
        None => Config::load_or_default(Some(Path::new(DEFAULT_CONFIG_PATH)))?,
    };
    config.apply_env()?;
    Ok(config)
}

/// Built-in record types plus any found in `schema_dir`.
pub fn build_registry(config: &Config) -> CliResult<SchemaRegistry> {
    let mut registry = SchemaRegistry::with_builtin_types()?;
    if let Some(dir) = &config.schema_dir {
        let loaded = SchemaLoader::new(dir).load_into(&mut registry)?;
        info!(count = loaded, dir = %dir.display(), "record types loaded");
    }
    Ok(registry)
}

/// Wires registry, storage and service into HTTP state.
pub fn build_state(
    config: &Config,
    registry: SchemaRegistry,
    storage: StorageHandle,
) -> Arc<AppState> {
    let service = DocumentService::new(Arc::new(registry), storage)
        .with_unknown_fields(config.unknown_field_policy());
    AppState::new(service, HttpServerConfig::from(config), config.database_name.clone())
}

/// Start the HTTP server
pub fn serve(config_path: Option<&Path>, ephemeral: bool) -> CliResult<()> {
    let config = resolve_config(config_path)?;
    logging::init(&config.log_level, config.log_format)?;

    let registry = build_registry(&config)?;
    info!(types = ?registry.type_names().collect::<Vec<_>>(), "record types registered");

    let storage = if ephemeral {
        info!("ephemeral mode: records are kept in memory");
        StorageHandle::in_memory()
    } else {
        StorageHandle::connect(&config.storage_config())
    };

    let server = HttpServer::new(build_state(&config, registry, storage.clone()));

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))?;

    let served = rt.block_on(server.start());
    storage.close();

    served.map_err(|e| CliError::boot_failed(format!("HTTP server failed: {}", e)))
}

#[derive(Debug, Serialize)]
struct ConfigReport<'a> {
    valid: bool,
    listen: String,
    data_dir: String,
    database_name: &'a str,
    strict_fields: bool,
    record_types: Vec<&'a str>,
    collections: Vec<&'a str>,
}

/// Validate configuration and record types, print a JSON report
pub fn check_config(config_path: Option<&Path>) -> CliResult<()> {
    let config = resolve_config(config_path)?;
    let registry = build_registry(&config)?;

    let report = ConfigReport {
        valid: true,
        listen: config.socket_addr(),
        data_dir: config.data_dir.display().to_string(),
        database_name: &config.database_name,
        strict_fields: config.strict_fields,
        record_types: registry.type_names().collect(),
        collections: registry.collections().collect(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

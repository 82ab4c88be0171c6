//! CLI module for carebase
//!
//! Provides command-line interface for:
//! - serve: Boot the service and serve HTTP until Ctrl-C
//! - check-config: Validate configuration and record types

mod args;
mod commands;
mod errors;

pub use args::{Cli, Command};
pub use commands::{
    build_registry, build_state, check_config, resolve_config, run, run_command, serve,
    DEFAULT_CONFIG_PATH,
};
pub use errors::{CliError, CliResult};

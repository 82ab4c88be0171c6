//! CLI-specific error types
//!
//! Every CLI error is fatal: `main` prints it and exits non-zero.

use thiserror::Error;

use crate::config::ConfigError;
use crate::logging::LoggingError;
use crate::schema::SchemaError;

/// CLI error
#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Schema(#[from] SchemaError),

    #[error("{0}")]
    Logging(#[from] LoggingError),

    #[error("Boot failed: {0}")]
    BootFailed(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    pub fn boot_failed(msg: impl Into<String>) -> Self {
        CliError::BootFailed(msg.into())
    }

    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            CliError::Config(_) => "CARE_CLI_CONFIG_ERROR",
            CliError::Schema(_) => "CARE_CLI_SCHEMA_ERROR",
            CliError::Logging(_) => "CARE_CLI_LOGGING_ERROR",
            CliError::BootFailed(_) => "CARE_CLI_BOOT_FAILED",
            CliError::Json(_) => "CARE_CLI_JSON_ERROR",
        }
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

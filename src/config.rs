//! Configuration for carebase
//!
//! Loaded from a JSON file (every key optional), then overridden from the
//! environment:
//!
//! - `PORT` → `port`
//! - `DATABASE_URL` → `data_dir`
//! - `DATABASE_NAME` → `database_name`
//! - `CAREBASE_STRICT_FIELDS` → `strict_fields`

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::schema::UnknownFieldPolicy;
use crate::storage::StorageConfig;

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config JSON in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },
}

impl ConfigError {
    fn invalid(key: &str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::Read { .. } => "CARE_CONFIG_READ",
            ConfigError::Parse { .. } => "CARE_CONFIG_PARSE",
            ConfigError::InvalidValue { .. } => "CARE_CONFIG_INVALID",
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Process configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Host to bind to
    pub host: String,
    pub port: u16,

    /// Root of the file store
    pub data_dir: PathBuf,
    /// Subdirectory of `data_dir` holding this deployment's collections
    pub database_name: String,

    /// Extra record types, one JSON file each
    pub schema_dir: Option<PathBuf>,
    /// Reject records carrying undeclared fields
    pub strict_fields: bool,

    pub default_limit: usize,
    pub max_limit: usize,

    /// Empty means any origin
    pub cors_origins: Vec<String>,

    pub log_level: String,
    pub log_format: LogFormat,

    /// Set when `DATABASE_URL` was present in the environment
    #[serde(skip)]
    pub database_url_from_env: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            data_dir: PathBuf::from("./data"),
            database_name: "carebase".to_string(),
            schema_dir: None,
            strict_fields: false,
            default_limit: crate::service::DEFAULT_LIMIT,
            max_limit: 500,
            cors_origins: Vec::new(),
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            database_url_from_env: false,
        }
    }
}

impl Config {
    /// Loads and validates a config file. Environment overrides are not applied.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        let config: Config = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Loads `path` when given and present, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> ConfigResult<Self> {
        match path {
            Some(path) if path.exists() => Self::load(path),
            _ => Ok(Self::default()),
        }
    }

    /// Applies overrides from the process environment, then re-validates.
    pub fn apply_env(&mut self) -> ConfigResult<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides from `lookup`, then re-validates.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT") {
            self.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::invalid("PORT", format!("'{}' is not a port number", port)))?;
        }
        if let Some(dir) = lookup("DATABASE_URL") {
            self.data_dir = PathBuf::from(dir);
            self.database_url_from_env = true;
        }
        if let Some(name) = lookup("DATABASE_NAME") {
            self.database_name = name;
        }
        if let Some(strict) = lookup("CAREBASE_STRICT_FIELDS") {
            self.strict_fields = parse_bool(&strict).ok_or_else(|| {
                ConfigError::invalid("CAREBASE_STRICT_FIELDS", format!("'{}' is not a boolean", strict))
            })?;
        }
        self.validate()
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.port == 0 {
            return Err(ConfigError::invalid("port", "must be > 0"));
        }
        if self.database_name.trim().is_empty() {
            return Err(ConfigError::invalid("database_name", "must not be empty"));
        }
        if self.max_limit == 0 {
            return Err(ConfigError::invalid("max_limit", "must be > 0"));
        }
        if self.default_limit > self.max_limit {
            return Err(ConfigError::invalid(
                "default_limit",
                format!("{} exceeds max_limit {}", self.default_limit, self.max_limit),
            ));
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn storage_config(&self) -> StorageConfig {
        StorageConfig {
            data_dir: self.data_dir.clone(),
            database_name: self.database_name.clone(),
        }
    }

    pub fn unknown_field_policy(&self) -> UnknownFieldPolicy {
        if self.strict_fields {
            UnknownFieldPolicy::Reject
        } else {
            UnknownFieldPolicy::Ignore
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.socket_addr(), "0.0.0.0:8000");
        assert_eq!(config.database_name, "carebase");
        assert_eq!(config.default_limit, 50);
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.unknown_field_policy(), UnknownFieldPolicy::Ignore);
        assert!(!config.database_url_from_env);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("carebase.json");
        fs::write(&path, r#"{"port": 9100, "log_format": "json"}"#).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.port, 9100);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.max_limit, 500);
    }

    #[test]
    fn test_invalid_json_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("carebase.json");
        fs::write(&path, "{ port: ").unwrap();

        assert_eq!(Config::load(&path).unwrap_err().code(), "CARE_CONFIG_PARSE");
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_or_default(Some(&dir.path().join("absent.json"))).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config
            .apply_overrides(lookup(&[
                ("PORT", "8081"),
                ("DATABASE_URL", "/var/lib/carebase"),
                ("DATABASE_NAME", "eldercare"),
                ("CAREBASE_STRICT_FIELDS", "true"),
            ]))
            .unwrap();

        assert_eq!(config.port, 8081);
        assert!(config.database_url_from_env);
        assert_eq!(config.storage_config().data_dir, PathBuf::from("/var/lib/carebase"));
        assert_eq!(config.storage_config().database_name, "eldercare");
        assert_eq!(config.unknown_field_policy(), UnknownFieldPolicy::Reject);
    }

    #[test]
    fn test_bad_port_override_rejected() {
        let mut config = Config::default();
        let err = config.apply_overrides(lookup(&[("PORT", "eighty")])).unwrap_err();
        assert_eq!(err.code(), "CARE_CONFIG_INVALID");
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_validate_rejects_inconsistent_limits() {
        let config = Config {
            default_limit: 600,
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            database_name: " ".into(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}

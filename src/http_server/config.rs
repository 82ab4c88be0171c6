//! HTTP Server Configuration
//!
//! Bind address, CORS origins and list limits for the HTTP surface.

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::service::DEFAULT_LIMIT;

/// HTTP server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpServerConfig {
    /// Host to bind to (default: "0.0.0.0")
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind to (default: 8000)
    #[serde(default = "default_port")]
    pub port: u16,

    /// CORS allowed origins; empty allows any origin
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Records returned by list endpoints when `limit` is omitted
    #[serde(default = "default_limit")]
    pub default_limit: usize,

    /// Larger `limit` values are capped to this
    #[serde(default = "default_max_limit")]
    pub max_limit: usize,

    /// Whether the store location came from `DATABASE_URL`
    #[serde(default)]
    pub database_url_set: bool,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

fn default_max_limit() -> usize {
    500
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
            default_limit: default_limit(),
            max_limit: default_max_limit(),
            database_url_set: false,
        }
    }
}

impl HttpServerConfig {
    /// Create a new config with specified port
    pub fn with_port(port: u16) -> Self {
        Self {
            port,
            ..Default::default()
        }
    }

    /// Get the socket address string
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl From<&Config> for HttpServerConfig {
    fn from(config: &Config) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
            cors_origins: config.cors_origins.clone(),
            default_limit: config.default_limit,
            max_limit: config.max_limit,
            database_url_set: config.database_url_from_env,
        }
    }
}

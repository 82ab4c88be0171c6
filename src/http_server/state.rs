//! Shared handler state.

use std::sync::Arc;

use crate::service::DocumentService;

use super::config::HttpServerConfig;

/// State shared across handlers
pub struct AppState {
    pub service: DocumentService,
    pub config: HttpServerConfig,
    /// Database name reported by the diagnostic endpoint
    pub database_name: String,
}

impl AppState {
    pub fn new(
        service: DocumentService,
        config: HttpServerConfig,
        database_name: impl Into<String>,
    ) -> Arc<Self> {
        Arc::new(Self {
            service,
            config,
            database_name: database_name.into(),
        })
    }
}

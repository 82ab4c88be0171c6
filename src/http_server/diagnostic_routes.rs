//! Diagnostic HTTP Routes
//!
//! Liveness and storage diagnostics. These answer even when storage is down.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;

use super::state::AppState;

pub const ROOT_MESSAGE: &str = "Elder Care Service Backend is running";

#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub message: &'static str,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Storage diagnostic served at `/test`
#[derive(Debug, Serialize)]
pub struct DiagnosticResponse {
    pub backend: &'static str,
    pub database: &'static str,
    pub database_name: Option<String>,
    /// "Set" when `DATABASE_URL` configured the store
    pub database_url: &'static str,
    pub connection_status: &'static str,
    pub collections: Vec<String>,
    pub detail: String,
}

/// Create diagnostic routes
pub fn diagnostic_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/test", get(diagnostic_handler))
        .with_state(state)
}

async fn root_handler() -> Json<RootResponse> {
    Json(RootResponse {
        message: ROOT_MESSAGE,
    })
}

async fn health_handler() -> impl IntoResponse {
    let response = HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    (StatusCode::OK, Json(response))
}

async fn diagnostic_handler(State(state): State<Arc<AppState>>) -> Json<DiagnosticResponse> {
    let status = state.service.storage_status().await;
    let database_url = if state.config.database_url_set {
        "Set"
    } else {
        "Not Set"
    };

    let response = if status.connected {
        DiagnosticResponse {
            backend: "Running",
            database: "Connected",
            database_name: Some(state.database_name.clone()),
            database_url,
            connection_status: "Connected",
            collections: status.collections,
            detail: status.detail,
        }
    } else {
        DiagnosticResponse {
            backend: "Running",
            database: "Not Available",
            database_name: None,
            database_url,
            connection_status: "Not Connected",
            collections: Vec::new(),
            detail: status.detail,
        }
    };
    Json(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_response_serialization() {
        let json = serde_json::to_value(RootResponse { message: ROOT_MESSAGE }).unwrap();
        assert_eq!(json, serde_json::json!({"message": "Elder Care Service Backend is running"}));
    }

    #[test]
    fn test_health_response_serialization() {
        let response = HealthResponse {
            status: "ok".to_string(),
            version: "0.1.0".to_string(),
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("ok"));
    }
}

//! # carebase HTTP Server Module
//!
//! Thin axum layer over the document service.
//!
//! # Endpoints
//!
//! - `/` - Service banner
//! - `/health` - Health check
//! - `/test` - Storage diagnostics
//! - `/api/care-requests` - Submit and list care requests
//! - `/api/records/:type_name` - Submit and list any declared record type

pub mod config;
pub mod diagnostic_routes;
pub mod errors;
pub mod record_routes;
pub mod server;
pub mod state;

pub use config::HttpServerConfig;
pub use errors::{ApiError, ApiResult, ErrorResponse};
pub use server::{build_router, HttpServer};
pub use state::AppState;

//! carebase - schema-validated document store backend for elder care requests
//!
//! Inbound records are validated against declared record types, stored in one
//! collection per type, and sanitized into transport-safe JSON on the way out.

pub mod cli;
pub mod config;
pub mod http_server;
pub mod logging;
pub mod sanitizer;
pub mod schema;
pub mod service;
pub mod storage;

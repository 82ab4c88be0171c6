//! # HTTP API Errors
//!
//! Maps service failures onto status codes and a JSON error body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::schema::{FieldViolation, SchemaError};
use crate::service::ServiceError;
use crate::storage::StorageError;

pub type ApiResult<T> = Result<T, ApiError>;

/// HTTP API errors
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid query parameter
    #[error("Invalid query parameter: {0}")]
    InvalidQueryParam(String),

    /// Request body is not JSON
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl ApiError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidQueryParam(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidBody(_) => StatusCode::BAD_REQUEST,

            ApiError::Service(ServiceError::Schema(e)) => match e {
                SchemaError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
                SchemaError::UnknownType(_) => StatusCode::NOT_FOUND,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Service(ServiceError::Storage(e)) => match e {
                StorageError::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
                StorageError::WriteFailed { .. } | StorageError::ReadFailed { .. } => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidQueryParam(_) => "CARE_INVALID_QUERY_PARAM",
            ApiError::InvalidBody(_) => "CARE_INVALID_BODY",
            ApiError::Service(e) => e.code(),
        }
    }

    fn violations(&self) -> Option<Vec<FieldViolation>> {
        match self {
            ApiError::Service(ServiceError::Schema(e)) => {
                e.as_validation().map(|v| v.violations().to_vec())
            }
            _ => None,
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub violations: Option<Vec<FieldViolation>>,
}

impl From<&ApiError> for ErrorResponse {
    fn from(err: &ApiError) -> Self {
        Self {
            error: err.to_string(),
            code: err.code(),
            status: err.status_code().as_u16(),
            violations: err.violations(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.code(), error = %self, "request failed");
        } else {
            tracing::debug!(code = self.code(), error = %self, "request rejected");
        }
        let body = Json(ErrorResponse::from(&self));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ValidationError;

    fn validation_error() -> ApiError {
        let err = ValidationError::new("CareRequest", vec![FieldViolation::missing_field("phone")]);
        ApiError::from(ServiceError::Schema(SchemaError::from(err)))
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(validation_error().status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            ApiError::from(ServiceError::Schema(SchemaError::unknown_type("Booking"))).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(ServiceError::Storage(StorageError::unavailable("down"))).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::from(ServiceError::Storage(StorageError::write_rejected("x", "no")))
                .status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::InvalidQueryParam("limit".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_body_carries_violations() {
        let err = validation_error();
        let body = serde_json::to_value(ErrorResponse::from(&err)).unwrap();
        assert_eq!(body["code"], "CARE_VALIDATION_FAILED");
        assert_eq!(body["status"], 422);
        assert_eq!(body["violations"][0]["field"], "phone");
    }

    #[test]
    fn test_body_omits_violations_for_other_errors() {
        let err = ApiError::InvalidQueryParam("limit".into());
        let body = serde_json::to_value(ErrorResponse::from(&err)).unwrap();
        assert!(body.get("violations").is_none());
        assert_eq!(body["status"], 400);
    }
}

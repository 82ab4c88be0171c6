//! Record HTTP Routes
//!
//! Submit and list endpoints. `/care-requests` is the fixed route for the
//! built-in care request type; `/records/:type_name` serves every declared type.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::sanitizer::TRANSPORT_ID_FIELD;
use crate::schema::builtin::CARE_REQUEST;
use crate::schema::{parse_field_text, RecordType};
use crate::service::ServiceError;
use crate::storage::{DocumentId, Filter, ID_FIELD};

use super::config::HttpServerConfig;
use super::errors::{ApiError, ApiResult};
use super::state::AppState;

const LIMIT_PARAM: &str = "limit";

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: String,
}

/// Parsed list query.
///
/// `limit` is capped at the configured maximum. `id` and declared fields of the
/// record type become equality filters, typed by their field kind. Any other
/// parameter is ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct ListParams {
    pub limit: usize,
    pub filter: Filter,
}

impl ListParams {
    pub fn parse(
        query: &HashMap<String, String>,
        record_type: &RecordType,
        config: &HttpServerConfig,
    ) -> ApiResult<Self> {
        let limit = match query.get(LIMIT_PARAM) {
            None => config.default_limit,
            Some(raw) => raw.trim().parse::<usize>().map_err(|_| {
                ApiError::InvalidQueryParam(format!(
                    "limit must be a non-negative integer, got '{}'",
                    raw
                ))
            })?,
        };
        let limit = limit.min(config.max_limit);

        // Sorted so the filter is independent of query-string order.
        let mut fields: Vec<_> = query
            .iter()
            .filter(|(key, _)| key.as_str() != LIMIT_PARAM)
            .collect();
        fields.sort();

        let mut filter = Filter::new();
        for (key, value) in fields {
            if key == TRANSPORT_ID_FIELD {
                let id: DocumentId = value.trim().parse().map_err(|_| {
                    ApiError::InvalidQueryParam(format!("'{}' is not a record id", value))
                })?;
                filter = filter.eq(ID_FIELD, id);
                continue;
            }

            let Some(field) = record_type.field(key) else {
                debug!(
                    record_type = %record_type.name,
                    param = %key,
                    "ignoring undeclared query parameter"
                );
                continue;
            };
            let stored = parse_field_text(field, value)
                .map_err(|violation| ApiError::InvalidQueryParam(violation.to_string()))?;
            filter = filter.eq(key.clone(), stored);
        }

        Ok(Self { limit, filter })
    }
}

/// Create record routes
pub fn record_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/care-requests",
            get(list_care_requests_handler).post(create_care_request_handler),
        )
        .route(
            "/records/:type_name",
            get(list_records_handler).post(create_record_handler),
        )
        .with_state(state)
}

async fn submit(
    state: &AppState,
    type_name: &str,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<CreatedResponse>)> {
    let Json(payload) = body.map_err(|e| ApiError::InvalidBody(e.body_text()))?;
    let id = state.service.submit(type_name, &payload).await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id: id.to_string() })))
}

async fn list(
    state: &AppState,
    type_name: &str,
    query: &HashMap<String, String>,
) -> ApiResult<Json<Vec<Value>>> {
    let record_type = state
        .service
        .registry()
        .get(type_name)
        .map_err(ServiceError::from)?;
    let params = ListParams::parse(query, record_type, &state.config)?;
    let records = state
        .service
        .list(type_name, params.filter, params.limit)
        .await?;
    Ok(Json(records))
}

async fn create_care_request_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<CreatedResponse>)> {
    submit(&state, CARE_REQUEST, body).await
}

async fn list_care_requests_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<Json<Vec<Value>>> {
    list(&state, CARE_REQUEST, &query).await
}

async fn create_record_handler(
    State(state): State<Arc<AppState>>,
    Path(type_name): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<CreatedResponse>)> {
    submit(&state, &type_name, body).await
}

async fn list_records_handler(
    State(state): State<Arc<AppState>>,
    Path(type_name): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<Json<Vec<Value>>> {
    list(&state, &type_name, &query).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::builtin::CAREGIVER;
    use crate::schema::SchemaRegistry;

    fn query(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn parse(type_name: &str, pairs: &[(&str, &str)]) -> ApiResult<ListParams> {
        let registry = SchemaRegistry::with_builtin_types().unwrap();
        let record_type = registry.get(type_name).unwrap();
        ListParams::parse(&query(pairs), record_type, &HttpServerConfig::default())
    }

    #[test]
    fn test_default_limit() {
        let params = parse(CARE_REQUEST, &[]).unwrap();
        assert_eq!(params.limit, 50);
        assert!(params.filter.is_empty());
    }

    #[test]
    fn test_explicit_limit_and_filters() {
        let params = parse(
            CARE_REQUEST,
            &[("limit", "0"), ("phone", "555-0100"), ("address", "12 Elm St")],
        )
        .unwrap();

        assert_eq!(params.limit, 0);
        assert_eq!(
            params.filter,
            Filter::new().eq("address", "12 Elm St").eq("phone", "555-0100")
        );
    }

    #[test]
    fn test_undeclared_params_are_ignored() {
        let params = parse(CARE_REQUEST, &[("page", "2"), ("limt", "5")]).unwrap();
        assert!(params.filter.is_empty());
        assert_eq!(params.limit, 50);
    }

    #[test]
    fn test_filters_take_the_field_kind() {
        let params = parse(
            CAREGIVER,
            &[("years_experience", "4"), ("can_overnight", "false")],
        )
        .unwrap();
        assert_eq!(
            params.filter,
            Filter::new().eq("can_overnight", false).eq("years_experience", 4i64)
        );

        assert!(matches!(
            parse(CAREGIVER, &[("years_experience", "four")]),
            Err(ApiError::InvalidQueryParam(_))
        ));
    }

    #[test]
    fn test_id_filter_targets_stored_identifier() {
        let id = DocumentId::generate();
        let id_text = id.to_string();
        let params = parse(CARE_REQUEST, &[("id", id_text.as_str())]).unwrap();
        assert_eq!(params.filter, Filter::new().eq(ID_FIELD, id));

        assert!(parse(CARE_REQUEST, &[("id", "nope")]).is_err());
    }

    #[test]
    fn test_limit_is_clamped_and_checked() {
        assert!(matches!(
            parse(CARE_REQUEST, &[("limit", "-1")]),
            Err(ApiError::InvalidQueryParam(_))
        ));
        assert_eq!(parse(CARE_REQUEST, &[("limit", "501")]).unwrap().limit, 500);
        assert_eq!(parse(CARE_REQUEST, &[("limit", "1000")]).unwrap().limit, 500);
    }
}

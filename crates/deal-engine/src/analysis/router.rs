use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Deserializer};
use serde_json::json;

use super::domain::{PropertyId, PropertyRecord};
use super::orchestrator::BatchOptions;
use super::repository::{PropertyStore, StoreError, VerdictSink};
use super::service::{DealAnalysisService, DealServiceError};

#[derive(Debug, Deserialize)]
pub(crate) struct AnalyzeRequest {
    pub(crate) records: Vec<PropertyRecord>,
    #[serde(default, deserialize_with = "deserialize_settings")]
    pub(crate) settings: BTreeMap<String, String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RunRequest {
    #[serde(default, deserialize_with = "deserialize_settings")]
    pub(crate) settings: BTreeMap<String, String>,
}

/// Router builder exposing analysis and property intake endpoints.
pub fn deal_router<S, K>(service: Arc<DealAnalysisService<S, K>>) -> Router
where
    S: PropertyStore + 'static,
    K: VerdictSink + 'static,
{
    Router::new()
        .route("/api/v1/deals/analyze", post(analyze_handler::<S, K>))
        .route("/api/v1/deals/run", post(run_handler::<S, K>))
        .route("/api/v1/properties", post(register_handler::<S, K>))
        .route(
            "/api/v1/properties/:property_id",
            get(property_handler::<S, K>).put(update_handler::<S, K>),
        )
        .with_state(service)
}

pub(crate) async fn analyze_handler<S, K>(
    State(service): State<Arc<DealAnalysisService<S, K>>>,
    axum::Json(request): axum::Json<AnalyzeRequest>,
) -> Response
where
    S: PropertyStore + 'static,
    K: VerdictSink + 'static,
{
    match service.analyze_records(&request.records, &request.settings) {
        Ok(summary) => (StatusCode::OK, axum::Json(summary)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn run_handler<S, K>(
    State(service): State<Arc<DealAnalysisService<S, K>>>,
    request: Option<axum::Json<RunRequest>>,
) -> Response
where
    S: PropertyStore + 'static,
    K: VerdictSink + 'static,
{
    let axum::Json(request) = request.unwrap_or_default();
    match service.run_stored_batch(&request.settings, &BatchOptions::default()) {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn register_handler<S, K>(
    State(service): State<Arc<DealAnalysisService<S, K>>>,
    axum::Json(record): axum::Json<PropertyRecord>,
) -> Response
where
    S: PropertyStore + 'static,
    K: VerdictSink + 'static,
{
    match service.register(record) {
        Ok(record) => (StatusCode::CREATED, axum::Json(record)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn property_handler<S, K>(
    State(service): State<Arc<DealAnalysisService<S, K>>>,
    Path(property_id): Path<String>,
) -> Response
where
    S: PropertyStore + 'static,
    K: VerdictSink + 'static,
{
    match service.get_property(&PropertyId(property_id)) {
        Ok(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn update_handler<S, K>(
    State(service): State<Arc<DealAnalysisService<S, K>>>,
    Path(property_id): Path<String>,
    axum::Json(mut record): axum::Json<PropertyRecord>,
) -> Response
where
    S: PropertyStore + 'static,
    K: VerdictSink + 'static,
{
    record.id = PropertyId(property_id);
    match service.update_property(record) {
        Ok(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        Err(err) => error_response(err),
    }
}

fn error_response(err: DealServiceError) -> Response {
    let status = match &err {
        DealServiceError::Configuration(_) => StatusCode::UNPROCESSABLE_ENTITY,
        DealServiceError::Store(StoreError::Conflict) => StatusCode::CONFLICT,
        DealServiceError::Store(StoreError::NotFound) => StatusCode::NOT_FOUND,
        DealServiceError::Store(StoreError::Unavailable(_)) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({ "error": err.to_string() });
    (status, axum::Json(payload)).into_response()
}

/// Accepts settings as strings or bare JSON numbers.
pub fn deserialize_settings<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, serde_json::Value>::deserialize(deserializer)?;
    raw.into_iter()
        .map(|(key, value)| match value {
            serde_json::Value::String(text) => Ok((key, text)),
            serde_json::Value::Number(number) => Ok((key, number.to_string())),
            other => Err(serde::de::Error::custom(format!(
                "setting '{key}' must be a string or number, found {other}"
            ))),
        })
        .collect()
}

use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Extension;
use axum::Json;
use deal_engine::analysis::router::deserialize_settings;
use deal_engine::analysis::{
    deal_router, BatchSummary, DealAnalysisService, PropertyStore, VerdictSink,
};
use deal_engine::error::AppError;
use deal_engine::ingest::PropertyCsvImporter;
use serde::Deserialize;
use serde_json::json;
use std::collections::BTreeMap;
use std::io::Cursor;
use std::sync::Arc;

/// Raw spreadsheet export plus optional per-run settings.
#[derive(Debug, Deserialize)]
pub(crate) struct ImportRequest {
    pub(crate) csv: String,
    #[serde(default, deserialize_with = "deserialize_settings")]
    pub(crate) settings: BTreeMap<String, String>,
}

pub(crate) fn with_deal_routes<S, K>(service: Arc<DealAnalysisService<S, K>>) -> axum::Router
where
    S: PropertyStore + 'static,
    K: VerdictSink + 'static,
{
    let import_service = service.clone();
    deal_router(service)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route(
            "/api/v1/deals/import",
            post(move |Json(request): Json<ImportRequest>| {
                let service = import_service.clone();
                async move { import_endpoint(&service, request) }
            }),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) fn import_endpoint<S, K>(
    service: &DealAnalysisService<S, K>,
    request: ImportRequest,
) -> Result<Json<BatchSummary>, AppError>
where
    S: PropertyStore + 'static,
    K: VerdictSink + 'static,
{
    let ImportRequest { csv, settings } = request;
    let records = PropertyCsvImporter::from_reader(Cursor::new(csv.into_bytes()))?;
    let summary = service.analyze_records(&records, &settings)?;
    Ok(Json(summary))
}

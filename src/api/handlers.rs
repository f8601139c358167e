use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use utoipa::OpenApi;

use super::{
    dto::{
        AnalyticsResponse, DashboardResponse, ErrorResponse, IngestResponse,
        SensorReadingRequest,
    },
    errors::AppError,
    AppState,
};
use crate::analytics::aggregate::MetricSummary;

// ---------------------------------------------------------------------------
// Ingestion
// ---------------------------------------------------------------------------

/// Store one sensor reading. A missing `timestamp` is set to the current UTC
/// time.
#[utoipa::path(
    post,
    path = "/sensor-data",
    request_body = SensorReadingRequest,
    responses(
        (status = 200, description = "Reading stored", body = IngestResponse),
        (status = 422, description = "Missing or non-numeric field", body = ErrorResponse),
        (status = 500, description = "Reading could not be stored", body = ErrorResponse),
    ),
    tag = "sensors"
)]
pub async fn receive_sensor_data(
    State(state): State<AppState>,
    payload: Result<Json<SensorReadingRequest>, JsonRejection>,
) -> Result<Json<IngestResponse>, AppError> {
    let Json(payload) = payload?;
    state.ingestion.ingest(payload.into()).await?;
    Ok(Json(IngestResponse::success()))
}

// ---------------------------------------------------------------------------
// Reporting
// ---------------------------------------------------------------------------

/// Average/max/min per metric over every stored reading. With no readings,
/// every metric is an empty object.
#[utoipa::path(
    get,
    path = "/analytics",
    responses(
        (status = 200, description = "Per-metric statistics", body = AnalyticsResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "analytics"
)]
pub async fn get_analytics(
    State(state): State<AppState>,
) -> Result<Json<AnalyticsResponse>, AppError> {
    let report = state.reporting.report().await?;
    Ok(Json(report.analytics()))
}

/// Reading count plus the same statistics, with flat legacy aliases.
#[utoipa::path(
    get,
    path = "/dashboard",
    responses(
        (status = 200, description = "Count and statistics", body = DashboardResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "analytics"
)]
pub async fn get_dashboard(
    State(state): State<AppState>,
) -> Result<Json<DashboardResponse>, AppError> {
    let report = state.reporting.report().await?;
    Ok(Json(report.dashboard()))
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

/// Returns `200 OK` with `{"status":"ok"}` when the server is running.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy"),
    ),
    tag = "system"
)]
pub async fn health() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({ "status": "ok" }))
}

// ---------------------------------------------------------------------------
// OpenAPI spec
// ---------------------------------------------------------------------------

#[derive(OpenApi)]
#[openapi(
    paths(receive_sensor_data, get_analytics, get_dashboard, health),
    components(schemas(
        SensorReadingRequest,
        IngestResponse,
        ErrorResponse,
        AnalyticsResponse,
        DashboardResponse,
        MetricSummary,
    )),
    tags(
        (name = "sensors",   description = "Sensor reading ingestion"),
        (name = "analytics", description = "Aggregated statistics"),
        (name = "system",    description = "System endpoints"),
    ),
    info(
        title = "AgroSense Tech API",
        version = "0.1.0",
        description = "Environmental sensor ingestion and aggregate statistics"
    )
)]
pub struct ApiDoc;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

pub mod dto;
pub mod errors;
pub mod handlers;

use axum::{
    routing::{get, post},
    Router,
};
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;

use handlers::ApiDoc;

use crate::{analytics::ReportingService, db::Storage, sensors::IngestionService};

/// Shared handler state. Cloning is cheap; every service wraps the same
/// storage pool.
#[derive(Clone)]
pub struct AppState {
    pub ingestion: IngestionService,
    pub reporting: ReportingService,
}

impl AppState {
    pub fn new(storage: Storage) -> Self {
        Self {
            ingestion: IngestionService::new(storage.clone()),
            reporting: ReportingService::new(storage),
        }
    }
}

pub fn router(state: AppState) -> Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .route("/sensor-data", post(handlers::receive_sensor_data))
        .route("/analytics", get(handlers::get_analytics))
        .route("/dashboard", get(handlers::get_dashboard))
        .with_state(state)
        .split_for_parts();

    router
        .route("/health", get(handlers::health))
        .route(
            "/api-docs/openapi.json",
            get(move || async move { axum::Json(api) }),
        )
}

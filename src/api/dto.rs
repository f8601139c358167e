use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::db::models::NewReading;

pub use crate::analytics::{
    aggregate::NestedMetrics as AnalyticsResponse, DashboardView as DashboardResponse,
};

/// Request body for `POST /sensor-data`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SensorReadingRequest {
    /// Free-text device label.
    pub sensor_id: Option<String>,
    /// Degrees Celsius
    pub temperature: f64,
    /// Relative humidity percentage
    pub humidity: f64,
    pub ph: f64,
    /// Lux
    pub light: f64,
    /// RFC3339. Defaults to the time the server receives the reading.
    pub timestamp: Option<DateTime<Utc>>,
}

impl From<SensorReadingRequest> for NewReading {
    fn from(r: SensorReadingRequest) -> Self {
        Self {
            sensor_id: r.sensor_id,
            temperature: r.temperature,
            humidity: r.humidity,
            ph: r.ph,
            light: r.light,
            timestamp: r.timestamp,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct IngestResponse {
    pub status: String,
}

impl IngestResponse {
    pub fn success() -> Self {
        Self {
            status: "success".to_owned(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub detail: String,
}

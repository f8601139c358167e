use serde::Serialize;
use tracing::debug;
use utoipa::ToSchema;

use super::aggregate::{
    empty_object_if_none, summarize, MetricSample, NestedMetrics, Summary,
};
use crate::db::{Storage, StorageError};

/// Answers aggregate queries over every stored reading.
#[derive(Clone)]
pub struct ReportingService {
    storage: Storage,
}

/// One fetch-and-summarize pass. Both client shapes are rendered from the
/// same `Report`, so `count` always matches the statistics next to it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Report {
    pub count: usize,
    pub summary: Summary,
}

/// Dashboard shape: `count`, the legacy flat aliases, and nested `metrics`.
///
/// With no readings this is exactly `{"count": 0, "metrics": {}}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct DashboardView {
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_temp: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_humidity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_ph: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_light: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_light: Option<f64>,
    #[serde(serialize_with = "empty_object_if_none")]
    #[schema(value_type = NestedMetrics)]
    pub metrics: Option<NestedMetrics>,
}

impl ReportingService {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// Fetch all readings and summarize them.
    ///
    /// Concurrent writers may land between two calls, so back-to-back reports
    /// can show different counts.
    pub async fn report(&self) -> Result<Report, StorageError> {
        let readings = self.storage.all().await?;
        let samples: Vec<MetricSample> = readings.iter().map(MetricSample::from).collect();

        debug!(count = samples.len(), "Summarizing sensor readings");

        Ok(Report {
            count: samples.len(),
            summary: summarize(&samples),
        })
    }
}

impl Report {
    /// Standalone nested aggregate; every field is `{}` when nothing is stored.
    pub fn analytics(&self) -> NestedMetrics {
        self.summary.nested()
    }

    pub fn dashboard(&self) -> DashboardView {
        let legacy = self.summary.legacy();
        DashboardView {
            count: self.count,
            avg_temp: legacy.map(|l| l.avg_temp),
            avg_humidity: legacy.map(|l| l.avg_humidity),
            avg_ph: legacy.map(|l| l.avg_ph),
            max_light: legacy.map(|l| l.max_light),
            min_light: legacy.map(|l| l.min_light),
            metrics: self.summary.report().map(|r| r.nested()),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::db::models::NewReading;

    fn reading(temperature: f64, humidity: f64, ph: f64, light: f64) -> NewReading {
        NewReading {
            sensor_id: None,
            temperature,
            humidity,
            ph,
            light,
            timestamp: None,
        }
    }

    #[tokio::test]
    async fn empty_storage_yields_empty_shapes() {
        let service = ReportingService::new(Storage::in_memory().await);
        let report = service.report().await.unwrap();

        assert_eq!(report.count, 0);
        assert_eq!(report.summary, Summary::Empty);
        assert_eq!(
            serde_json::to_value(report.analytics()).unwrap(),
            json!({ "temperature": {}, "humidity": {}, "ph": {}, "light": {} })
        );
        assert_eq!(
            serde_json::to_value(report.dashboard()).unwrap(),
            json!({ "count": 0, "metrics": {} })
        );
    }

    #[tokio::test]
    async fn dashboard_and_analytics_agree() {
        let storage = Storage::in_memory().await;
        storage.append(reading(25.0, 60.0, 6.7, 400.0)).await.unwrap();
        storage.append(reading(27.0, 65.0, 6.9, 420.0)).await.unwrap();
        storage.append(reading(26.0, 63.0, 6.8, 410.0)).await.unwrap();

        let report = ReportingService::new(storage).report().await.unwrap();
        let dashboard = serde_json::to_value(report.dashboard()).unwrap();
        let analytics = serde_json::to_value(report.analytics()).unwrap();

        assert_eq!(dashboard["count"], 3);
        assert_eq!(dashboard["avg_temp"], json!(26.0));
        assert_eq!(dashboard["avg_humidity"], json!(62.7));
        assert_eq!(dashboard["max_light"], json!(420.0));
        assert_eq!(dashboard["min_light"], json!(400.0));
        assert_eq!(dashboard["metrics"], analytics);
        assert_eq!(dashboard["avg_ph"], analytics["ph"]["avg"]);
    }
}

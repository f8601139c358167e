use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One persisted row of the `sensor_data` table.
///
/// Rows are append-only: `id` is assigned by the database, never reused, and
/// nothing in the service updates or deletes a reading once written.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Reading {
    pub id: i64,
    /// Free-text device label, not checked against any registry.
    pub sensor_id: Option<String>,
    /// Degrees Celsius
    pub temperature: f64,
    /// Relative humidity percentage
    pub humidity: f64,
    pub ph: f64,
    /// Lux
    pub light: f64,
    pub timestamp: DateTime<Utc>,
}

/// A reading that has not been stored yet.
///
/// Values are taken as-is; physical range is not validated.
#[derive(Debug, Clone, PartialEq)]
pub struct NewReading {
    pub sensor_id: Option<String>,
    pub temperature: f64,
    pub humidity: f64,
    pub ph: f64,
    pub light: f64,
    /// Defaults to the current UTC instant at write time when absent.
    pub timestamp: Option<DateTime<Utc>>,
}

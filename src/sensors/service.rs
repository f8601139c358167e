use tracing::{error, info};

use crate::db::{
    models::{NewReading, Reading},
    Storage, StorageError,
};

/// Writes client-submitted readings.
///
/// Payloads arrive already validated by the HTTP layer; nothing here checks
/// field presence or physical range.
#[derive(Clone)]
pub struct IngestionService {
    storage: Storage,
}

impl IngestionService {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// Appends the reading; storage stamps it with the current UTC instant if
    /// the client sent no timestamp. Failures are never retried.
    pub async fn ingest(&self, reading: NewReading) -> Result<Reading, StorageError> {
        match self.storage.append(reading).await {
            Ok(stored) => {
                info!(
                    id = stored.id,
                    sensor_id = ?stored.sensor_id,
                    "Sensor reading persisted"
                );
                Ok(stored)
            }
            Err(e) => {
                error!(error = %e, "Failed to persist sensor reading");
                Err(e)
            }
        }
    }
}

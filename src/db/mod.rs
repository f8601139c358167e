pub mod models;
pub mod target;

use std::{str::FromStr, time::Duration};

use chrono::Utc;
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    Database, PgPool, SqlitePool, Transaction,
};
use tracing::{error, info};

use self::{
    models::{NewReading, Reading},
    target::{Backend, ConfigError, DatabaseTarget, EmbeddedLocation},
};

const SQLITE_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const INSERT_SQLITE: &str = r#"
    INSERT INTO sensor_data (sensor_id, temperature, humidity, ph, light, timestamp)
    VALUES (?, ?, ?, ?, ?, ?)
    RETURNING id, sensor_id, temperature, humidity, ph, light, timestamp
"#;

const INSERT_POSTGRES: &str = r#"
    INSERT INTO sensor_data (sensor_id, temperature, humidity, ph, light, timestamp)
    VALUES ($1, $2, $3, $4, $5, $6)
    RETURNING id, sensor_id, temperature, humidity, ph, light, timestamp
"#;

const SELECT_ALL: &str = r#"
    SELECT id, sensor_id, temperature, humidity, ph, light, timestamp
    FROM sensor_data
    ORDER BY id ASC
"#;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("cannot create database directory: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Debug, Clone)]
pub struct PoolSettings {
    pub max_connections: u32,
    /// How long a caller waits for a pooled connection before failing.
    pub acquire_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 10,
            acquire_timeout: Duration::from_secs(5),
        }
    }
}

/// Append-only store of sensor readings.
///
/// Built once at startup and cloned into request handlers; both variants wrap
/// a reference-counted pool, so clones share connections.
#[derive(Clone)]
pub enum Storage {
    Sqlite(SqlitePool),
    Postgres(PgPool),
}

impl Storage {
    /// Open a pool for `target`.
    ///
    /// Postgres pools are lazy: no connection is attempted until the first
    /// query. SQLite files (and their parent directory) are created if missing.
    pub async fn connect(
        target: &DatabaseTarget,
        settings: &PoolSettings,
    ) -> Result<Self, StorageError> {
        match target.backend() {
            Backend::Sqlite => connect_sqlite(target, settings).await.map(Self::Sqlite),
            Backend::Postgres => connect_postgres(target, settings).map(Self::Postgres),
            Backend::Unknown => {
                Err(ConfigError::UnknownBackend(target.scheme().to_owned()).into())
            }
        }
    }

    pub fn backend(&self) -> Backend {
        match self {
            Self::Sqlite(_) => Backend::Sqlite,
            Self::Postgres(_) => Backend::Postgres,
        }
    }

    pub async fn run_migrations(&self) -> Result<(), StorageError> {
        match self {
            Self::Sqlite(pool) => sqlx::migrate!("./migrations/sqlite").run(pool).await?,
            Self::Postgres(pool) => sqlx::migrate!("./migrations/postgres").run(pool).await?,
        }
        Ok(())
    }

    /// Store one reading in its own transaction and return the persisted row.
    ///
    /// A missing timestamp becomes the current UTC instant. On failure the
    /// transaction is rolled back, so earlier readings are never affected.
    pub async fn append(&self, reading: NewReading) -> Result<Reading, StorageError> {
        let timestamp = reading.timestamp.unwrap_or_else(Utc::now);

        match self {
            Self::Sqlite(pool) => {
                let mut tx = pool.begin().await?;
                let inserted = sqlx::query_as::<_, Reading>(INSERT_SQLITE)
                    .bind(reading.sensor_id.as_deref())
                    .bind(reading.temperature)
                    .bind(reading.humidity)
                    .bind(reading.ph)
                    .bind(reading.light)
                    .bind(timestamp)
                    .fetch_one(&mut *tx)
                    .await;
                finish(tx, inserted).await
            }
            Self::Postgres(pool) => {
                let mut tx = pool.begin().await?;
                let inserted = sqlx::query_as::<_, Reading>(INSERT_POSTGRES)
                    .bind(reading.sensor_id.as_deref())
                    .bind(reading.temperature)
                    .bind(reading.humidity)
                    .bind(reading.ph)
                    .bind(reading.light)
                    .bind(timestamp)
                    .fetch_one(&mut *tx)
                    .await;
                finish(tx, inserted).await
            }
        }
    }

    /// Every stored reading, in insertion order.
    pub async fn all(&self) -> Result<Vec<Reading>, StorageError> {
        let rows = match self {
            Self::Sqlite(pool) => {
                sqlx::query_as::<_, Reading>(SELECT_ALL)
                    .fetch_all(pool)
                    .await?
            }
            Self::Postgres(pool) => {
                sqlx::query_as::<_, Reading>(SELECT_ALL)
                    .fetch_all(pool)
                    .await?
            }
        };
        Ok(rows)
    }

    /// Fresh, migrated in-memory SQLite store.
    #[cfg(test)]
    pub(crate) async fn in_memory() -> Self {
        let target = target::resolve(|key| {
            (key == target::DATABASE_URL_KEY).then(|| "sqlite::memory:".to_owned())
        });
        let storage = Self::connect(&target, &PoolSettings::default())
            .await
            .unwrap();
        storage.run_migrations().await.unwrap();
        storage
    }
}

/// Commit on success; roll back explicitly on failure.
async fn finish<DB: Database>(
    tx: Transaction<'_, DB>,
    inserted: Result<Reading, sqlx::Error>,
) -> Result<Reading, StorageError> {
    match inserted {
        Ok(reading) => {
            tx.commit().await?;
            Ok(reading)
        }
        Err(e) => {
            if let Err(rollback) = tx.rollback().await {
                error!(error = %rollback, "Rollback after failed insert also failed");
            }
            Err(e.into())
        }
    }
}

async fn connect_sqlite(
    target: &DatabaseTarget,
    settings: &PoolSettings,
) -> Result<SqlitePool, StorageError> {
    let (options, pool_options) = match target.embedded_location() {
        // Every connection to `:memory:` is a separate database, so the pool
        // is pinned to one connection that is never recycled.
        EmbeddedLocation::Memory => (
            SqliteConnectOptions::from_str("sqlite::memory:")?,
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None),
        ),
        EmbeddedLocation::File(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            info!(path = %path.display(), "Opening SQLite database");
            (
                SqliteConnectOptions::new()
                    .filename(&path)
                    .create_if_missing(true)
                    .journal_mode(SqliteJournalMode::Wal)
                    .busy_timeout(SQLITE_BUSY_TIMEOUT),
                SqlitePoolOptions::new().max_connections(settings.max_connections),
            )
        }
    };

    let pool = pool_options
        .acquire_timeout(settings.acquire_timeout)
        .connect_with(options)
        .await?;
    Ok(pool)
}

fn connect_postgres(
    target: &DatabaseTarget,
    settings: &PoolSettings,
) -> Result<PgPool, StorageError> {
    let options = PgConnectOptions::from_str(&target.driver_url())?;
    Ok(PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(settings.acquire_timeout)
        .connect_lazy_with(options))
}

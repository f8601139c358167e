//! Shows which database the service would use and, if a Postgres target can
//! be resolved, opens a direct connection to it.
//!
//! Usage:
//!   cargo run --bin verify_connection
//!
//! Reads the same environment (and `.env`) as the server. Besides
//! `POSTGRES_DSN` / `DATABASE_URL`, a target can be assembled from
//! `POSTGRES_USER`, `POSTGRES_HOST`, `POSTGRES_PORT`, `POSTGRES_DB` and a
//! password. Exits non-zero when no Postgres target resolves or the
//! connection fails.

use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::{Connection, PgConnection};

use agrosense_service::db::target::{
    self, process_env, DATABASE_URL_KEY, DB_NAME_KEY, FORCED_DSN_KEY, HOST_KEY,
    LEGACY_PASSWORD_KEY, PASSWORD_KEY, PORT_KEY, USER_KEY,
};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    // DSNs and passwords may carry secrets; only report whether they are set.
    for key in [FORCED_DSN_KEY, DATABASE_URL_KEY, LEGACY_PASSWORD_KEY, PASSWORD_KEY] {
        let state = if process_env(key).is_some() { "set" } else { "unset" };
        println!("  {key}: {state}");
    }
    for key in [USER_KEY, HOST_KEY, PORT_KEY, DB_NAME_KEY] {
        println!("  {key}={}", process_env(key).unwrap_or_default());
    }

    let serving = target::resolve(process_env);
    println!(
        "Request traffic uses backend {} (from {:?})",
        serving.backend(),
        serving.source()
    );

    let target = target::resolve_relational(process_env)?;
    println!(
        "Attempting direct Postgres connection (target from {:?})...",
        target.source()
    );

    let url = target.driver_url();
    let mut conn = tokio::time::timeout(CONNECT_TIMEOUT, PgConnection::connect(&url))
        .await
        .context("timed out opening direct Postgres connection")?
        .context("failed to open direct Postgres connection")?;

    let one: i32 = sqlx::query_scalar("SELECT 1")
        .fetch_one(&mut conn)
        .await
        .context("connected, but SELECT 1 failed")?;
    conn.close().await?;

    println!("Connected to Postgres OK (SELECT 1 = {one})");
    Ok(())
}

use std::time::Duration;

use anyhow::{Context, Result};

use crate::db::{
    target::{self, DatabaseTarget},
    PoolSettings,
};

#[derive(Debug, Clone)]
pub struct Config {
    /// Resolved once at startup; see [`target::resolve`].
    pub database: DatabaseTarget,
    pub pool: PoolSettings,
    pub server_host: String,
    pub server_port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(target::process_env)
    }

    /// Build the config from an arbitrary key lookup instead of the process
    /// environment.
    pub fn from_lookup(env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Self {
            database: target::resolve(&env),
            pool: PoolSettings {
                max_connections: optional(&env, "DB_MAX_CONNECTIONS", "10")
                    .parse()
                    .context("DB_MAX_CONNECTIONS must be a positive integer")?,
                acquire_timeout: Duration::from_secs(
                    optional(&env, "DB_ACQUIRE_TIMEOUT_SECS", "5")
                        .parse()
                        .context("DB_ACQUIRE_TIMEOUT_SECS must be a positive integer")?,
                ),
            },
            server_host: optional(&env, "SERVER_HOST", "0.0.0.0"),
            server_port: optional(&env, "SERVER_PORT", "8000")
                .parse()
                .context("SERVER_PORT must be a valid port number")?,
        })
    }
}

fn optional(env: impl Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    env(key).unwrap_or_else(|| default.to_owned())
}

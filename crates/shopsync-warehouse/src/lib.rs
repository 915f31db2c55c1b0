//! Warehouse sink backed by Postgres.
//!
//! Batches are loaded into `schema.table` destinations with every column
//! stored as `TEXT`, mirroring the raw CSV extracts.

pub mod load;
pub mod watermark;

use std::time::Duration;

use shopsync_core::AppConfig;
use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;

pub use load::{load_table, sanitize_column_name, Destination, WriteMode, MERGE_KEY};
pub use watermark::last_updated_at;

const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_MIN_CONNECTIONS: u32 = 1;
const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Copy)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: DEFAULT_MAX_CONNECTIONS,
            min_connections: DEFAULT_MIN_CONNECTIONS,
            acquire_timeout_secs: DEFAULT_ACQUIRE_TIMEOUT_SECS,
        }
    }
}

impl PoolConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            max_connections: config.db_max_connections,
            min_connections: config.db_min_connections,
            acquire_timeout_secs: config.db_acquire_timeout_secs,
        }
    }
}

#[derive(Debug, Error)]
pub enum WarehouseError {
    #[error("DATABASE_URL is not set")]
    MissingDatabaseUrl,

    #[error("invalid identifier \"{0}\": expected [A-Za-z_][A-Za-z0-9_]*")]
    InvalidIdentifier(String),

    #[error("invalid destination \"{0}\": expected schema.table")]
    InvalidDestination(String),

    #[error("columns \"{first}\" and \"{second}\" both map to \"{sanitized}\"")]
    DuplicateColumn {
        first: String,
        second: String,
        sanitized: String,
    },

    #[error("merge load needs a \"{0}\" column")]
    MissingKeyColumn(&'static str),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Connect to a Postgres pool using explicit URL and config.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the connection cannot be established.
pub async fn connect_pool(database_url: &str, config: PoolConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect(database_url)
        .await
}

/// Connect using the warehouse settings in `config`.
///
/// # Errors
///
/// Returns [`WarehouseError::MissingDatabaseUrl`] if no URL is configured, or
/// [`WarehouseError::Sqlx`] if the connection cannot be established.
pub async fn connect_from_app_config(config: &AppConfig) -> Result<PgPool, WarehouseError> {
    let url = config
        .database_url
        .as_deref()
        .ok_or(WarehouseError::MissingDatabaseUrl)?;
    Ok(connect_pool(url, PoolConfig::from_app_config(config)).await?)
}

use crate::app_config::{AppConfig, StoreConfig, DEFAULT_API_VERSION};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can drive it with a plain
/// `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var).ok().filter(|v| !v.trim().is_empty())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let store_name = optional("SHOPIFY_STORE_NAME");
    let access_token = optional("SHOPIFY_ACCESS_TOKEN");
    let api_version = or_default("SHOPIFY_API_VERSION", DEFAULT_API_VERSION);
    let base_url = optional("SHOPIFY_BASE_URL");
    let request_timeout_secs = parse_u64("SHOPSYNC_REQUEST_TIMEOUT_SECS", "30")?;

    let page_size = parse_u32("SHOPSYNC_PAGE_SIZE", "250")?;
    if page_size == 0 || page_size > 250 {
        return Err(ConfigError::InvalidEnvVar {
            var: "SHOPSYNC_PAGE_SIZE".to_string(),
            reason: format!("{page_size} is outside 1..=250"),
        });
    }
    let graphql_page_size = parse_u32("SHOPSYNC_GRAPHQL_PAGE_SIZE", "50")?;
    if graphql_page_size == 0 || graphql_page_size > 250 {
        return Err(ConfigError::InvalidEnvVar {
            var: "SHOPSYNC_GRAPHQL_PAGE_SIZE".to_string(),
            reason: format!("{graphql_page_size} is outside 1..=250"),
        });
    }

    let output_dir = PathBuf::from(or_default("SHOPSYNC_OUTPUT_DIR", "./data_raw"));
    let sync_buffer_secs = parse_u64("SHOPSYNC_SYNC_BUFFER_SECS", "3600")?;
    let order_delay_secs = parse_u64("SHOPSYNC_ORDER_DELAY_SECS", "13")?;
    let zips_path = optional("SHOPSYNC_ZIPS_PATH").map(PathBuf::from);
    let log_level = or_default("SHOPSYNC_LOG_LEVEL", "info");

    let database_url = optional("DATABASE_URL");
    let db_max_connections = parse_u32("SHOPSYNC_DB_MAX_CONNECTIONS", "5")?;
    let db_min_connections = parse_u32("SHOPSYNC_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("SHOPSYNC_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    // Both store variables or neither; `load` runs without a store.
    let store = match (store_name, access_token) {
        (Some(store_name), Some(access_token)) => Some(StoreConfig {
            store_name,
            access_token,
            api_version,
            base_url,
            request_timeout_secs,
        }),
        (None, None) => None,
        (Some(_), None) => return Err(ConfigError::MissingEnvVar("SHOPIFY_ACCESS_TOKEN".to_string())),
        (None, Some(_)) => return Err(ConfigError::MissingEnvVar("SHOPIFY_STORE_NAME".to_string())),
    };

    Ok(AppConfig {
        store,
        page_size,
        graphql_page_size,
        output_dir,
        sync_buffer_secs,
        order_delay_secs,
        zips_path,
        log_level,
        database_url,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

use std::path::PathBuf;

use crate::ConfigError;

/// Admin API version used when `SHOPIFY_API_VERSION` is unset.
pub const DEFAULT_API_VERSION: &str = "2025-10";

/// Connection settings for one Shopify store.
///
/// Handed to the API client at construction so nothing below the binary
/// reads process environment.
#[derive(Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Store subdomain, e.g. `"acme-dev"` for `acme-dev.myshopify.com`.
    pub store_name: String,
    pub access_token: String,
    pub api_version: String,
    /// Origin override (scheme + host). `None` means the myshopify.com origin.
    pub base_url: Option<String>,
    pub request_timeout_secs: u64,
}

impl StoreConfig {
    #[must_use]
    pub fn new(store_name: &str, access_token: &str) -> Self {
        Self {
            store_name: store_name.to_owned(),
            access_token: access_token.to_owned(),
            api_version: DEFAULT_API_VERSION.to_owned(),
            base_url: None,
            request_timeout_secs: 30,
        }
    }

    /// Returns the store origin without a trailing slash.
    #[must_use]
    pub fn origin(&self) -> String {
        match &self.base_url {
            Some(url) => url.trim_end_matches('/').to_owned(),
            None => format!("https://{}.myshopify.com", self.store_name),
        }
    }

    /// Returns the versioned Admin API root, e.g.
    /// `https://acme.myshopify.com/admin/api/2025-10`.
    #[must_use]
    pub fn admin_api_root(&self) -> String {
        format!("{}/admin/api/{}", self.origin(), self.api_version)
    }
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("store_name", &self.store_name)
            .field("access_token", &"[redacted]")
            .field("api_version", &self.api_version)
            .field("base_url", &self.base_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

#[derive(Clone)]
pub struct AppConfig {
    /// `None` when neither store variable is set. Commands that talk to the
    /// Admin API go through [`AppConfig::require_store`].
    pub store: Option<StoreConfig>,
    pub page_size: u32,
    pub graphql_page_size: u32,
    pub output_dir: PathBuf,
    pub sync_buffer_secs: u64,
    pub order_delay_secs: u64,
    pub zips_path: Option<PathBuf>,
    pub log_level: String,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
}

impl AppConfig {
    /// Store settings for commands that call the Admin API.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] naming `SHOPIFY_STORE_NAME`
    /// when no store is configured.
    pub fn require_store(&self) -> Result<&StoreConfig, ConfigError> {
        self.store
            .as_ref()
            .ok_or_else(|| ConfigError::MissingEnvVar("SHOPIFY_STORE_NAME".to_string()))
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("store", &self.store)
            .field("page_size", &self.page_size)
            .field("graphql_page_size", &self.graphql_page_size)
            .field("output_dir", &self.output_dir)
            .field("sync_buffer_secs", &self.sync_buffer_secs)
            .field("order_delay_secs", &self.order_delay_secs)
            .field("zips_path", &self.zips_path)
            .field("log_level", &self.log_level)
            .field(
                "database_url",
                &self.database_url.as_ref().map(|_| "[redacted]"),
            )
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .finish()
    }
}

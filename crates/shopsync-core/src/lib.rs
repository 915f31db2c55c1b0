pub mod app_config;
pub mod config;
pub mod record;
pub mod table;

use thiserror::Error;

pub use app_config::{AppConfig, StoreConfig};
pub use config::{load_app_config, load_app_config_from_env};
pub use record::{flatten, max_timestamp, Record};
pub use table::{export_csv, timestamped_file_name, ExportError, Table};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

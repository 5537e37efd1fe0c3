pub mod app_config;
pub mod config;
pub mod listing;

pub use app_config::{AppConfig, Backend, PaginationStyle};
pub use config::{load_app_config, load_app_config_from_env};
pub use listing::{ListingKey, ListingRecord, StoreSchema};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

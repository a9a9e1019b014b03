pub mod app_config;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod summary;
pub mod window;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use cache::{Snapshot, SummaryCache};
pub use catalog::{load_catalog, parse_catalog, Catalog, ProductCatalogEntry};
pub use config::{load_app_config, load_app_config_from_env};
pub use summary::{
    build_summaries, OrderAggregate, OrdersByKey, ProductSummary, StockEntry, StocksByKey,
    DEFAULT_WAREHOUSE,
};
pub use window::{daily_series, lookback_start, trailing_window, WINDOW_DAYS};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read catalog file {path}: {source}")]
    CatalogFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalog file: {0}")]
    CatalogFileParse(#[source] serde_yaml::Error),

    #[error("catalog validation failed: {0}")]
    Validation(String),
}

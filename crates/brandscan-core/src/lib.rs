pub mod app_config;
pub mod catalog;
pub mod config;
pub mod options;
pub mod rows;

pub use app_config::AppConfig;
pub use catalog::{
    load_catalog, parse_catalog_lines, CatalogEntry, CatalogFile, RawCatalogEntry, UNKNOWN_BRAND,
};
pub use config::{load_app_config, load_app_config_from_env};
pub use options::{ScanOptions, DEFAULT_EXCLUDES, DEFAULT_IGNORE_WORDS};
pub use rows::{summarize, MatchRow, ProductSummary};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read catalog file {path}: {source}")]
    CatalogFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalog file: {0}")]
    CatalogFileParse(#[from] serde_yaml::Error),

    #[error("catalog line {line}: {reason}")]
    CatalogParse { line: usize, reason: String },

    #[error("catalog validation failed: {0}")]
    Validation(String),
}

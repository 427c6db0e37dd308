//! Error types for pmcheck configuration

use thiserror::Error;

/// Result type alias using [`ConfigError`]
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors raised while assembling settings or test data
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unsupported browser: {0} (expected chrome or firefox)")]
    UnsupportedBrowser(String),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Test data file not readable: {path}: {source}")]
    TestDataIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Test data YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

//! Error types for the browser layer, fixtures and runner

use thiserror::Error;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("Configuration error: {0}")]
    Config(#[from] pmcheck_common::ConfigError),

    #[error("WebDriver error: {0}")]
    WebDriver(#[from] thirtyfour::error::WebDriverError),

    #[error("Could not start a {browser} session at {url}: {reason}")]
    SessionStartup {
        browser: String,
        url: String,
        reason: String,
    },

    #[error("API error: {0}")]
    Api(#[from] pmcheck_api::ApiError),

    #[error("Report tool error: {0}")]
    Report(String),

    #[error("Allure command-line tool not found. Install it and make sure `allure` is on PATH")]
    AllureNotFound,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type E2eResult<T> = Result<T, E2eError>;

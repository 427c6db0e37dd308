//! Error types for the API client

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("API token is required. Set API_TOKEN to a token issued by the service")]
    MissingToken,

    /// Malformed call arguments; raised before any request is sent
    #[error("Invalid argument: {0}")]
    Validation(String),

    #[error("Unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    #[error("API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to create project: {0}")]
    CreateFailed(String),

    #[error("Response is missing field '{0}'")]
    MissingField(String),

    #[error("Response body is not the expected JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type ApiResult<T> = Result<T, ApiError>;

//! Owned snapshot of an HTTP response

use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiResult;

/// Status, headers and body of a response, read in full
///
/// Callers decide what a status code means; nothing here treats 4xx/5xx
/// as an error.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: String,
}

impl ApiResponse {
    pub(crate) async fn read(response: reqwest::Response) -> ApiResult<Self> {
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await?;
        Ok(Self {
            status,
            headers,
            body,
        })
    }

    /// Build a response by hand (fixtures, unit tests)
    pub fn from_parts(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Raw body text
    pub fn text(&self) -> &str {
        &self.body
    }

    pub fn json<T: DeserializeOwned>(&self) -> ApiResult<T> {
        Ok(serde_json::from_str(&self.body)?)
    }

    pub fn json_value(&self) -> ApiResult<Value> {
        self.json()
    }

    /// Whether the status code is one of `expected`
    pub fn is_one_of(&self, expected: &[u16]) -> bool {
        expected.contains(&self.status_code())
    }

    /// Best-effort error text; never fails
    ///
    /// A JSON object's `message` wins. Any other JSON yields `HTTP <status>`,
    /// and a body that is not JSON yields `HTTP <status>: <body>`.
    pub fn error_message(&self) -> String {
        match serde_json::from_str::<Value>(&self.body) {
            Ok(value) => match value.get("message") {
                Some(Value::String(message)) => message.clone(),
                Some(other) => other.to_string(),
                None => format!("HTTP {}", self.status_code()),
            },
            Err(_) => format!("HTTP {}: {}", self.status_code(), self.body),
        }
    }
}

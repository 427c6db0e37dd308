//! Projects API client
//!
//! Thin layer over one reusable `reqwest::Client`: argument validation,
//! URL building, bearer auth. Every CRUD call hands back the full
//! [`ApiResponse`]; classifying the status is the caller's job.

use std::str::FromStr;
use std::time::Duration;

use pmcheck_common::{ExpectedCodes, Settings};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method};
use serde::Serialize;
use serde_json::Value;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::error::{ApiError, ApiResult};
use crate::response::ApiResponse;

/// How many existence checks `wait_for_project_deletion` makes by default
pub const DEFAULT_DELETION_ATTEMPTS: u32 = 3;

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Verbs the client will send
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpVerb {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpVerb {
    fn method(self) -> Method {
        match self {
            HttpVerb::Get => Method::GET,
            HttpVerb::Post => Method::POST,
            HttpVerb::Put => Method::PUT,
            HttpVerb::Delete => Method::DELETE,
        }
    }

    fn carries_body(self) -> bool {
        matches!(self, HttpVerb::Post | HttpVerb::Put)
    }
}

impl FromStr for HttpVerb {
    type Err = ApiError;

    fn from_str(s: &str) -> ApiResult<Self> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpVerb::Get),
            "POST" => Ok(HttpVerb::Post),
            "PUT" => Ok(HttpVerb::Put),
            "DELETE" => Ok(HttpVerb::Delete),
            _ => Err(ApiError::UnsupportedMethod(s.to_string())),
        }
    }
}

impl std::fmt::Display for HttpVerb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.method().as_str())
    }
}

/// Client for the `/projects` resource
#[derive(Debug, Clone)]
pub struct ProjectsClient {
    http: Client,
    base_url: String,
    codes: ExpectedCodes,
    poll_interval: Duration,
}

impl ProjectsClient {
    /// Build a client from run settings; fails fast without a token
    pub fn new(settings: &Settings) -> ApiResult<Self> {
        let token = settings
            .api_token
            .as_deref()
            .ok_or(ApiError::MissingToken)?;
        Self::with_token(&settings.api_url, token, settings.api_timeout)
    }

    pub fn with_token(base_url: &str, token: &str, timeout: Duration) -> ApiResult<Self> {
        if token.trim().is_empty() {
            return Err(ApiError::MissingToken);
        }

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| {
            ApiError::Validation("API token contains characters not allowed in a header".into())
        })?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            codes: ExpectedCodes::default(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        })
    }

    /// Status-code table used by the convenience operations
    pub fn with_expected_codes(mut self, codes: ExpectedCodes) -> Self {
        self.codes = codes;
        self
    }

    /// Delay between checks in `wait_for_project_deletion`
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send `method endpoint` with an optional JSON body
    ///
    /// Only GET, POST, PUT and DELETE are accepted; anything else is rejected
    /// before a request is built.
    pub async fn request(
        &self,
        method: &str,
        endpoint: &str,
        body: Option<&Value>,
    ) -> ApiResult<ApiResponse> {
        let verb = method.parse::<HttpVerb>()?;
        self.send(verb, endpoint, body).await
    }

    async fn send(
        &self,
        verb: HttpVerb,
        endpoint: &str,
        body: Option<&Value>,
    ) -> ApiResult<ApiResponse> {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!("{} {}", verb, url);

        let mut builder = self.http.request(verb.method(), &url);
        if verb.carries_body() {
            if let Some(body) = body {
                builder = builder.json(body);
            }
        }

        let response = ApiResponse::read(builder.send().await?).await?;
        debug!("{} {} -> {}", verb, url, response.status());
        Ok(response)
    }

    /// `POST /projects`
    pub async fn create_project<T>(&self, data: &T) -> ApiResult<ApiResponse>
    where
        T: Serialize + ?Sized,
    {
        let body = project_payload(data)?;
        self.send(HttpVerb::Post, "/projects", Some(&body)).await
    }

    /// `GET /projects/{id}`
    pub async fn get_project(&self, project_id: &str) -> ApiResult<ApiResponse> {
        validate_project_id(project_id)?;
        self.send(HttpVerb::Get, &format!("/projects/{}", project_id), None)
            .await
    }

    /// `PUT /projects/{id}`
    pub async fn update_project<T>(&self, project_id: &str, data: &T) -> ApiResult<ApiResponse>
    where
        T: Serialize + ?Sized,
    {
        validate_project_id(project_id)?;
        let body = project_payload(data)?;
        self.send(
            HttpVerb::Put,
            &format!("/projects/{}", project_id),
            Some(&body),
        )
        .await
    }

    /// `DELETE /projects/{id}`
    pub async fn delete_project(&self, project_id: &str) -> ApiResult<ApiResponse> {
        validate_project_id(project_id)?;
        self.send(HttpVerb::Delete, &format!("/projects/{}", project_id), None)
            .await
    }

    /// `GET /projects`
    pub async fn get_all_projects(&self) -> ApiResult<ApiResponse> {
        self.send(HttpVerb::Get, "/projects", None).await
    }

    pub fn is_successful_response(&self, response: &ApiResponse, expected_codes: &[u16]) -> bool {
        response.is_one_of(expected_codes)
    }

    pub fn get_error_message(&self, response: &ApiResponse) -> String {
        response.error_message()
    }

    /// Create a project and return the id the service assigned
    pub async fn create_project_and_get_id<T>(&self, data: &T) -> ApiResult<String>
    where
        T: Serialize + ?Sized,
    {
        let response = self.create_project(data).await?;
        if !self.is_successful_response(&response, &self.codes.create) {
            return Err(ApiError::CreateFailed(self.get_error_message(&response)));
        }

        response
            .json_value()?
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| ApiError::MissingField("id".to_string()))
    }

    /// Whether `GET /projects/{id}` answers with a success code
    ///
    /// Transport failures count as "does not exist".
    pub async fn project_exists(&self, project_id: &str) -> bool {
        match self.get_project(project_id).await {
            Ok(response) => self.is_successful_response(&response, &self.codes.get),
            Err(e) => {
                debug!("Existence check for {} failed: {}", project_id, e);
                false
            }
        }
    }

    /// Poll until the project is gone, at most `max_attempts` checks
    pub async fn wait_for_project_deletion(&self, project_id: &str, max_attempts: u32) -> bool {
        for attempt in 1..=max_attempts {
            if !self.project_exists(project_id).await {
                debug!("Project {} gone after {} check(s)", project_id, attempt);
                return true;
            }
            if attempt < max_attempts {
                sleep(self.poll_interval).await;
            }
        }

        warn!(
            "Project {} still present after {} check(s)",
            project_id, max_attempts
        );
        false
    }
}

fn project_payload<T>(data: &T) -> ApiResult<Value>
where
    T: Serialize + ?Sized,
{
    let value = serde_json::to_value(data)
        .map_err(|e| ApiError::Validation(format!("Project data is not serializable: {}", e)))?;
    if !value.is_object() {
        return Err(ApiError::Validation(
            "Project data must be a JSON object".to_string(),
        ));
    }
    Ok(value)
}

fn validate_project_id(project_id: &str) -> ApiResult<()> {
    if project_id.is_empty() {
        return Err(ApiError::Validation(
            "Project ID must be a non-empty string".to_string(),
        ));
    }
    Ok(())
}

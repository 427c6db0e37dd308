//! Runtime settings
//!
//! Built once at process start from environment variables (with defaults)
//! and handed to the API client and fixtures by reference.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Token variables in lookup order; the first non-blank one wins
pub const TOKEN_VARS: [&str; 2] = ["API_TOKEN", "YOUGILE_TOKEN"];

/// Browser variants the fixtures know how to launch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrowserKind {
    #[default]
    Chrome,
    Firefox,
}

impl BrowserKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BrowserKind::Chrome => "chrome",
            BrowserKind::Firefox => "firefox",
        }
    }

    /// Where the matching driver (chromedriver / geckodriver) listens by default
    pub fn default_webdriver_url(&self) -> &'static str {
        match self {
            BrowserKind::Chrome => "http://localhost:9515",
            BrowserKind::Firefox => "http://localhost:4444",
        }
    }
}

impl FromStr for BrowserKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chrome" => Ok(BrowserKind::Chrome),
            "firefox" => Ok(BrowserKind::Firefox),
            _ => Err(ConfigError::UnsupportedBrowser(s.to_string())),
        }
    }
}

impl std::fmt::Display for BrowserKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Timeouts used by the element helper and the browser fixture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Waits {
    /// Default bound for click / type / text lookups
    pub element: Duration,
    /// Default bound for presence checks
    pub presence: Duration,
    /// Page load timeout handed to the driver
    pub page_load: Duration,
    /// Delay between element lookups while polling
    pub poll_interval: Duration,
}

impl Default for Waits {
    fn default() -> Self {
        Self {
            element: Duration::from_secs(10),
            presence: Duration::from_secs(5),
            page_load: Duration::from_secs(30),
            poll_interval: Duration::from_millis(500),
        }
    }
}

/// Settings for a test run
#[derive(Debug, Clone)]
pub struct Settings {
    /// Web UI root, page paths are resolved against it
    pub base_url: String,

    /// REST API root
    pub api_url: String,

    pub browser: BrowserKind,
    pub headless: bool,
    pub window_size: (u32, u32),

    /// WebDriver server (chromedriver / geckodriver / grid)
    pub webdriver_url: String,

    pub test_email: String,
    pub test_password: String,

    /// Bearer token for the API; required only by the API client
    pub api_token: Option<String>,
    pub api_timeout: Duration,

    pub waits: Waits,

    pub screenshots_dir: PathBuf,
    pub reports_dir: PathBuf,
    pub allure_results_dir: PathBuf,

    /// Optional YAML file overriding the built-in test data tables
    pub test_data_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        let browser = BrowserKind::default();
        Self {
            base_url: "https://ru.yougile.com".to_string(),
            api_url: "https://ru.yougile.com/api-v2".to_string(),
            browser,
            headless: false,
            window_size: (1920, 1080),
            webdriver_url: browser.default_webdriver_url().to_string(),
            test_email: "test@example.com".to_string(),
            test_password: "password123".to_string(),
            api_token: None,
            api_timeout: Duration::from_secs(30),
            waits: Waits::default(),
            screenshots_dir: PathBuf::from("screenshots"),
            reports_dir: PathBuf::from("reports"),
            allure_results_dir: PathBuf::from("allure-results"),
            test_data_file: None,
        }
    }
}

impl Settings {
    /// Read settings from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup, falling back to defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let browser = match lookup("BROWSER") {
            Some(raw) => raw.parse()?,
            None => defaults.browser,
        };

        let webdriver_url = lookup("WEBDRIVER_URL")
            .unwrap_or_else(|| browser.default_webdriver_url().to_string());

        let headless = lookup("HEADLESS")
            .map(|v| v.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(defaults.headless);

        let api_token = TOKEN_VARS
            .iter()
            .find_map(|&key| lookup(key).filter(|t| !t.trim().is_empty()));

        let waits = Waits {
            element: secs(&lookup, "ELEMENT_TIMEOUT", defaults.waits.element)?,
            presence: secs(&lookup, "PRESENCE_TIMEOUT", defaults.waits.presence)?,
            page_load: secs(&lookup, "PAGE_LOAD_TIMEOUT", defaults.waits.page_load)?,
            poll_interval: defaults.waits.poll_interval,
        };

        Ok(Self {
            base_url: lookup("BASE_URL").unwrap_or(defaults.base_url),
            api_url: lookup("API_URL").unwrap_or(defaults.api_url),
            browser,
            headless,
            window_size: defaults.window_size,
            webdriver_url,
            test_email: lookup("TEST_EMAIL").unwrap_or(defaults.test_email),
            test_password: lookup("TEST_PASSWORD").unwrap_or(defaults.test_password),
            api_token,
            api_timeout: secs(&lookup, "API_TIMEOUT", defaults.api_timeout)?,
            waits,
            screenshots_dir: lookup("SCREENSHOTS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.screenshots_dir),
            reports_dir: lookup("REPORTS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.reports_dir),
            allure_results_dir: lookup("ALLURE_RESULTS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.allure_results_dir),
            test_data_file: lookup("TEST_DATA_FILE").map(PathBuf::from),
        })
    }

    /// Absolute URL for a UI path such as `/login`
    pub fn page_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub fn has_api_token(&self) -> bool {
        self.api_token.is_some()
    }

    /// Create the output directories a run writes into
    pub fn ensure_output_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.screenshots_dir)?;
        std::fs::create_dir_all(&self.reports_dir)?;
        std::fs::create_dir_all(&self.allure_results_dir)?;
        Ok(())
    }
}

fn secs<F>(lookup: &F, key: &str, default: Duration) -> Result<Duration>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|_| ConfigError::InvalidValue {
                key: key.to_string(),
                value: raw,
            }),
    }
}

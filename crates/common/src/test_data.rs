//! Injectable test data
//!
//! Selectors, expected status-code tables and payloads belong to the hosted
//! product, which can change them at any time. They live here as data with
//! built-in defaults and can be overridden from a YAML file; a partial file
//! only replaces the fields it names.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::error::{ConfigError, Result};
use crate::locator::Locator;
use crate::settings::Settings;

/// All tables a suite run reads
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TestData {
    pub users: BTreeMap<String, TestUser>,

    /// Named project payloads (`valid_project`, `empty_project`, ...)
    pub projects: BTreeMap<String, Value>,

    /// Banner texts the product is expected to show
    pub messages: BTreeMap<String, String>,

    pub selectors: Selectors,

    pub codes: ExpectedCodes,

    /// Well-formed id that the service never issued
    pub nonexistent_project_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestUser {
    pub email: String,
    pub password: String,
    pub username: String,
}

/// Expected status codes per call site
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpectedCodes {
    pub create: Vec<u16>,
    pub get: Vec<u16>,
    pub update: Vec<u16>,
    /// Teardown deletes; 404 means the project is already gone
    pub cleanup: Vec<u16>,
    pub invalid_create: Vec<u16>,
    pub missing: Vec<u16>,
}

impl Default for ExpectedCodes {
    fn default() -> Self {
        Self {
            create: vec![201],
            get: vec![200],
            update: vec![200],
            cleanup: vec![200, 204, 404],
            invalid_create: vec![400, 422],
            missing: vec![404],
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Selectors {
    pub login: LoginSelectors,
    pub projects: ProjectSelectors,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginSelectors {
    pub path: String,
    pub email_input: Locator,
    pub password_input: Locator,
    pub submit_button: Locator,
    pub error_message: Locator,
    pub forgot_password_link: Locator,
    pub register_link: Locator,
}

impl Default for LoginSelectors {
    fn default() -> Self {
        Self {
            path: "/login".to_string(),
            email_input: Locator::name("email"),
            password_input: Locator::name("password"),
            submit_button: Locator::css("button[type='submit']"),
            error_message: Locator::css(".error-message"),
            forgot_password_link: Locator::link_text("Забыли пароль?"),
            register_link: Locator::link_text("Регистрация"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectSelectors {
    pub path: String,
    pub create_button: Locator,
    pub title_input: Locator,
    pub description_input: Locator,
    pub save_button: Locator,
    pub cancel_button: Locator,
    pub project_item: Locator,
    pub project_title: Locator,
    pub edit_button: Locator,
    pub delete_button: Locator,
    pub confirm_delete_button: Locator,
    pub success_message: Locator,
    pub error_message: Locator,
}

impl Default for ProjectSelectors {
    fn default() -> Self {
        Self {
            path: "/projects".to_string(),
            create_button: Locator::css("button[data-testid='create-project']"),
            title_input: Locator::css("input[name='title']"),
            description_input: Locator::css("textarea[name='description']"),
            save_button: Locator::css("button[type='submit']"),
            cancel_button: Locator::css("button[type='button']"),
            project_item: Locator::css(".project-item"),
            project_title: Locator::css(".project-title"),
            edit_button: Locator::css(".edit-project"),
            delete_button: Locator::css(".delete-project"),
            confirm_delete_button: Locator::css("button[data-testid='confirm-delete']"),
            success_message: Locator::css(".success-message"),
            error_message: Locator::css(".error-message"),
        }
    }
}

impl Default for TestData {
    fn default() -> Self {
        let users = BTreeMap::from([
            (
                "valid_user".to_string(),
                TestUser {
                    email: "test@example.com".to_string(),
                    password: "password123".to_string(),
                    username: "testuser".to_string(),
                },
            ),
            (
                "admin_user".to_string(),
                TestUser {
                    email: "admin@example.com".to_string(),
                    password: "admin123".to_string(),
                    username: "admin".to_string(),
                },
            ),
        ]);

        let projects = BTreeMap::from([
            ("valid_project".to_string(), json!({ "title": "Test Project" })),
            (
                "project_with_description".to_string(),
                json!({
                    "title": "Test Project with Description",
                    "description": "This is a test project description"
                }),
            ),
            ("invalid_project".to_string(), json!({ "title": "" })),
            ("empty_project".to_string(), json!({})),
        ]);

        let messages = BTreeMap::from([
            ("success_login".to_string(), "Добро пожаловать!".to_string()),
            (
                "error_invalid_credentials".to_string(),
                "Неверный логин или пароль".to_string(),
            ),
            ("success_project_created".to_string(), "Проект создан".to_string()),
            ("error_required_field".to_string(), "Это поле обязательно".to_string()),
            ("error_project_not_found".to_string(), "Проект не найден".to_string()),
        ]);

        Self {
            users,
            projects,
            messages,
            selectors: Selectors::default(),
            codes: ExpectedCodes::default(),
            nonexistent_project_id: "aaaaaaaa-aaaa-aaaa-aaaa-aaaaaaaaaaaa".to_string(),
        }
    }
}

impl TestData {
    /// Parse test data from a YAML string, filling gaps from the defaults
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(ConfigError::from)
    }

    /// Parse test data from a YAML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|source| ConfigError::TestDataIo {
                path: path.display().to_string(),
                source,
            })?;
        Self::from_yaml(&content)
    }

    /// Built-in tables, or the file named in the settings
    pub fn load(settings: &Settings) -> Result<Self> {
        match &settings.test_data_file {
            Some(path) => {
                debug!("Loading test data from {}", path.display());
                Self::from_file(path)
            }
            None => Ok(Self::default()),
        }
    }

    /// Named project payload, or an empty object when the name is unknown
    pub fn project(&self, name: &str) -> Value {
        self.projects.get(name).cloned().unwrap_or_else(|| json!({}))
    }

    pub fn message(&self, key: &str) -> Option<&str> {
        self.messages.get(key).map(String::as_str)
    }
}

/// `"<prefix> <8 hex chars>"`, unique enough to find our own records
pub fn unique_title(prefix: &str) -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    format!("{} {}", prefix, &id[..8])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
codes:
  create: [200, 201]
selectors:
  login:
    email_input: { by: id, value: login-email }
"#;
        let data = TestData::from_yaml(yaml).unwrap();
        assert_eq!(data.codes.create, vec![200, 201]);
        assert_eq!(data.codes.cleanup, vec![200, 204, 404]);
        assert_eq!(
            data.selectors.login.email_input,
            Locator::Id("login-email".to_string())
        );
        assert_eq!(data.selectors.login.password_input, Locator::name("password"));
        assert_eq!(data.selectors.projects.path, "/projects");
        assert_eq!(data.nonexistent_project_id, "aaaaaaaa-aaaa-aaaa-aaaa-aaaaaaaaaaaa");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.yaml");
        std::fs::write(&path, "nonexistent_project_id: missing-1\n").unwrap();

        let settings = Settings {
            test_data_file: Some(path),
            ..Default::default()
        };
        let data = TestData::load(&settings).unwrap();
        assert_eq!(data.nonexistent_project_id, "missing-1");
    }

    #[test]
    fn test_missing_file_names_the_path() {
        let err = TestData::from_file(Path::new("/nonexistent/data.yaml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/data.yaml"));
    }

    #[test]
    fn test_unique_title_shape() {
        let title = unique_title("Test Project");
        let suffix = title.strip_prefix("Test Project ").unwrap();
        assert_eq!(suffix.len(), 8);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(title, unique_title("Test Project"));
    }

    #[test]
    fn test_named_payloads() {
        let data = TestData::default();
        assert_eq!(data.project("empty_project"), json!({}));
        assert_eq!(data.project("valid_project")["title"], "Test Project");
        assert_eq!(data.project("no_such_payload"), json!({}));
    }
}

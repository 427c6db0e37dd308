//! Element locators

use serde::{Deserialize, Serialize};

/// How to find an element on a page
///
/// YAML form: `{ by: css, value: "button[type='submit']" }`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "by", content = "value", rename_all = "snake_case")]
pub enum Locator {
    Css(String),
    Name(String),
    Id(String),
    LinkText(String),
    #[serde(rename = "xpath")]
    XPath(String),
}

impl Locator {
    pub fn css(selector: impl Into<String>) -> Self {
        Locator::Css(selector.into())
    }

    pub fn name(name: impl Into<String>) -> Self {
        Locator::Name(name.into())
    }

    pub fn link_text(text: impl Into<String>) -> Self {
        Locator::LinkText(text.into())
    }

    pub fn value(&self) -> &str {
        match self {
            Locator::Css(v)
            | Locator::Name(v)
            | Locator::Id(v)
            | Locator::LinkText(v)
            | Locator::XPath(v) => v,
        }
    }

    pub fn strategy(&self) -> &'static str {
        match self {
            Locator::Css(_) => "css",
            Locator::Name(_) => "name",
            Locator::Id(_) => "id",
            Locator::LinkText(_) => "link_text",
            Locator::XPath(_) => "xpath",
        }
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.strategy(), self.value())
    }
}

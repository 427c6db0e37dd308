//! pmcheck Common Library
//!
//! Settings, locators and the injectable test data tables shared by the
//! API client, the browser layer and the runner.

pub mod error;
pub mod locator;
pub mod settings;
pub mod test_data;

pub use error::{ConfigError, Result};
pub use locator::Locator;
pub use settings::{BrowserKind, Settings, Waits, TOKEN_VARS};
pub use test_data::{
    unique_title, ExpectedCodes, LoginSelectors, ProjectSelectors, Selectors, TestData, TestUser,
};

/// pmcheck version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

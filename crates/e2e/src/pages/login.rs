//! Login screen

use pmcheck_common::{LoginSelectors, Settings};
use tracing::info;

use crate::error::E2eResult;
use crate::page::{step, ElementHelper, Outcome, PageDriver};

pub struct LoginPage<D> {
    helper: ElementHelper<D>,
    selectors: LoginSelectors,
    url: String,
}

impl<D: PageDriver> LoginPage<D> {
    pub fn new(helper: ElementHelper<D>, settings: &Settings, selectors: &LoginSelectors) -> Self {
        Self {
            url: settings.page_url(&selectors.path),
            selectors: selectors.clone(),
            helper,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn open_login_page(&self) -> E2eResult<()> {
        self.helper.open(&self.url).await
    }

    pub async fn enter_email(&self, email: &str) -> E2eResult<Outcome> {
        self.helper.send_keys(&self.selectors.email_input, email).await
    }

    pub async fn enter_password(&self, password: &str) -> E2eResult<Outcome> {
        self.helper
            .send_keys(&self.selectors.password_input, password)
            .await
    }

    pub async fn click_login_button(&self) -> E2eResult<Outcome> {
        self.helper.click(&self.selectors.submit_button).await
    }

    /// Open the page, fill both fields and submit; stops at the first step
    /// that times out
    pub async fn login(&self, email: &str, password: &str) -> E2eResult<Outcome> {
        info!("Logging in as {}", email);
        self.open_login_page().await?;
        step!(self.enter_email(email).await?);
        step!(self.enter_password(password).await?);
        self.click_login_button().await
    }

    /// Error banner text, empty when there is none
    pub async fn get_error_message(&self) -> E2eResult<String> {
        Ok(self
            .helper
            .get_text(&self.selectors.error_message)
            .await?
            .text_or_empty())
    }

    pub async fn is_error_message_present(&self) -> E2eResult<bool> {
        self.helper
            .is_element_present(&self.selectors.error_message)
            .await
    }

    /// Logged in once the browser has left any URL containing "login"
    pub async fn is_login_successful(&self) -> E2eResult<bool> {
        let url = self.helper.current_url().await?;
        Ok(!url.to_lowercase().contains("login"))
    }

    pub async fn click_forgot_password(&self) -> E2eResult<Outcome> {
        self.helper
            .click(&self.selectors.forgot_password_link)
            .await
    }

    pub async fn click_register_link(&self) -> E2eResult<Outcome> {
        self.helper.click(&self.selectors.register_link).await
    }
}

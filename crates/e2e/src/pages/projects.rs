//! Projects screen

use std::time::Duration;

use pmcheck_common::{Locator, ProjectSelectors, Settings};
use tracing::{debug, info};

use crate::error::E2eResult;
use crate::page::{step, ElementHelper, Outcome, PageDriver, PageElement};

pub struct ProjectsPage<D> {
    helper: ElementHelper<D>,
    selectors: ProjectSelectors,
    url: String,
}

impl<D: PageDriver> ProjectsPage<D> {
    pub fn new(
        helper: ElementHelper<D>,
        settings: &Settings,
        selectors: &ProjectSelectors,
    ) -> Self {
        Self {
            url: settings.page_url(&selectors.path),
            selectors: selectors.clone(),
            helper,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn open_projects_page(&self) -> E2eResult<()> {
        self.helper.open(&self.url).await
    }

    pub async fn click_create_project(&self) -> E2eResult<Outcome> {
        self.helper.click(&self.selectors.create_button).await
    }

    pub async fn enter_project_title(&self, title: &str) -> E2eResult<Outcome> {
        self.helper
            .send_keys(&self.selectors.title_input, title)
            .await
    }

    pub async fn enter_project_description(&self, description: &str) -> E2eResult<Outcome> {
        self.helper
            .send_keys(&self.selectors.description_input, description)
            .await
    }

    pub async fn click_save_project(&self) -> E2eResult<Outcome> {
        self.helper.click(&self.selectors.save_button).await
    }

    pub async fn click_cancel(&self) -> E2eResult<Outcome> {
        self.helper.click(&self.selectors.cancel_button).await
    }

    /// Open the create dialog, fill it in and save
    ///
    /// An empty description is treated like no description.
    pub async fn create_project(
        &self,
        title: &str,
        description: Option<&str>,
    ) -> E2eResult<Outcome> {
        info!("Creating project {:?} through the UI", title);
        step!(self.click_create_project().await?);
        step!(self.enter_project_title(title).await?);
        step!(self.fill_description(description).await?);
        self.click_save_project().await
    }

    /// Text of every project card on the page
    pub async fn get_projects_list(&self) -> E2eResult<Vec<String>> {
        let mut titles = Vec::new();
        for item in self.helper.find_elements(&self.selectors.project_item).await? {
            titles.push(item.text().await?);
        }
        Ok(titles)
    }

    /// Whether any project title contains `title`
    pub async fn find_project_by_title(&self, title: &str) -> E2eResult<bool> {
        for element in self.helper.find_elements(&self.selectors.project_title).await? {
            if element.text().await?.contains(title) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Edit the first project whose card text contains `old_title`
    pub async fn edit_project(
        &self,
        old_title: &str,
        new_title: &str,
        new_description: Option<&str>,
    ) -> E2eResult<Outcome> {
        info!("Renaming project {:?} to {:?}", old_title, new_title);
        step!(
            self.click_in_item(old_title, &self.selectors.edit_button)
                .await?
        );
        step!(self.enter_project_title(new_title).await?);
        step!(self.fill_description(new_description).await?);
        self.click_save_project().await
    }

    /// Delete the first project whose card text contains `title`, then confirm
    pub async fn delete_project(&self, title: &str) -> E2eResult<Outcome> {
        info!("Deleting project {:?} through the UI", title);
        step!(
            self.click_in_item(title, &self.selectors.delete_button)
                .await?
        );
        self.helper
            .click(&self.selectors.confirm_delete_button)
            .await
    }

    pub async fn get_success_message(&self) -> E2eResult<String> {
        Ok(self
            .helper
            .get_text(&self.selectors.success_message)
            .await?
            .text_or_empty())
    }

    pub async fn get_error_message(&self) -> E2eResult<String> {
        Ok(self
            .helper
            .get_text(&self.selectors.error_message)
            .await?
            .text_or_empty())
    }

    pub async fn is_success_message_present(&self) -> E2eResult<bool> {
        self.helper
            .is_element_present(&self.selectors.success_message)
            .await
    }

    pub async fn is_error_message_present(&self) -> E2eResult<bool> {
        self.helper
            .is_element_present(&self.selectors.error_message)
            .await
    }

    async fn fill_description(&self, description: Option<&str>) -> E2eResult<Outcome> {
        match description.filter(|d| !d.is_empty()) {
            Some(text) => self.enter_project_description(text).await,
            None => Ok(Outcome::Done(())),
        }
    }

    /// Click `button` inside the first project card whose text contains `title`
    ///
    /// No matching card reports a timeout on the card locator; a card without
    /// the button reports a zero-length timeout on the button.
    async fn click_in_item(&self, title: &str, button: &Locator) -> E2eResult<Outcome> {
        for item in self.helper.find_elements(&self.selectors.project_item).await? {
            if !item.text().await?.contains(title) {
                continue;
            }
            return match item.find_all(button).await?.into_iter().next() {
                Some(element) => {
                    element.click().await?;
                    Ok(Outcome::Done(()))
                }
                None => {
                    debug!("Project card {:?} has no {}", title, button);
                    Ok(Outcome::timed_out(button, Duration::ZERO))
                }
            };
        }
        debug!("No project card contains {:?}", title);
        Ok(Outcome::timed_out(
            &self.selectors.project_item,
            self.helper.waits().element,
        ))
    }
}

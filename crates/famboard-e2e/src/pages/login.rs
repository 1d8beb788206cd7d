use famboard_browser::{Driver, Locator};

use super::{
    AppWaits, click_single_visible, logout_probes, trimmed_text, wait_hidden, wait_text_contains,
    wait_visible,
};
use crate::error::Result;
use crate::selectors as sel;

/// The hosted login entry point used by the smoke tests.
pub struct LoginPage<D> {
    driver: D,
    url: String,
    waits: AppWaits,
}

impl<D: Driver> LoginPage<D> {
    pub fn new(driver: D, url: impl Into<String>, waits: AppWaits) -> Self {
        Self {
            driver,
            url: url.into(),
            waits,
        }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn into_driver(self) -> D {
        self.driver
    }

    pub async fn open_home(&self) -> Result<()> {
        self.driver.goto(&self.url).await?;
        Ok(())
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<()> {
        let email_input = Locator::css(sel::LOGIN_EMAIL);
        wait_visible(&self.driver, &email_input, self.waits.default).await?;
        self.driver.fill(&email_input, email).await?;
        self.driver.fill(&Locator::css(sel::LOGIN_PASSWORD), password).await?;
        self.driver.click(&Locator::css(sel::LOGIN_BUTTON)).await?;
        Ok(())
    }

    pub async fn wait_until_logged_in(&self, email: &str) -> Result<()> {
        wait_visible(&self.driver, &Locator::css(sel::TASKS_SECTION), self.waits.default).await?;
        wait_text_contains(
            &self.driver,
            &Locator::css(sel::USER_EMAIL),
            &[email],
            self.waits.default,
        )
        .await
    }

    pub async fn is_auth_section_hidden(&self) -> Result<bool> {
        Ok(self.driver.is_hidden(&Locator::css(sel::AUTH_SECTION)).await?)
    }

    pub async fn is_tasks_section_visible(&self) -> Result<bool> {
        Ok(self.driver.is_visible(&Locator::css(sel::TASKS_SECTION)).await?)
    }

    pub async fn user_email_text(&self) -> Result<String> {
        trimmed_text(&self.driver, &Locator::css(sel::USER_EMAIL)).await
    }

    pub async fn is_auth_error_hidden(&self) -> Result<bool> {
        Ok(self.driver.is_hidden(&Locator::css(sel::AUTH_ERROR)).await?)
    }

    /// Logs out through the single visible logout control and waits for
    /// the auth section to return.
    pub async fn logout(&self) -> Result<()> {
        click_single_visible(&self.driver, &logout_probes(), "logout").await?;
        wait_visible(&self.driver, &Locator::css(sel::AUTH_SECTION), self.waits.default).await?;
        wait_hidden(&self.driver, &Locator::css(sel::TASKS_SECTION), self.waits.default).await
    }
}

//! The identity currently logged in on the shared page.
//!
//! `ActorSession` only records an identity after the UI has confirmed it:
//! the page object waits for the logged-in state and `whoami` must then
//! report the expected email. A switch records `Anonymous` as soon as the
//! logout is confirmed, so a login failing mid-switch never leaves the old
//! identity recorded.

use famboard_browser::Driver;
use famboard_config::{Credentials, Role};
use tracing::info;

use crate::error::{E2eError, Result};
use crate::pages::FamilyAppPage;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Anonymous,
    Authenticated(Credentials),
}

#[derive(Debug, Default)]
pub struct ActorSession {
    state: SessionState,
}

impl ActorSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn current(&self) -> Option<&Credentials> {
        match &self.state {
            SessionState::Authenticated(credentials) => Some(credentials),
            SessionState::Anonymous => None,
        }
    }

    pub fn role(&self) -> Option<Role> {
        self.current().map(Credentials::role)
    }

    pub fn is_authenticated(&self) -> bool {
        self.current().is_some()
    }

    /// Logs in from the anonymous state.
    pub async fn login<D: Driver>(
        &mut self,
        page: &FamilyAppPage<D>,
        credentials: &Credentials,
    ) -> Result<()> {
        if let Some(current) = self.current() {
            return Err(E2eError::AmbiguousState(format!(
                "login as {} requested while {} is logged in",
                credentials.email(),
                current.email()
            )));
        }

        page.login(credentials.email(), credentials.password()).await?;
        page.wait_until_logged_in(credentials.email()).await?;
        self.confirm(page, credentials).await
    }

    pub async fn logout<D: Driver>(&mut self, page: &FamilyAppPage<D>) -> Result<()> {
        if !self.is_authenticated() {
            return Err(E2eError::AmbiguousState(
                "logout requested with no identity logged in".to_string(),
            ));
        }

        page.logout().await?;
        info!("logged out");
        self.state = SessionState::Anonymous;
        Ok(())
    }

    /// Switches to `credentials`: logout, login, confirm. From the anonymous
    /// state this is a plain login.
    pub async fn switch_identity<D: Driver>(
        &mut self,
        page: &FamilyAppPage<D>,
        credentials: &Credentials,
    ) -> Result<()> {
        if self.is_authenticated() {
            self.logout(page).await?;
        }
        self.login(page, credentials).await
    }

    async fn confirm<D: Driver>(
        &mut self,
        page: &FamilyAppPage<D>,
        credentials: &Credentials,
    ) -> Result<()> {
        let shown = page.whoami().await?;
        if !shown.contains(credentials.email()) {
            return Err(E2eError::assertion(
                format!(
                    "UI shows '{shown}' after logging in as {}",
                    credentials.email()
                ),
                page.driver().diagnostics().await,
            ));
        }

        info!(role = %credentials.role(), "logged in as {}", credentials.email());
        self.state = SessionState::Authenticated(credentials.clone());
        Ok(())
    }
}

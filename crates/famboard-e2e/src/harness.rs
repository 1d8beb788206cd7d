//! Run-level setup and teardown.
//!
//! One [`SuiteHarness`] per run: it loads settings and credentials before
//! any browser interaction and launches a single Chrome for the
//! environment. Each scenario gets its own page in an isolated browser
//! context, released whatever the outcome of the work done on it.
//! [`run_scenarios`] drives a list of scenarios against one harness.

use futures::future::BoxFuture;

use famboard_api::ApiClient;
use famboard_browser::{Page, Result as BrowserResult, TestBrowser, TestBrowserConfig};
use famboard_config::{CredentialProfiles, SuiteSettings, export_results_dir};
use tracing::{error, info, warn};

use crate::data::JourneyArtifacts;
use crate::error::{E2eError, Result};
use crate::journey::{Journey, SessionContext};
use crate::logging::init_test_logging;
use crate::pages::{AppWaits, FamilyAppPage, LoginPage};

pub struct SuiteHarness {
    settings: SuiteSettings,
    profiles: CredentialProfiles,
    browser: TestBrowser,
}

impl SuiteHarness {
    /// Loads configuration and launches the browser.
    pub async fn start() -> Result<Self> {
        init_test_logging();
        let settings = SuiteSettings::load()?;
        let profiles = CredentialProfiles::from_env()?;
        Self::start_with(settings, profiles).await
    }

    pub async fn start_with(settings: SuiteSettings, profiles: CredentialProfiles) -> Result<Self> {
        init_test_logging();
        export_results_dir();

        let browser = TestBrowser::launch(TestBrowserConfig::for_environment(settings.ci)).await?;
        info!(app_url = %settings.app_url, ci = settings.ci, "suite harness ready");

        Ok(Self {
            settings,
            profiles,
            browser,
        })
    }

    pub fn settings(&self) -> &SuiteSettings {
        &self.settings
    }

    pub fn profiles(&self) -> &CredentialProfiles {
        &self.profiles
    }

    pub fn waits(&self) -> AppWaits {
        AppWaits::from_settings(&self.settings.waits)
    }

    /// A client for the configured REST API.
    pub fn api_client(&self) -> Result<ApiClient> {
        Ok(ApiClient::new(
            self.settings.api_base_url.clone(),
            self.settings.api_token.clone(),
        )?)
    }

    pub async fn family_app(&self) -> Result<FamilyAppPage<Page>> {
        let page = self.browser.new_isolated_page().await?;
        Ok(FamilyAppPage::new(page, self.settings.app_url.clone(), self.waits()))
    }

    pub async fn login_page(&self) -> Result<LoginPage<Page>> {
        let page = self.browser.new_isolated_page().await?;
        Ok(LoginPage::new(page, self.settings.login_url.clone(), self.waits()))
    }

    /// Runs `work` on a fresh family app page, then releases the page.
    ///
    /// The work's error takes precedence over a release error.
    pub async fn with_family_app<T, F>(&self, work: F) -> Result<T>
    where
        F: for<'a> FnOnce(&'a mut FamilyAppPage<Page>) -> BoxFuture<'a, Result<T>>,
    {
        let mut app = self.family_app().await?;
        let outcome = work(&mut app).await;
        self.finish(outcome, app.into_driver()).await
    }

    /// Like [`with_family_app`](Self::with_family_app) for the login page.
    pub async fn with_login_page<T, F>(&self, work: F) -> Result<T>
    where
        F: for<'a> FnOnce(&'a mut LoginPage<Page>) -> BoxFuture<'a, Result<T>>,
    {
        let mut login = self.login_page().await?;
        let outcome = work(&mut login).await;
        self.finish(outcome, login.into_driver()).await
    }

    /// Runs the whole family journey as the default (parent) profile.
    pub async fn run_family_journey(&self) -> Result<JourneyArtifacts> {
        let parent = self.profiles.parent()?.clone();
        let artifacts = JourneyArtifacts::generate();
        info!(token = %artifacts.token, parent = parent.email(), "starting family journey");

        let page = self.family_app().await?;
        let mut ctx = SessionContext::new(page, parent, artifacts);
        let outcome = Journey::from_settings(&self.settings).run(&mut ctx).await;

        let artifacts = ctx.artifacts.clone();
        let page = ctx.into_page().into_driver();
        self.finish(outcome.map(|()| artifacts), page).await
    }

    async fn finish<T>(&self, outcome: Result<T>, page: Page) -> Result<T> {
        if let Err(err) = &outcome {
            let console = page.console().tail(10);
            if !console.is_empty() {
                warn!("browser console before failure:\n{}", console);
            }
            warn!("releasing page after failure: {}", err);
        }

        let released = self.browser.release(page).await;
        settle(outcome, released)
    }

    /// Closes the browser.
    pub async fn shutdown(self) -> Result<()> {
        self.browser.close().await?;
        Ok(())
    }
}

/// Combines the work outcome with the page release result. The work's
/// error wins; a release error behind it is logged, not lost.
fn settle<T>(outcome: Result<T>, released: BrowserResult<()>) -> Result<T> {
    match (outcome, released) {
        (Ok(value), released) => Ok(released.map(|()| value)?),
        (Err(err), Ok(())) => Err(err),
        (Err(err), Err(release_err)) => {
            warn!("page release also failed: {}", release_err);
            Err(err)
        }
    }
}

/// A named scenario run against a shared context.
pub struct Scenario<C: ?Sized> {
    pub name: &'static str,
    pub run: for<'a> fn(&'a C) -> BoxFuture<'a, Result<()>>,
}

impl<C: ?Sized> Scenario<C> {
    pub const fn new(name: &'static str, run: for<'a> fn(&'a C) -> BoxFuture<'a, Result<()>>) -> Self {
        Self { name, run }
    }
}

/// Outcome of a scenario run.
#[derive(Debug, Default)]
pub struct ScenarioReport {
    pub passed: Vec<&'static str>,
    pub failed: Vec<(&'static str, E2eError)>,
    pub skipped: Vec<&'static str>,
}

impl ScenarioReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Runs the scenarios whose name contains `filter` in order, one after the
/// other, against the same context. A failure is recorded and the next
/// scenario still runs.
pub async fn run_scenarios<C: ?Sized>(
    ctx: &C,
    scenarios: &[Scenario<C>],
    filter: Option<&str>,
) -> ScenarioReport {
    let mut report = ScenarioReport::default();
    for scenario in scenarios {
        if filter.is_some_and(|f| !scenario.name.contains(f)) {
            report.skipped.push(scenario.name);
            continue;
        }

        info!("scenario {} ...", scenario.name);
        match (scenario.run)(ctx).await {
            Ok(()) => {
                info!("scenario {} ok", scenario.name);
                report.passed.push(scenario.name);
            }
            Err(err) => {
                error!("scenario {} FAILED: {}", scenario.name, err);
                report.failed.push((scenario.name, err));
            }
        }
    }
    report
}

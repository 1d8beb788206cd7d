//! Page objects.
//!
//! Page objects are written against [`Driver`], never against a concrete
//! browser. Every mutating action follows the same shape: locate, wait for
//! the element to be actionable, act, then wait for a confirmation that the
//! UI reflects the change. Structural queries (`is_*_visible`,
//! `message_exists`, ...) take a single snapshot and never poll.

mod family;
mod login;

pub use family::{FamilyAppPage, TaskRecord, TaskState};
pub use login::LoginPage;

use std::time::Duration;

use famboard_browser::wait::{poll_until_result, wait_until};
use famboard_browser::{Driver, Locator, WaitConfig};
use famboard_config::WaitSettings;
use tracing::debug;

use crate::error::{E2eError, Result};
use crate::selectors as sel;

/// The wait budgets page objects use, one per kind of confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppWaits {
    pub default: WaitConfig,
    pub family_name: WaitConfig,
    pub child_listing: WaitConfig,
    pub child_listing_retry: WaitConfig,
    pub completion: WaitConfig,
    pub archive: WaitConfig,
    pub calendar_grid: WaitConfig,
}

impl AppWaits {
    pub fn from_settings(waits: &WaitSettings) -> Self {
        let poll = waits.poll_interval();
        let config = |ms: u64| WaitConfig::new(Duration::from_millis(ms), poll);
        Self {
            default: config(waits.default_ms),
            family_name: config(waits.family_name_ms),
            child_listing: config(waits.child_listing_ms),
            child_listing_retry: config(waits.child_listing_retry_ms),
            completion: config(waits.completion_ms),
            archive: config(waits.archive_ms),
            calendar_grid: config(waits.calendar_grid_ms),
        }
    }

    /// The same budget for every wait.
    pub fn uniform(config: WaitConfig) -> Self {
        Self {
            default: config,
            family_name: config,
            child_listing: config,
            child_listing_retry: config,
            completion: config,
            archive: config,
            calendar_grid: config,
        }
    }
}

impl Default for AppWaits {
    fn default() -> Self {
        Self::from_settings(&WaitSettings::default())
    }
}

pub(crate) async fn wait_visible<D>(driver: &D, locator: &Locator, config: WaitConfig) -> Result<()>
where
    D: Driver + ?Sized,
{
    let description = format!("{locator} to be visible");
    wait_until(driver, move || driver.is_visible(locator), config, &description).await?;
    Ok(())
}

pub(crate) async fn wait_hidden<D>(driver: &D, locator: &Locator, config: WaitConfig) -> Result<()>
where
    D: Driver + ?Sized,
{
    let description = format!("{locator} to be hidden");
    wait_until(driver, move || driver.is_hidden(locator), config, &description).await?;
    Ok(())
}

/// Hard wait until the first match's text contains any of `needles`.
pub(crate) async fn wait_text_contains<D>(
    driver: &D,
    locator: &Locator,
    needles: &[&str],
    config: WaitConfig,
) -> Result<()>
where
    D: Driver + ?Sized,
{
    let description = format!("{locator} to contain {needles:?}");
    wait_until(
        driver,
        move || text_contains_any(driver, locator, needles),
        config,
        &description,
    )
    .await?;
    Ok(())
}

/// Soft variant of [`wait_text_contains`].
pub(crate) async fn poll_text_contains<D>(
    driver: &D,
    locator: &Locator,
    needles: &[&str],
    config: WaitConfig,
) -> bool
where
    D: Driver + ?Sized,
{
    poll_until_result(move || text_contains_any(driver, locator, needles), config).await
}

async fn text_contains_any<D>(driver: &D, locator: &Locator, needles: &[&str]) -> famboard_browser::Result<bool>
where
    D: Driver + ?Sized,
{
    let text = driver.text_content(locator).await?.unwrap_or_default();
    Ok(needles
        .iter()
        .any(|needle| !needle.is_empty() && text.contains(needle)))
}

/// Trimmed text of the first match, empty when nothing matches.
pub(crate) async fn trimmed_text<D>(driver: &D, locator: &Locator) -> Result<String>
where
    D: Driver + ?Sized,
{
    Ok(driver
        .text_content(locator)
        .await?
        .map(|text| text.trim().to_string())
        .unwrap_or_default())
}

/// Clicks the one visible control among `probes`.
///
/// Every probe is checked. Exactly one visible probe is clicked; none or
/// several visible is an [`E2eError::AmbiguousState`].
pub(crate) async fn click_single_visible<D>(driver: &D, probes: &[Locator], what: &str) -> Result<()>
where
    D: Driver + ?Sized,
{
    let mut visible = Vec::new();
    for probe in probes {
        if driver.is_visible(probe).await? {
            visible.push(probe);
        }
    }

    match visible.as_slice() {
        [only] => {
            debug!("clicking {} control {}", what, only);
            driver.click(only).await?;
            Ok(())
        }
        [] => Err(E2eError::AmbiguousState(format!(
            "no {what} control is visible (probed {})",
            describe(probes)
        ))),
        many => Err(E2eError::AmbiguousState(format!(
            "{} {what} controls are visible at once: {}",
            many.len(),
            many.iter()
                .map(|l| l.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        ))),
    }
}

fn describe(locators: &[Locator]) -> String {
    locators
        .iter()
        .map(|l| l.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Logout controls in probe order.
pub(crate) fn logout_probes() -> [Locator; 2] {
    [
        Locator::css(sel::SIDEBAR_LOGOUT),
        Locator::css(sel::AUTH_PANEL_LOGOUT),
    ]
}

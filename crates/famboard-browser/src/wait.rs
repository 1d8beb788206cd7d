//! Condition waits and bounded retries.
//!
//! UI state changes asynchronously relative to the action that triggers it,
//! so every check against the rendered page is a poll: evaluate a predicate,
//! sleep `poll_interval`, repeat until it holds or `timeout` elapses.
//!
//! Two flavors exist:
//!
//! - **hard** waits ([`wait_for`], [`wait_for_result`], [`wait_until`])
//!   return `BrowserError::WaitTimeout` when the deadline passes;
//! - **soft** waits ([`poll_until`], [`poll_until_result`]) return `false`
//!   and leave the decision to the caller.
//!
//! Errors raised by a predicate are treated as "not yet": the DOM may be
//! mid re-render, which is exactly what the poll is waiting out.

use crate::driver::Driver;
use crate::error::{BrowserError, Result};
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, trace};

/// Default timeout for wait operations (30 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default poll interval for checking conditions (100ms).
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Configuration for wait operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitConfig {
    /// Maximum time to wait for the condition.
    pub timeout: Duration,

    /// How often to check if the condition is satisfied.
    pub poll_interval: Duration,
}

impl WaitConfig {
    /// Creates a new wait configuration.
    #[must_use]
    pub fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            timeout,
            poll_interval,
        }
    }

    /// Creates a config with custom timeout and default poll interval.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::new(timeout, DEFAULT_POLL_INTERVAL)
    }
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT, DEFAULT_POLL_INTERVAL)
    }
}

/// Polls `condition` until it returns true or the timeout expires.
///
/// Soft wait: returns whether the condition was observed, never an error.
/// The condition is always evaluated at least once, even with a zero timeout.
pub async fn poll_until<F, Fut>(condition: F, config: WaitConfig) -> bool
where
    F: Fn() -> Fut,
    Fut: Future<Output = bool>,
{
    let start = Instant::now();

    loop {
        if condition().await {
            return true;
        }

        if start.elapsed() >= config.timeout {
            return false;
        }

        sleep(config.poll_interval).await;
    }
}

/// Soft wait over a fallible condition. Errors count as "not yet".
pub async fn poll_until_result<F, Fut>(condition: F, config: WaitConfig) -> bool
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    poll_until(
        || {
            let fut = condition();
            async move {
                match fut.await {
                    Ok(ready) => ready,
                    Err(err) => {
                        trace!("condition probe failed, retrying: {}", err);
                        false
                    }
                }
            }
        },
        config,
    )
    .await
}

/// Waits for a condition to become true, with timeout.
///
/// Hard wait: fails with `WaitTimeout` naming `description`.
///
/// # Example
///
/// ```ignore
/// wait_for(
///     || async { element.is_visible().await },
///     WaitConfig::default(),
///     "element to be visible"
/// ).await?;
/// ```
pub async fn wait_for<F, Fut>(condition: F, config: WaitConfig, description: &str) -> Result<()>
where
    F: Fn() -> Fut,
    Fut: Future<Output = bool>,
{
    if poll_until(condition, config).await {
        Ok(())
    } else {
        Err(timeout_error(description, config))
    }
}

/// Hard wait over a fallible condition.
///
/// If the condition returns an error, we continue waiting (the error
/// might be transient, like an element detached mid-render).
pub async fn wait_for_result<F, Fut>(
    condition: F,
    config: WaitConfig,
    description: &str,
) -> Result<()>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    if poll_until_result(condition, config).await {
        Ok(())
    } else {
        Err(timeout_error(description, config))
    }
}

/// Hard wait against a driver: on timeout the driver's diagnostic snapshot
/// is attached to the error.
pub async fn wait_until<D, F, Fut>(
    driver: &D,
    condition: F,
    config: WaitConfig,
    description: &str,
) -> Result<()>
where
    D: Driver + ?Sized,
    F: Fn() -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    match wait_for_result(condition, config, description).await {
        Ok(()) => Ok(()),
        Err(err) => {
            let snapshot = driver.diagnostics().await;
            debug!("wait for '{}' timed out; snapshot: {}", description, snapshot);
            Err(err.with_snapshot(snapshot))
        }
    }
}

fn timeout_error(description: &str, config: WaitConfig) -> BrowserError {
    BrowserError::WaitTimeout {
        condition: description.to_string(),
        timeout: config.timeout,
        snapshot: None,
    }
}

/// Default number of attempts for retried operations.
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;

/// Default pause between retried attempts.
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_millis(500);

/// A bounded retry budget.
///
/// Callers drive the loop themselves (the retried operation usually needs
/// mutable access to a session) and use [`RetryPolicy::attempts`] and
/// [`RetryPolicy::pause`] to stay inside the budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one. Never less than 1.
    pub attempts: u32,

    /// Pause between consecutive attempts.
    pub backoff: Duration,
}

impl RetryPolicy {
    /// Creates a policy; `attempts` is clamped to at least 1.
    #[must_use]
    pub fn new(attempts: u32, backoff: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            backoff,
        }
    }

    /// Iterates attempt numbers, starting at 1.
    pub fn attempts(&self) -> impl Iterator<Item = u32> {
        1..=self.attempts.max(1)
    }

    /// Returns true if `attempt` is the last one in the budget.
    #[must_use]
    pub fn is_last(&self, attempt: u32) -> bool {
        attempt >= self.attempts.max(1)
    }

    /// Sleeps for the backoff unless `attempt` was the last one.
    pub async fn pause(&self, attempt: u32) {
        if !self.is_last(attempt) && !self.backoff.is_zero() {
            sleep(self.backoff).await;
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_RETRY_ATTEMPTS, DEFAULT_RETRY_BACKOFF)
    }
}

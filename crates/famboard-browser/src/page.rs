//! Page-level browser operations.
//!
//! `Page` wraps a chromiumoxide tab. It captures console output, paces
//! actions when slow motion is enabled, and implements [`Driver`] by
//! evaluating small JavaScript snippets built from [`Locator`]s.

use crate::console::{parse_console_event, parse_exception_event, ConsoleCapture};
use crate::driver::{Driver, SelectOption};
use crate::error::{BrowserError, Result};
use crate::locator::{js_string, Locator};
use crate::wait::{wait_for_result, WaitConfig};
use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::browser::BrowserContextId;
use chromiumoxide::cdp::js_protocol::runtime::{EventConsoleApiCalled, EventExceptionThrown};
use chromiumoxide::page::Page as ChromePage;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

/// Characters of `document.body.innerText` kept in a diagnostic snapshot.
const SNAPSHOT_BODY_CHARS: usize = 600;

/// A browser tab with testing capabilities.
#[derive(Debug)]
pub struct Page {
    inner: ChromePage,
    console: ConsoleCapture,
    slow_mo: Duration,
    context: Option<BrowserContextId>,
    listeners: Vec<JoinHandle<()>>,
}

impl Page {
    /// Wraps a tab and starts console / page error capture.
    pub(crate) async fn attach(
        page: ChromePage,
        slow_mo: Duration,
        context: Option<BrowserContextId>,
    ) -> Result<Self> {
        let console = ConsoleCapture::new();

        let mut console_events = page.event_listener::<EventConsoleApiCalled>().await?;
        let mut exception_events = page.event_listener::<EventExceptionThrown>().await?;

        let capture = console.clone();
        let console_task = tokio::spawn(async move {
            while let Some(event) = console_events.next().await {
                capture.push(parse_console_event(&event));
            }
        });

        let capture = console.clone();
        let exception_task = tokio::spawn(async move {
            while let Some(event) = exception_events.next().await {
                capture.push(parse_exception_event(&event));
            }
        });

        Ok(Self {
            inner: page,
            console,
            slow_mo,
            context,
            listeners: vec![console_task, exception_task],
        })
    }

    /// Captured console messages and page errors.
    #[must_use]
    pub fn console(&self) -> &ConsoleCapture {
        &self.console
    }

    /// The isolated browser context this page lives in, if any.
    pub(crate) fn context_id(&self) -> Option<&BrowserContextId> {
        self.context.as_ref()
    }

    /// Navigates to an absolute URL and waits for the document to load.
    ///
    /// # Errors
    ///
    /// Returns `NavigationFailed` if the page fails to load.
    pub async fn navigate(&self, url: &str) -> Result<()> {
        self.pace().await;
        debug!("navigating to {}", url);

        self.inner
            .goto(url)
            .await
            .map_err(|e| BrowserError::NavigationFailed {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        self.wait_for_load(WaitConfig::default()).await
    }

    /// Waits until `document.readyState` is no longer `loading`.
    ///
    /// # Errors
    ///
    /// Returns `WaitTimeout` if the document never becomes interactive.
    pub async fn wait_for_load(&self, config: WaitConfig) -> Result<()> {
        wait_for_result(
            || async move {
                let state: String = self.evaluate("document.readyState").await?;
                Ok(state != "loading")
            },
            config,
            "document ready",
        )
        .await
    }

    /// Executes JavaScript in the page context and deserializes the result.
    ///
    /// Do not interpolate unescaped input into `script`; locators and values
    /// pass through JSON encoding before they reach a script.
    ///
    /// # Errors
    ///
    /// Returns an error if script execution or deserialization fails.
    pub async fn evaluate<T>(&self, script: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        trace!("evaluate: {}", script);
        let result = self
            .inner
            .evaluate(script)
            .await
            .map_err(|e| BrowserError::ScriptExecutionFailed(e.to_string()))?;

        result
            .into_value()
            .map_err(|e| BrowserError::ScriptExecutionFailed(e.to_string()))
    }

    /// Stops console capture and closes the tab.
    ///
    /// # Errors
    ///
    /// Returns an error if the browser refuses to close the target.
    pub async fn close(mut self) -> Result<()> {
        self.stop_listeners();
        self.inner.clone().close().await?;
        Ok(())
    }

    async fn pace(&self) {
        if !self.slow_mo.is_zero() {
            tokio::time::sleep(self.slow_mo).await;
        }
    }

    fn stop_listeners(&mut self) {
        for task in self.listeners.drain(..) {
            task.abort();
        }
    }

    /// Runs `body` with `els` bound to the locator's matches.
    async fn with_matches<T>(&self, locator: &Locator, body: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let script = format!("(() => {{ const els = {}; {body} }})()", locator.to_js());
        self.evaluate(&script).await
    }

    /// Runs an action script that returns `false` when nothing matched.
    async fn act(&self, locator: &Locator, body: &str) -> Result<()> {
        self.pace().await;
        let found: bool = self.with_matches(locator, body).await?;
        if found {
            Ok(())
        } else {
            Err(BrowserError::ElementNotFound(locator.to_string()))
        }
    }
}

impl Drop for Page {
    fn drop(&mut self) {
        self.stop_listeners();
    }
}

const VISIBLE_JS: &str = r"
    const el = els[0];
    if (!el || !el.isConnected) return false;
    const style = window.getComputedStyle(el);
    if (style.display === 'none' || style.visibility === 'hidden') return false;
    return !!(el.offsetWidth || el.offsetHeight || el.getClientRects().length);
";

#[async_trait]
impl Driver for Page {
    async fn goto(&self, url: &str) -> Result<()> {
        self.navigate(url).await
    }

    async fn reload(&self) -> Result<()> {
        self.pace().await;
        self.inner.reload().await?;
        self.wait_for_load(WaitConfig::default()).await
    }

    async fn current_url(&self) -> Result<String> {
        self.evaluate("window.location.href").await
    }

    async fn count(&self, locator: &Locator) -> Result<usize> {
        self.with_matches(locator, "return els.length;").await
    }

    async fn is_visible(&self, locator: &Locator) -> Result<bool> {
        self.with_matches(locator, VISIBLE_JS).await
    }

    async fn text_content(&self, locator: &Locator) -> Result<Option<String>> {
        self.with_matches(
            locator,
            "return els.length ? (els[0].textContent || '') : null;",
        )
        .await
    }

    async fn all_text_contents(&self, locator: &Locator) -> Result<Vec<String>> {
        self.with_matches(locator, "return els.map((el) => el.textContent || '');")
            .await
    }

    async fn fill(&self, locator: &Locator, value: &str) -> Result<()> {
        let body = format!(
            "const el = els[0];
             if (!el) return false;
             el.focus();
             el.value = {};
             el.dispatchEvent(new Event('input', {{ bubbles: true }}));
             el.dispatchEvent(new Event('change', {{ bubbles: true }}));
             return true;",
            js_string(value)
        );
        self.act(locator, &body).await
    }

    async fn click(&self, locator: &Locator) -> Result<()> {
        self.act(
            locator,
            "const el = els[0];
             if (!el) return false;
             el.scrollIntoView({ block: 'center' });
             el.click();
             return true;",
        )
        .await
    }

    async fn check(&self, locator: &Locator) -> Result<()> {
        self.act(
            locator,
            "const el = els[0];
             if (!el) return false;
             if (!el.checked) el.click();
             if (!el.checked) {
                 el.checked = true;
                 el.dispatchEvent(new Event('change', { bubbles: true }));
             }
             return true;",
        )
        .await
    }

    async fn options(&self, locator: &Locator) -> Result<Vec<SelectOption>> {
        let raw: Option<Vec<(String, String)>> = self
            .with_matches(
                locator,
                "const el = els[0];
                 if (!el || !el.options) return null;
                 return Array.from(el.options).map((o) => [o.value || '', o.textContent || '']);",
            )
            .await?;

        let raw = raw.ok_or_else(|| BrowserError::ElementNotFound(locator.to_string()))?;
        Ok(raw
            .into_iter()
            .map(|(value, label)| SelectOption { value, label })
            .collect())
    }

    async fn select_option(&self, locator: &Locator, value: &str) -> Result<()> {
        let body = format!(
            "const el = els[0];
             const value = {};
             if (!el || !el.options) return false;
             if (!Array.from(el.options).some((o) => o.value === value)) return false;
             el.value = value;
             el.dispatchEvent(new Event('input', {{ bubbles: true }}));
             el.dispatchEvent(new Event('change', {{ bubbles: true }}));
             return true;",
            js_string(value)
        );
        self.act(locator, &body).await
    }

    async fn diagnostics(&self) -> String {
        let script = format!(
            "(() => {{
                const text = (sel) => {{
                    const el = document.querySelector(sel);
                    return el ? (el.textContent || '').trim() : '';
                }};
                const body = document.body ? (document.body.innerText || '') : '';
                return JSON.stringify({{
                    url: window.location.href,
                    authError: text('#auth-error'),
                    status: text('#status'),
                    body: body.replace(/\\s+/g, ' ').slice(0, {SNAPSHOT_BODY_CHARS}),
                }});
            }})()"
        );

        let mut snapshot = match self.evaluate::<String>(&script).await {
            Ok(json) => json,
            Err(err) => format!("<snapshot unavailable: {err}>"),
        };

        let console = self.console.tail(5);
        if !console.is_empty() {
            snapshot.push_str("; console: ");
            snapshot.push_str(&console.replace('\n', " | "));
        }
        snapshot
    }
}

//! Browser lifecycle management.
//!
//! One `TestBrowser` is shared by a whole run. Each journey or test gets its
//! own isolated browser context (cookies, storage) and page, released at
//! teardown through [`TestBrowser::release`] whatever the outcome.
//!
//! # Resource Safety
//!
//! `TestBrowser` relies on chromiumoxide's Drop to kill the Chrome process
//! if `close()` was never called, but explicit cleanup is preferred.

use crate::error::{BrowserError, Result};
use crate::page::Page;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::target::{
    CreateBrowserContextParams, CreateTargetParams,
};
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Slow-motion delay used for headed local runs.
pub const LOCAL_SLOW_MO: Duration = Duration::from_millis(200);

/// Configuration for launching a test browser.
#[derive(Debug, Clone)]
pub struct TestBrowserConfig {
    /// Run in headless mode (default: true).
    pub headless: bool,

    /// Browser window size (default: 1920x1080).
    pub window_size: (u32, u32),

    /// Additional Chrome arguments.
    pub args: Vec<String>,

    /// Chrome executable path (None = auto-detect).
    pub chrome_path: Option<String>,

    /// Delay inserted before every page action (default: none).
    pub slow_mo: Duration,
}

impl TestBrowserConfig {
    /// Creates a new config with defaults for headless testing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// CI runs headless at full speed; local runs (and any run built with
    /// the `visible` feature) are headed and slowed down.
    #[must_use]
    pub fn for_environment(is_ci: bool) -> Self {
        let config = Self::default();
        if is_ci && !cfg!(feature = "visible") {
            config
        } else {
            config.visible().with_slow_mo(LOCAL_SLOW_MO)
        }
    }

    /// Enables visible mode for debugging.
    #[must_use]
    pub fn visible(mut self) -> Self {
        self.headless = false;
        self
    }

    /// Sets a custom window size.
    #[must_use]
    pub fn with_window_size(mut self, width: u32, height: u32) -> Self {
        self.window_size = (width, height);
        self
    }

    /// Sets the delay inserted before every page action.
    #[must_use]
    pub fn with_slow_mo(mut self, delay: Duration) -> Self {
        self.slow_mo = delay;
        self
    }

    /// Uses a specific Chrome executable.
    #[must_use]
    pub fn with_chrome_path(mut self, path: impl Into<String>) -> Self {
        self.chrome_path = Some(path.into());
        self
    }

    /// Adds additional Chrome arguments.
    #[must_use]
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args.extend(args);
        self
    }

    /// Converts to chromiumoxide `BrowserConfig`.
    fn to_browser_config(&self) -> Result<BrowserConfig> {
        let mut config = BrowserConfig::builder();

        // chromiumoxide defaults to headless; with_head() turns the window on.
        if !self.headless {
            config = config.with_head();
        }

        config = config.window_size(self.window_size.0, self.window_size.1);

        // A unique profile directory avoids ProcessSingleton conflicts
        // between browsers launched by parallel test binaries.
        let user_data_dir =
            std::env::temp_dir().join(format!("famboard-browser-{}", uuid::Uuid::new_v4()));
        config = config.user_data_dir(user_data_dir);

        for arg in &self.args {
            config = config.arg(arg.clone());
        }

        if let Some(path) = &self.chrome_path {
            config = config.chrome_executable(path.clone());
        }

        config.build().map_err(|e| BrowserError::LaunchFailed {
            reason: format!("invalid browser configuration: {e}"),
            source: None,
        })
    }
}

impl Default for TestBrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            window_size: (1920, 1080),
            args: vec![
                // Only for isolated test environments (CI/Docker) where user
                // namespaces are unavailable. Never browse untrusted content.
                "--no-sandbox".to_string(),
                // Prevents /dev/shm exhaustion in containers
                "--disable-dev-shm-usage".to_string(),
            ],
            chrome_path: None,
            slow_mo: Duration::ZERO,
        }
    }
}

/// A managed browser instance.
///
/// ```ignore
/// let browser = TestBrowser::launch(TestBrowserConfig::default()).await?;
/// let page = browser.new_isolated_page().await?;
/// page.navigate("https://example.com").await?;
/// browser.release(page).await?;
/// browser.close().await?;
/// ```
pub struct TestBrowser {
    inner: Arc<Mutex<Option<Browser>>>,
    slow_mo: Duration,
}

impl TestBrowser {
    /// Launches a new browser instance.
    ///
    /// # Errors
    ///
    /// Returns `LaunchFailed` if Chrome is not installed, not executable,
    /// or fails to start.
    pub async fn launch(config: TestBrowserConfig) -> Result<Self> {
        debug!("Launching browser with config: {:?}", config);

        let browser_config = config.to_browser_config()?;

        let (browser, mut handler) =
            Browser::launch(browser_config)
                .await
                .map_err(|e| BrowserError::LaunchFailed {
                    reason: "failed to launch Chrome process".to_string(),
                    source: Some(Box::new(e)),
                })?;

        // chromiumoxide only processes CDP events while the handler is polled.
        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    warn!("Browser handler error: {}", e);
                }
            }
        });

        info!(headless = config.headless, slow_mo = ?config.slow_mo, "browser launched");

        Ok(Self {
            inner: Arc::new(Mutex::new(Some(browser))),
            slow_mo: config.slow_mo,
        })
    }

    /// Opens a page in a fresh, isolated browser context.
    ///
    /// Nothing (cookies, local storage) leaks between isolated pages.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyClosed` if the browser has been closed, or a CDP
    /// error if the context cannot be created.
    pub async fn new_isolated_page(&self) -> Result<Page> {
        let mut guard = self.inner.lock().await;
        let browser = guard.as_mut().ok_or(BrowserError::AlreadyClosed)?;

        let context = browser
            .create_browser_context(CreateBrowserContextParams::default())
            .await?;

        let mut params = CreateTargetParams::new("about:blank");
        params.browser_context_id = Some(context.clone());

        let chrome_page = browser
            .new_page(params)
            .await
            .map_err(|e| BrowserError::ConnectionFailed(e.to_string()))?;

        debug!(context = ?context, "isolated page created");
        Page::attach(chrome_page, self.slow_mo, Some(context)).await
    }

    /// Closes a page and disposes of its isolated context.
    ///
    /// Both steps are attempted even if the first fails; the first error is
    /// returned.
    ///
    /// # Errors
    ///
    /// Returns the first error raised while closing or disposing.
    pub async fn release(&self, page: Page) -> Result<()> {
        let context = page.context_id().cloned();
        let closed = page.close().await;

        let disposed = match context {
            Some(id) => {
                let guard = self.inner.lock().await;
                match guard.as_ref() {
                    Some(browser) => browser
                        .dispose_browser_context(id)
                        .await
                        .map_err(BrowserError::from),
                    None => Ok(()),
                }
            }
            None => Ok(()),
        };

        closed.and(disposed)
    }

    /// Closes the browser and kills the Chrome process.
    ///
    /// # Errors
    ///
    /// Returns an error if the browser fails to close gracefully.
    pub async fn close(self) -> Result<()> {
        let mut browser_guard = self.inner.lock().await;

        if let Some(mut browser) = browser_guard.take() {
            debug!("Closing browser gracefully");
            browser
                .close()
                .await
                .map_err(|e| BrowserError::ConnectionFailed(e.to_string()))?;
        }

        Ok(())
    }

    /// Returns true if the browser has been closed.
    pub async fn is_closed(&self) -> bool {
        self.inner.lock().await.is_none()
    }
}

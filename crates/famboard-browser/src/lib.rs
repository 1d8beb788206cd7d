//! # famboard-browser
//!
//! Browser primitives for the famboard end-to-end suite, built on
//! chromiumoxide.
//!
//! ## Architecture
//!
//! - **TestBrowser**: one Chrome process per run, one isolated context per journey
//! - **Page**: a tab with console capture and slow-motion pacing
//! - **Locator**: CSS selector + text filter + nested selector, first match wins
//! - **Driver**: the capability surface page objects are written against
//! - **wait**: hard waits (error on timeout, with UI snapshot) and soft
//!   waits (boolean), plus a bounded `RetryPolicy`
//! - **AppServer**: where the application under test lives
//!
//! ## Example Usage
//!
//! ```ignore
//! use famboard_browser::{Driver, Locator, TestBrowser, TestBrowserConfig, WaitConfig};
//! use famboard_browser::wait::wait_until;
//!
//! let browser = TestBrowser::launch(TestBrowserConfig::default()).await?;
//! let page = browser.new_isolated_page().await?;
//! page.goto("http://localhost:5500/index.html").await?;
//!
//! let tasks = Locator::css("#tasks-section");
//! wait_until(&page, || page.is_visible(&tasks), WaitConfig::default(), "tasks visible").await?;
//!
//! browser.release(page).await?;
//! browser.close().await?;
//! ```
//!
//! Browser tests require Chrome and are `#[ignore]`d; run them with
//! `cargo test -- --ignored`.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod browser;
pub mod console;
pub mod driver;
pub mod error;
pub mod locator;
pub mod page;
pub mod server;
pub mod wait;

// Re-export main types for convenience
pub use browser::{TestBrowser, TestBrowserConfig, LOCAL_SLOW_MO};
pub use console::{ConsoleCapture, ConsoleLevel, ConsoleMessage};
pub use driver::{Driver, SelectOption};
pub use error::{BrowserError, Result};
pub use locator::Locator;
pub use page::Page;
pub use server::{AppServer, StaticUrlServer};
pub use wait::{RetryPolicy, WaitConfig, DEFAULT_POLL_INTERVAL, DEFAULT_TIMEOUT};

//! The capability surface page objects are written against.
//!
//! `Driver` is deliberately small: element lookup by [`Locator`], a
//! single-snapshot visibility/text query, form input, clicks, navigation and
//! a diagnostic text dump. [`Page`](crate::Page) implements it over
//! chromiumoxide; tests can implement it over an in-memory model.
//!
//! Every query here is a single snapshot of the rendered page. Polling is
//! layered on top by [`wait`](crate::wait).

use crate::error::Result;
use crate::locator::Locator;
use async_trait::async_trait;

/// One `<option>` of a `<select>` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    /// The option's `value` attribute (empty when absent).
    pub value: String,
    /// The option's rendered text.
    pub label: String,
}

/// Browser capabilities required by the page objects.
#[async_trait]
pub trait Driver: Send + Sync {
    /// Navigates to an absolute URL and waits for the document to load.
    async fn goto(&self, url: &str) -> Result<()>;

    /// Reloads the current document and waits for it to load.
    async fn reload(&self) -> Result<()>;

    /// Returns the current URL.
    async fn current_url(&self) -> Result<String>;

    /// Number of elements the locator currently matches.
    async fn count(&self, locator: &Locator) -> Result<usize>;

    /// Whether the first match exists and is rendered visible.
    async fn is_visible(&self, locator: &Locator) -> Result<bool>;

    /// Text content of the first match, `None` when nothing matches.
    async fn text_content(&self, locator: &Locator) -> Result<Option<String>>;

    /// Text content of every match, in document order.
    async fn all_text_contents(&self, locator: &Locator) -> Result<Vec<String>>;

    /// Replaces the value of the first matching form field.
    async fn fill(&self, locator: &Locator, value: &str) -> Result<()>;

    /// Clicks the first match.
    async fn click(&self, locator: &Locator) -> Result<()>;

    /// Checks the first matching checkbox, even when it is not visible.
    async fn check(&self, locator: &Locator) -> Result<()>;

    /// Lists the options of the first matching `<select>`.
    async fn options(&self, locator: &Locator) -> Result<Vec<SelectOption>>;

    /// Selects the option with `value` in the first matching `<select>`.
    async fn select_option(&self, locator: &Locator, value: &str) -> Result<()>;

    /// A short text dump of the current UI for failure messages.
    ///
    /// Never fails: a driver that cannot capture anything returns a
    /// description of why.
    async fn diagnostics(&self) -> String;

    /// Returns true if the locator matches at least one element.
    async fn exists(&self, locator: &Locator) -> Result<bool> {
        Ok(self.count(locator).await? > 0)
    }

    /// Returns true if the first match is absent or not visible.
    async fn is_hidden(&self, locator: &Locator) -> Result<bool> {
        Ok(!self.is_visible(locator).await?)
    }
}

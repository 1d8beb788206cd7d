//! Element locators.
//!
//! A `Locator` names one logical element: a CSS selector, optionally narrowed
//! to the elements whose text contains a substring, optionally descending into
//! a child selector of that match. Resolution always takes the first match,
//! the same way the page objects reason about "the" task card or "the" logout
//! button.
//!
//! Locators are plain data. Drivers decide how to resolve them; the Chrome
//! driver turns them into a JavaScript expression via [`Locator::to_js`].

use std::fmt;

/// A resolvable reference to an element in the rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locator {
    css: String,
    has_text: Option<String>,
    inner: Option<String>,
}

impl Locator {
    /// Creates a locator for the first element matching `css`.
    pub fn css(css: impl Into<String>) -> Self {
        Self {
            css: css.into(),
            has_text: None,
            inner: None,
        }
    }

    /// Narrows the locator to elements whose text content contains `text`.
    #[must_use]
    pub fn has_text(mut self, text: impl Into<String>) -> Self {
        self.has_text = Some(text.into());
        self
    }

    /// Descends into the first element matching `css` inside the current match.
    #[must_use]
    pub fn inner(mut self, css: impl Into<String>) -> Self {
        self.inner = Some(css.into());
        self
    }

    /// The base CSS selector.
    #[must_use]
    pub fn selector(&self) -> &str {
        &self.css
    }

    /// The text filter, if any.
    #[must_use]
    pub fn text_filter(&self) -> Option<&str> {
        self.has_text.as_deref()
    }

    /// The nested child selector, if any.
    #[must_use]
    pub fn inner_selector(&self) -> Option<&str> {
        self.inner.as_deref()
    }

    /// Builds a JavaScript expression evaluating to the array of matched
    /// elements, in document order.
    ///
    /// All user-provided strings are JSON encoded, so selectors and text
    /// filters cannot break out of their string literals.
    #[must_use]
    pub fn to_js(&self) -> String {
        let css = js_string(&self.css);
        let mut expr = format!("Array.from(document.querySelectorAll({css}))");

        if let Some(text) = &self.has_text {
            let text = js_string(text);
            expr = format!("{expr}.filter((el) => (el.textContent || '').includes({text}))");
        }

        if let Some(inner) = &self.inner {
            let inner = js_string(inner);
            expr = format!(
                "{expr}.map((el) => el.querySelector({inner})).filter((el) => el !== null)"
            );
        }

        expr
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.css)?;
        if let Some(text) = &self.has_text {
            write!(f, " (has text '{text}')")?;
        }
        if let Some(inner) = &self.inner {
            write!(f, " >> {inner}")?;
        }
        Ok(())
    }
}

impl From<&str> for Locator {
    fn from(css: &str) -> Self {
        Locator::css(css)
    }
}

/// Encodes a Rust string as a JavaScript string literal.
pub(crate) fn js_string(value: &str) -> String {
    // A &str always serializes; the fallback keeps this infallible.
    serde_json::to_string(value).unwrap_or_else(|_| "\"\"".to_string())
}

//! The application under test, as seen by the browser.
//!
//! `AppServer` only knows where the application lives. The suite never
//! starts the application itself; it points at an already running instance
//! (a local static server during development, a hosted copy in CI).

use std::fmt;

/// A running application the browser can navigate to.
pub trait AppServer: Send + Sync {
    /// Entry URL of the application, e.g. `http://localhost:5500/index.html`.
    fn base_url(&self) -> &str;

    /// Builds a client-side route: the entry URL with `#route` appended,
    /// replacing any fragment already present.
    fn route(&self, route: &str) -> String {
        let base = self.base_url();
        let base = base.split_once('#').map_or(base, |(head, _)| head);
        format!("{base}#{}", route.trim_start_matches('#'))
    }
}

impl fmt::Debug for dyn AppServer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppServer")
            .field("base_url", &self.base_url())
            .finish()
    }
}

/// An application already running at a fixed URL.
#[derive(Debug, Clone)]
pub struct StaticUrlServer {
    base_url: String,
}

impl StaticUrlServer {
    /// Creates a server handle for `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl AppServer for StaticUrlServer {
    fn base_url(&self) -> &str {
        &self.base_url
    }
}

//! Error type for page objects, sessions and the journey.
//!
//! Lower-level errors convert automatically via `#[from]`, so `?` works on
//! browser, config and API results alike. Assertion failures always carry a
//! snapshot of the UI taken at the moment they were raised.

use famboard_api::ApiError;
use famboard_browser::{BrowserError, Driver};
use famboard_config::ConfigError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, E2eError>;

#[derive(Debug, Error)]
pub enum E2eError {
    /// Browser automation failure, including hard-wait timeouts.
    #[error(transparent)]
    Browser(#[from] BrowserError),

    /// Missing credentials or invalid settings.
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Api(#[from] ApiError),

    /// An expectation about the rendered UI did not hold.
    #[error("{message}. UI details: {diagnostics}")]
    Assertion {
        message: String,
        diagnostics: String,
    },

    /// The UI is in a state the page object cannot resolve unambiguously.
    #[error("ambiguous UI state: {0}")]
    AmbiguousState(String),

    /// A retried operation ran out of attempts.
    #[error("{operation} did not succeed after {attempts} attempt(s). Last UI details: {diagnostics}")]
    RetryExhausted {
        operation: String,
        attempts: u32,
        diagnostics: String,
    },
}

impl E2eError {
    pub fn assertion(message: impl Into<String>, diagnostics: impl Into<String>) -> Self {
        E2eError::Assertion {
            message: message.into(),
            diagnostics: diagnostics.into(),
        }
    }

    /// True for hard-wait timeouts raised by the browser layer.
    pub fn is_timeout(&self) -> bool {
        matches!(self, E2eError::Browser(err) if err.is_timeout())
    }
}

/// Fails with an [`E2eError::Assertion`] carrying the driver's snapshot
/// unless `condition` holds.
pub async fn ensure<D>(driver: &D, condition: bool, message: &str) -> Result<()>
where
    D: Driver + ?Sized,
{
    if condition {
        Ok(())
    } else {
        Err(E2eError::assertion(message, driver.diagnostics().await))
    }
}

//! Error types for browser operations.
//!
//! Distinguishes launch failures, navigation errors, script failures,
//! missing elements and wait timeouts. Wait timeouts carry a diagnostic
//! snapshot of the rendered UI when one could be captured, so a failing
//! run can be diagnosed from its output alone.

use std::time::Duration;
use thiserror::Error;

/// The main error type for all browser operations.
#[derive(Debug, Error)]
pub enum BrowserError {
    /// Failed to launch the browser process.
    ///
    /// This typically occurs when Chrome/Chromium is not installed,
    /// or when there are permission issues with the executable.
    #[error("failed to launch browser: {reason}")]
    LaunchFailed {
        /// Human-readable reason for the launch failure
        reason: String,
        /// Optional underlying error that caused the failure
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Failed to talk to the browser over CDP.
    #[error("CDP connection failed: {0}")]
    ConnectionFailed(String),

    /// Navigation to a URL failed or timed out.
    #[error("navigation to '{url}' failed: {reason}")]
    NavigationFailed {
        /// The URL that failed to load
        url: String,
        /// Reason for the navigation failure
        reason: String,
    },

    /// A hard wait was not satisfied within its timeout.
    ///
    /// `snapshot` holds the UI text captured at the moment of the timeout.
    #[error("wait condition '{condition}' timed out after {timeout:?}{}", snapshot_suffix(.snapshot))]
    WaitTimeout {
        /// Description of the condition that timed out
        condition: String,
        /// How long we waited before timing out
        timeout: Duration,
        /// Diagnostic UI snapshot, if one was captured
        snapshot: Option<String>,
    },

    /// An action targeted an element that is not in the DOM.
    #[error("element not found: {0}")]
    ElementNotFound(String),

    /// JavaScript execution in the page context failed.
    #[error("JavaScript execution failed: {0}")]
    ScriptExecutionFailed(String),

    /// An operation was attempted on a closed browser instance.
    #[error("browser instance is already closed")]
    AlreadyClosed,

    /// Wraps errors from the chromiumoxide library.
    #[error("chromiumoxide error: {0}")]
    ChromiumOxide(#[from] chromiumoxide::error::CdpError),
}

fn snapshot_suffix(snapshot: &Option<String>) -> String {
    match snapshot {
        Some(text) if !text.is_empty() => format!("; UI snapshot: {text}"),
        _ => String::new(),
    }
}

impl BrowserError {
    /// Returns true if this error is a wait timeout.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, BrowserError::WaitTimeout { .. })
    }

    /// Attaches a diagnostic snapshot to a wait timeout that has none yet.
    ///
    /// Other variants are returned unchanged.
    #[must_use]
    pub fn with_snapshot(self, text: String) -> Self {
        match self {
            BrowserError::WaitTimeout {
                condition,
                timeout,
                snapshot: None,
            } => BrowserError::WaitTimeout {
                condition,
                timeout,
                snapshot: Some(text),
            },
            other => other,
        }
    }
}

/// A specialized Result type for browser operations.
pub type Result<T> = std::result::Result<T, BrowserError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_message_includes_snapshot() {
        let err = BrowserError::WaitTimeout {
            condition: "task card 'T1' in #tasks-list".into(),
            timeout: Duration::from_secs(2),
            snapshot: None,
        }
        .with_snapshot("status: Saving...".into());

        let message = err.to_string();
        assert!(message.contains("timed out after 2s"));
        assert!(message.ends_with("UI snapshot: status: Saving..."));
    }

    #[test]
    fn with_snapshot_keeps_first_snapshot() {
        let err = BrowserError::WaitTimeout {
            condition: "x".into(),
            timeout: Duration::from_millis(10),
            snapshot: Some("first".into()),
        }
        .with_snapshot("second".into());

        assert!(matches!(
            err,
            BrowserError::WaitTimeout { snapshot: Some(ref s), .. } if s == "first"
        ));
    }

    #[test]
    fn with_snapshot_ignores_other_variants() {
        let err = BrowserError::ElementNotFound("#missing".into()).with_snapshot("ui".into());
        assert!(!err.is_timeout());
        assert_eq!(err.to_string(), "element not found: #missing");
    }
}

//! Browser console and page error capture.
//!
//! Every page records what the application logs (`console.*`) and every
//! uncaught exception it throws. Messages are kept in arrival order for
//! assertions and forwarded to `tracing` at debug level, so a failing run
//! shows what the application was complaining about.

use chromiumoxide::cdp::js_protocol::runtime::{
    ConsoleApiCalledType, EventConsoleApiCalled, EventExceptionThrown, RemoteObject,
};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::SystemTime;
use tracing::debug;

/// The severity of a captured message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConsoleLevel {
    /// `console.log()`
    Log,
    /// `console.info()`
    Info,
    /// `console.warn()`
    Warning,
    /// `console.error()`
    Error,
    /// `console.debug()`
    Debug,
    /// An uncaught exception in page scripts.
    PageError,
    /// Catch-all for other console APIs
    Other,
}

impl ConsoleLevel {
    /// Returns true for `console.error()` and uncaught exceptions.
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, ConsoleLevel::Error | ConsoleLevel::PageError)
    }
}

impl From<&ConsoleApiCalledType> for ConsoleLevel {
    fn from(kind: &ConsoleApiCalledType) -> Self {
        match kind {
            ConsoleApiCalledType::Log => ConsoleLevel::Log,
            ConsoleApiCalledType::Info => ConsoleLevel::Info,
            ConsoleApiCalledType::Warning => ConsoleLevel::Warning,
            ConsoleApiCalledType::Error => ConsoleLevel::Error,
            ConsoleApiCalledType::Debug => ConsoleLevel::Debug,
            _ => ConsoleLevel::Other,
        }
    }
}

/// A captured console message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsoleMessage {
    /// Severity level.
    pub level: ConsoleLevel,

    /// Message text; multiple console arguments are joined with spaces.
    pub text: String,

    /// When the message was captured (system time, not page time).
    pub timestamp: SystemTime,

    /// Source location if available (e.g., "app.js:42:10").
    pub source: Option<String>,
}

impl ConsoleMessage {
    /// Creates a new message stamped with the current time.
    #[must_use]
    pub fn new(level: ConsoleLevel, text: String) -> Self {
        Self {
            level,
            text,
            timestamp: SystemTime::now(),
            source: None,
        }
    }

    /// Attaches a source location.
    #[must_use]
    pub fn with_source(mut self, source: String) -> Self {
        self.source = Some(source);
        self
    }
}

/// Cheaply cloneable, thread-safe message buffer.
#[derive(Debug, Clone, Default)]
pub struct ConsoleCapture {
    messages: Arc<Mutex<Vec<ConsoleMessage>>>,
}

impl ConsoleCapture {
    /// Creates an empty capture.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a message and forwards it to the log.
    pub(crate) fn push(&self, message: ConsoleMessage) {
        debug!(level = ?message.level, source = ?message.source, "browser: {}", message.text);
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message);
    }

    /// Snapshot of all captured messages.
    #[must_use]
    pub fn messages(&self) -> Vec<ConsoleMessage> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Error-level messages and page errors.
    #[must_use]
    pub fn errors(&self) -> Vec<ConsoleMessage> {
        self.messages()
            .into_iter()
            .filter(|m| m.level.is_error())
            .collect()
    }

    /// Number of error-level messages and page errors.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|m| m.level.is_error())
            .count()
    }

    /// The last `n` messages formatted one per line, oldest first.
    #[must_use]
    pub fn tail(&self, n: usize) -> String {
        let messages = self.messages.lock().unwrap_or_else(PoisonError::into_inner);
        let skip = messages.len().saturating_sub(n);
        messages
            .iter()
            .skip(skip)
            .map(|m| format!("[{:?}] {}", m.level, m.text))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Clears all captured messages.
    pub fn clear(&self) {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Total number of captured messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns true if nothing has been captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn render_remote_object(arg: &RemoteObject) -> String {
    match &arg.value {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => arg
            .description
            .clone()
            .unwrap_or_else(|| "<object>".to_string()),
    }
}

/// Converts a CDP console event into a message.
pub(crate) fn parse_console_event(event: &EventConsoleApiCalled) -> ConsoleMessage {
    let text = event
        .args
        .iter()
        .map(render_remote_object)
        .collect::<Vec<_>>()
        .join(" ");

    let mut message = ConsoleMessage::new(ConsoleLevel::from(&event.r#type), text);

    if let Some(frame) = event
        .stack_trace
        .as_ref()
        .and_then(|trace| trace.call_frames.first())
    {
        message = message.with_source(format!(
            "{}:{}:{}",
            frame.url, frame.line_number, frame.column_number
        ));
    }

    message
}

/// Converts a CDP uncaught exception event into a page error message.
pub(crate) fn parse_exception_event(event: &EventExceptionThrown) -> ConsoleMessage {
    let details = &event.exception_details;
    let text = details
        .exception
        .as_ref()
        .and_then(|e| e.description.clone())
        .unwrap_or_else(|| details.text.clone());

    let mut message = ConsoleMessage::new(ConsoleLevel::PageError, text);
    if let Some(url) = &details.url {
        message = message.with_source(format!(
            "{}:{}:{}",
            url, details.line_number, details.column_number
        ));
    }
    message
}

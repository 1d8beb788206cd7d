//! Per-run test data.
//!
//! Everything a run creates in the application is suffixed with a fresh
//! 8-hex-char token, so runs never collide with each other's data.

use famboard_config::Credentials;
use uuid::Uuid;

/// A fresh 8-hex-char run token.
pub fn run_token() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

/// Unique name, email and title built from a prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestData {
    pub name: String,
    pub email: String,
    pub title: String,
}

impl TestData {
    /// Builds data with a fresh token.
    pub fn new(prefix: &str) -> Self {
        Self::with_token(prefix, &run_token())
    }

    pub fn with_token(prefix: &str, token: &str) -> Self {
        Self {
            name: format!("{prefix}_{token}"),
            email: format!("{prefix}_{token}@example.com"),
            title: format!("{prefix}_task_{token}"),
        }
    }
}

impl Default for TestData {
    fn default() -> Self {
        Self::new("qa")
    }
}

/// Everything the family journey creates, derived from one run token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JourneyArtifacts {
    pub token: String,
    pub child: Credentials,
    pub child_display_name: String,
    pub task_title: String,
    pub task_details: String,
    pub message_text: String,
    pub reply_text: String,
    pub event_title: String,
}

impl JourneyArtifacts {
    pub fn generate() -> Self {
        Self::from_token(&run_token())
    }

    pub fn from_token(token: &str) -> Self {
        Self {
            token: token.to_string(),
            child: Credentials::generated_child(token),
            child_display_name: format!("Kid-{token}"),
            task_title: format!("Sanity Task {token}"),
            task_details: "Sanity E2E lifecycle task".to_string(),
            message_text: format!("Family sanity message {token}"),
            reply_text: format!("Child reply {token}"),
            event_title: format!("Sanity Event {token}"),
        }
    }

    /// Markers by which the child can be recognised in the UI.
    pub fn child_markers(&self) -> [&str; 2] {
        [self.child.email(), &self.child_display_name]
    }

    /// True if `text` mentions the child by email or display name.
    pub fn mentions_child(&self, text: &str) -> bool {
        self.child_markers().iter().any(|marker| text.contains(marker))
    }
}

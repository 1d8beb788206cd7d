//! Error types for settings and credential loading.
//!
//! Configuration errors are raised before any browser interaction, so a
//! missing setup is never mistaken for an application bug.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("UI user credentials are missing for profile '{profile}': set {email_var} and {password_var}")]
    MissingCredentials {
        profile: String,
        email_var: String,
        password_var: String,
    },

    #[error("unknown UI user profile: {0}")]
    UnknownProfile(String),

    #[error("invalid role '{value}' for profile '{profile}' (expected 'parent' or 'child')")]
    InvalidRole { profile: String, value: String },

    #[error("invalid settings: {0}")]
    InvalidSettings(String),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        ConfigError::InvalidSettings(err.to_string())
    }
}

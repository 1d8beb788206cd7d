//! Actor credentials and the named user profiles read from the environment.
//!
//! Three profiles exist: `default` (a parent account, with built-in
//! fallbacks) and `child_1` / `child_2` (empty unless configured).

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Fallback parent account used when no environment overrides it.
pub const DEFAULT_PARENT_EMAIL: &str = "ngjipiqmftuoxbkecx@nespj.com";
pub const DEFAULT_PARENT_PASSWORD: &str = "123456";

/// The capability class of an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Parent,
    Child,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Parent => "parent",
            Role::Child => "child",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "parent" => Ok(Role::Parent),
            "child" => Ok(Role::Child),
            other => Err(other.to_string()),
        }
    }
}

/// Login credentials of one actor. Immutable once built.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    email: String,
    password: String,
    role: Role,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>, role: Role) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            role,
        }
    }

    /// Child credentials derived from a per-run token, unique across runs.
    pub fn generated_child(token: &str) -> Self {
        Self::new(
            format!("sanity.child.{token}@example.com"),
            format!("KidPass{token}"),
            Role::Child,
        )
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// True when both email and password are non-empty.
    pub fn is_complete(&self) -> bool {
        !self.email.trim().is_empty() && !self.password.is_empty()
    }
}

// Passwords stay out of logs and assertion output.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"***")
            .field("role", &self.role)
            .finish()
    }
}

struct ProfileVars {
    name: &'static str,
    email: &'static str,
    password: &'static str,
    role: &'static str,
    email_fallback: Option<&'static str>,
    password_fallback: Option<&'static str>,
    default_email: &'static str,
    default_password: &'static str,
    default_role: Role,
}

const PROFILES: [ProfileVars; 3] = [
    ProfileVars {
        name: "default",
        email: "UI_USER_DEFAULT_EMAIL",
        password: "UI_USER_DEFAULT_PASSWORD",
        role: "UI_USER_DEFAULT_ROLE",
        email_fallback: Some("UI_TEST_EMAIL"),
        password_fallback: Some("UI_TEST_PASSWORD"),
        default_email: DEFAULT_PARENT_EMAIL,
        default_password: DEFAULT_PARENT_PASSWORD,
        default_role: Role::Parent,
    },
    ProfileVars {
        name: "child_1",
        email: "UI_USER_CHILD1_EMAIL",
        password: "UI_USER_CHILD1_PASSWORD",
        role: "UI_USER_CHILD1_ROLE",
        email_fallback: None,
        password_fallback: None,
        default_email: "",
        default_password: "",
        default_role: Role::Child,
    },
    ProfileVars {
        name: "child_2",
        email: "UI_USER_CHILD2_EMAIL",
        password: "UI_USER_CHILD2_PASSWORD",
        role: "UI_USER_CHILD2_ROLE",
        email_fallback: None,
        password_fallback: None,
        default_email: "",
        default_password: "",
        default_role: Role::Child,
    },
];

/// The configured user profiles, keyed by name.
#[derive(Debug, Clone)]
pub struct CredentialProfiles {
    profiles: BTreeMap<&'static str, Credentials>,
}

impl CredentialProfiles {
    /// Reads every profile from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads every profile through `lookup`. Unset and unset-fallback
    /// variables resolve to the profile's built-in default.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut profiles = BTreeMap::new();

        for vars in &PROFILES {
            let resolve = |primary: &str, fallback: Option<&str>, default: &str| {
                lookup(primary)
                    .or_else(|| fallback.and_then(&lookup))
                    .unwrap_or_else(|| default.to_string())
            };

            let email = resolve(vars.email, vars.email_fallback, vars.default_email);
            let password = resolve(vars.password, vars.password_fallback, vars.default_password);
            let role = match lookup(vars.role) {
                Some(raw) => raw.parse().map_err(|value| ConfigError::InvalidRole {
                    profile: vars.name.to_string(),
                    value,
                })?,
                None => vars.default_role,
            };

            profiles.insert(vars.name, Credentials::new(email, password, role));
        }

        Ok(Self { profiles })
    }

    /// The profile as configured, possibly with empty fields.
    pub fn get(&self, name: &str) -> Result<&Credentials> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProfile(name.to_string()))
    }

    /// The profile, failing when its email or password is empty.
    pub fn require(&self, name: &str) -> Result<&Credentials> {
        let credentials = self.get(name)?;
        if credentials.is_complete() {
            return Ok(credentials);
        }

        let vars = PROFILES
            .iter()
            .find(|vars| vars.name == name)
            .ok_or_else(|| ConfigError::UnknownProfile(name.to_string()))?;
        Err(ConfigError::MissingCredentials {
            profile: name.to_string(),
            email_var: vars.email.to_string(),
            password_var: vars.password.to_string(),
        })
    }

    /// The parent account used by the journey.
    pub fn parent(&self) -> Result<&Credentials> {
        self.require("default")
    }

    pub fn is_configured(&self, name: &str) -> bool {
        self.get(name).is_ok_and(Credentials::is_complete)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn default_profile_falls_back_to_builtin_parent() {
        let profiles = CredentialProfiles::from_lookup(lookup_from(&[])).unwrap();
        let parent = profiles.parent().unwrap();
        assert_eq!(parent.email(), DEFAULT_PARENT_EMAIL);
        assert_eq!(parent.password(), DEFAULT_PARENT_PASSWORD);
        assert_eq!(parent.role(), Role::Parent);
    }

    #[test]
    fn legacy_variables_are_used_when_primary_is_unset() {
        let profiles = CredentialProfiles::from_lookup(lookup_from(&[
            ("UI_TEST_EMAIL", "legacy@example.com"),
            ("UI_TEST_PASSWORD", "legacy"),
        ]))
        .unwrap();
        assert_eq!(profiles.parent().unwrap().email(), "legacy@example.com");

        let profiles = CredentialProfiles::from_lookup(lookup_from(&[
            ("UI_TEST_EMAIL", "legacy@example.com"),
            ("UI_USER_DEFAULT_EMAIL", "primary@example.com"),
        ]))
        .unwrap();
        assert_eq!(profiles.parent().unwrap().email(), "primary@example.com");
    }

    #[test]
    fn unconfigured_child_profile_is_a_configuration_error() {
        let profiles = CredentialProfiles::from_lookup(lookup_from(&[])).unwrap();
        assert!(!profiles.is_configured("child_1"));

        let err = profiles.require("child_1").unwrap_err();
        let message = err.to_string();
        assert!(matches!(err, ConfigError::MissingCredentials { .. }));
        assert!(message.contains("UI_USER_CHILD1_EMAIL"), "{message}");
    }

    #[test]
    fn child_profile_reads_role_and_credentials() {
        let profiles = CredentialProfiles::from_lookup(lookup_from(&[
            ("UI_USER_CHILD2_EMAIL", "kid2@example.com"),
            ("UI_USER_CHILD2_PASSWORD", "pw"),
            ("UI_USER_CHILD2_ROLE", " Child "),
        ]))
        .unwrap();
        let child = profiles.require("child_2").unwrap();
        assert_eq!(child.role(), Role::Child);
        assert!(profiles.is_configured("child_2"));
    }

    #[test]
    fn invalid_role_is_rejected() {
        let err = CredentialProfiles::from_lookup(lookup_from(&[("UI_USER_DEFAULT_ROLE", "admin")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRole { ref value, .. } if value == "admin"));
    }

    #[test]
    fn unknown_profile_is_rejected() {
        let profiles = CredentialProfiles::from_lookup(lookup_from(&[])).unwrap();
        assert!(matches!(
            profiles.get("grandparent"),
            Err(ConfigError::UnknownProfile(_))
        ));
        assert_eq!(
            profiles.names().collect::<Vec<_>>(),
            vec!["child_1", "child_2", "default"]
        );
    }

    #[test]
    fn generated_child_credentials_embed_token() {
        let child = Credentials::generated_child("1a2b3c4d");
        assert_eq!(child.email(), "sanity.child.1a2b3c4d@example.com");
        assert_eq!(child.password(), "KidPass1a2b3c4d");
        assert_eq!(child.role(), Role::Child);
    }

    #[test]
    fn debug_output_hides_password() {
        let creds = Credentials::new("p@example.com", "hunter2", Role::Parent);
        let rendered = format!("{creds:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("p@example.com"));
    }
}

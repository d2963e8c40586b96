//! Settings surface for the gate.
//!
//! Settings are plain data deserialized from TOML. Every field is optional;
//! [`PolicyConfig::from_settings`](crate::PolicyConfig::from_settings) turns
//! them into a validated, immutable policy.
//!
//! ```toml
//! enabled = true
//! always_allow_urls = ["^/static/", "^/healthz$"]
//! always_allow_modules = ["public.views"]
//! always_allow_views = ["accounts.views.password_reset"]
//! allow_admin = false
//! debug_disable_https = false
//! http_auth_realm = "Staging"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Raw gate settings as read from a TOML file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MoatSettings {
    /// Master switch. Absent means the gate is on.
    pub enabled: Option<bool>,
    /// Regular expressions; a path matching any of them skips the gate
    pub always_allow_urls: Vec<String>,
    /// Modules whose views skip the gate
    pub always_allow_modules: Vec<String>,
    /// Full `"{module}.{view}"` names of views that skip the gate
    pub always_allow_views: Vec<String>,
    /// Let admin-site views through
    pub allow_admin: bool,
    /// Do not redirect plain HTTP requests to HTTPS
    pub debug_disable_https: bool,
    /// Realm sent with the Basic challenge
    pub http_auth_realm: String,
    /// Deployment debug mode
    pub debug: bool,
    /// Module prefix of the admin site, when it differs from the default
    pub admin_namespace: Option<String>,
    /// Full name of the generic redirect view, when it differs from the default
    pub redirect_view: Option<String>,
}

impl MoatSettings {
    /// Loads settings from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parses settings from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] on invalid TOML, wrong value types or
    /// unknown keys.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }
}

use std::collections::HashSet;

use regex::Regex;

use crate::error::ConfigError;
use crate::route::RouteId;
use crate::settings::MoatSettings;

/// Full view name of the framework's generic redirect view.
///
/// Always allow-listed: redirecting never exposes protected content.
pub const DEFAULT_REDIRECT_VIEW: &str = "generic.views.redirect_to";

/// Module prefix identifying the framework's admin site.
pub const DEFAULT_ADMIN_NAMESPACE: &str = "contrib.admin";

/// Immutable gate policy, built once at process start.
///
/// A `PolicyConfig` is never mutated after [`PolicyConfigBuilder::build`]
/// and is shared by every request, typically behind an `Arc`.
///
/// # Examples
///
/// ```
/// use moat::PolicyConfig;
///
/// let config = PolicyConfig::builder()
///     .always_allow_url(r"^/static/")
///     .always_allow_module("public.views")
///     .auth_realm("Staging")
///     .build()
///     .expect("patterns compile");
///
/// assert!(config.is_enabled());
/// assert_eq!(config.matching_url_pattern("/static/app.css"), Some(r"^/static/"));
/// assert_eq!(config.auth_realm(), "Staging");
/// ```
#[derive(Debug, Clone)]
pub struct PolicyConfig {
    enabled: bool,
    always_allow_urls: Vec<Regex>,
    always_allow_modules: HashSet<String>,
    always_allow_views: HashSet<String>,
    allow_admin: bool,
    admin_namespace: String,
    debug_disable_https: bool,
    debug: bool,
    auth_realm: String,
}

impl PolicyConfig {
    /// Starts building a policy with the defaults: gating enabled, empty
    /// allow-lists, HTTPS enforced, empty realm.
    pub fn builder() -> PolicyConfigBuilder {
        PolicyConfigBuilder::new()
    }

    /// Builds a policy from deserialized settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPattern`] if an `always_allow_urls`
    /// entry does not compile.
    pub fn from_settings(settings: &MoatSettings) -> Result<Self, ConfigError> {
        let mut builder = PolicyConfig::builder()
            .enabled(settings.enabled.unwrap_or(true))
            .allow_admin(settings.allow_admin)
            .debug_disable_https(settings.debug_disable_https)
            .debug(settings.debug)
            .auth_realm(settings.http_auth_realm.clone());

        if let Some(namespace) = &settings.admin_namespace {
            builder = builder.admin_namespace(namespace.clone());
        }
        if let Some(view) = &settings.redirect_view {
            builder = builder.redirect_view(view.clone());
        }
        for pattern in &settings.always_allow_urls {
            builder = builder.always_allow_url(pattern.clone());
        }
        for module in &settings.always_allow_modules {
            builder = builder.always_allow_module(module.clone());
        }
        for view in &settings.always_allow_views {
            builder = builder.always_allow_view(view.clone());
        }

        builder.build()
    }

    /// Whether the gate is active at all.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether admin-site modules bypass the gate.
    pub fn allows_admin(&self) -> bool {
        self.allow_admin
    }

    /// Whether HTTPS redirects are switched off for local development.
    pub fn https_disabled(&self) -> bool {
        self.debug_disable_https
    }

    /// Whether the deployment runs in debug mode.
    pub fn is_debug(&self) -> bool {
        self.debug
    }

    /// Realm sent in the Basic challenge.
    pub fn auth_realm(&self) -> &str {
        &self.auth_realm
    }

    /// Returns the first always-allow pattern found anywhere in `path`.
    ///
    /// Patterns are tried in configuration order and are not anchored
    /// unless they anchor themselves.
    pub fn matching_url_pattern(&self, path: &str) -> Option<&str> {
        self.always_allow_urls
            .iter()
            .find(|re| re.is_match(path))
            .map(Regex::as_str)
    }

    /// Whether a resolved route is exempt from the gate.
    ///
    /// True when its full view name is allow-listed (the built-in redirect
    /// view always is), its module is allow-listed, or admin access is
    /// allowed and the module lives under the admin namespace.
    pub fn allows_route(&self, route: &RouteId) -> bool {
        self.always_allow_views.contains(&route.full_view_name())
            || self.always_allow_modules.contains(&route.module)
            || (self.allow_admin && route.module.starts_with(&self.admin_namespace))
    }
}

/// Builder for [`PolicyConfig`].
///
/// Allow-list adders deduplicate: adding the same entry twice keeps one.
#[derive(Debug, Clone)]
pub struct PolicyConfigBuilder {
    enabled: bool,
    always_allow_urls: Vec<String>,
    always_allow_modules: Vec<String>,
    always_allow_views: Vec<String>,
    redirect_view: String,
    allow_admin: bool,
    admin_namespace: String,
    debug_disable_https: bool,
    debug: bool,
    auth_realm: String,
}

impl Default for PolicyConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PolicyConfigBuilder {
    /// Creates a builder with default settings.
    pub fn new() -> Self {
        Self {
            enabled: true,
            always_allow_urls: Vec::new(),
            always_allow_modules: Vec::new(),
            always_allow_views: Vec::new(),
            redirect_view: DEFAULT_REDIRECT_VIEW.to_string(),
            allow_admin: false,
            admin_namespace: DEFAULT_ADMIN_NAMESPACE.to_string(),
            debug_disable_https: false,
            debug: false,
            auth_realm: String::new(),
        }
    }

    /// Turns the whole gate on or off.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Adds a regular expression; paths it matches skip the gate entirely.
    pub fn always_allow_url(mut self, pattern: impl Into<String>) -> Self {
        push_unique(&mut self.always_allow_urls, pattern.into());
        self
    }

    /// Allow-lists every view defined in `module`.
    pub fn always_allow_module(mut self, module: impl Into<String>) -> Self {
        push_unique(&mut self.always_allow_modules, module.into());
        self
    }

    /// Allow-lists one view by its full `"{module}.{view}"` name.
    pub fn always_allow_view(mut self, full_view_name: impl Into<String>) -> Self {
        push_unique(&mut self.always_allow_views, full_view_name.into());
        self
    }

    /// Overrides the full name of the built-in redirect view.
    pub fn redirect_view(mut self, full_view_name: impl Into<String>) -> Self {
        self.redirect_view = full_view_name.into();
        self
    }

    /// Lets admin-site views through without Basic credentials.
    pub fn allow_admin(mut self, allow: bool) -> Self {
        self.allow_admin = allow;
        self
    }

    /// Overrides the module prefix that identifies the admin site.
    pub fn admin_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.admin_namespace = namespace.into();
        self
    }

    /// Skips the HTTPS redirect, for local development without TLS.
    pub fn debug_disable_https(mut self, disable: bool) -> Self {
        self.debug_disable_https = disable;
        self
    }

    /// Marks the deployment as running in debug mode.
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Sets the realm sent with the Basic challenge.
    pub fn auth_realm(mut self, realm: impl Into<String>) -> Self {
        self.auth_realm = realm.into();
        self
    }

    /// Compiles the URL patterns and freezes the policy.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPattern`] for the first pattern that
    /// fails to compile.
    pub fn build(self) -> Result<PolicyConfig, ConfigError> {
        let always_allow_urls = self
            .always_allow_urls
            .into_iter()
            .map(|pattern| {
                Regex::new(&pattern)
                    .map_err(|source| ConfigError::InvalidPattern { pattern, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut always_allow_views: HashSet<String> =
            self.always_allow_views.into_iter().collect();
        always_allow_views.insert(self.redirect_view);

        Ok(PolicyConfig {
            enabled: self.enabled,
            always_allow_urls,
            always_allow_modules: self.always_allow_modules.into_iter().collect(),
            always_allow_views,
            allow_admin: self.allow_admin,
            admin_namespace: self.admin_namespace,
            debug_disable_https: self.debug_disable_https,
            debug: self.debug,
            auth_realm: self.auth_realm,
        })
    }
}

fn push_unique(entries: &mut Vec<String>, entry: String) {
    if !entries.contains(&entry) {
        entries.push(entry);
    }
}

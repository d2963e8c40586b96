use thiserror::Error;

use crate::request::HttpMethod;

/// Errors that can occur in the moat crate.
///
/// Only misconfiguration is an error. Failed or malformed credentials are
/// routine and always resolve to a [`Challenge`](crate::AdmissionOutcome::Challenge).
#[derive(Debug, Error)]
pub enum Error {
    /// The gate could not be configured
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// A request could not be admitted without losing data
    #[error(transparent)]
    Admission(#[from] AdmissionError),
}

/// Errors raised while loading settings or building a [`PolicyConfig`](crate::PolicyConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An entry of `always_allow_urls` is not a valid regular expression
    #[error("invalid always-allow URL pattern '{pattern}': {source}")]
    InvalidPattern {
        /// The offending pattern as written in the settings
        pattern: String,
        /// The underlying regex compilation error
        #[source]
        source: regex::Error,
    },
    /// The settings file could not be read
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),
    /// The settings file is not valid TOML for [`MoatSettings`](crate::MoatSettings)
    #[error("failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Fatal errors raised while deciding on a single request.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AdmissionError {
    /// An HTTPS redirect was required for a request whose body would be
    /// dropped by the redirect.
    ///
    /// Only raised when the deployment runs in debug mode.
    #[error(
        "cannot redirect a {method} request to {url} without dropping its body; \
         structure views so that HTTPS redirects only occur on safe methods"
    )]
    UnsafeRedirect {
        /// Method of the rejected request
        method: HttpMethod,
        /// The secure URL the request would have been redirected to
        url: String,
    },
}

/// Why an `Authorization` header could not be turned into Basic credentials.
///
/// Never surfaced to clients: every variant is answered with the same 401
/// challenge as a wrong password.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MalformedCredentials {
    /// The header did not consist of exactly a scheme and a token
    #[error("authorization header must be '<scheme> <token>'")]
    TokenCount,
    /// The scheme was something other than `Basic`
    #[error("authorization scheme is not Basic")]
    NotBasic,
    /// The token was not valid base64
    #[error("credential token is not valid base64")]
    Base64,
    /// The decoded token was not valid UTF-8
    #[error("decoded credentials are not valid UTF-8")]
    Utf8,
    /// The decoded token had no `:` separating username and password
    #[error("decoded credentials have no ':' separator")]
    MissingSeparator,
}

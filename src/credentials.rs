//! HTTP Basic credentials and the verification seam.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::MalformedCredentials;
use crate::secret::Secret;

/// An identity returned by a [`CredentialVerifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Username the identity was verified for
    pub username: String,
    /// Whether the identity may pass the gate (staff / operator accounts)
    pub is_privileged: bool,
}

impl Identity {
    /// An identity allowed through the gate.
    pub fn privileged(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            is_privileged: true,
        }
    }

    /// A valid identity that is nevertheless refused by the gate.
    pub fn unprivileged(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            is_privileged: false,
        }
    }
}

/// Checks a username and password against an authentication backend.
///
/// Returning `None` means the credentials are wrong. The gate blocks on this
/// call; bounding its latency is the implementation's job.
pub trait CredentialVerifier {
    /// Verifies the credentials and returns the matching identity, if any.
    fn verify(&self, username: &str, password: &Secret<String>) -> Option<Identity>;
}

impl<F> CredentialVerifier for F
where
    F: Fn(&str, &Secret<String>) -> Option<Identity>,
{
    fn verify(&self, username: &str, password: &Secret<String>) -> Option<Identity> {
        self(username, password)
    }
}

/// Username and password decoded from a Basic `Authorization` header.
#[derive(Debug)]
pub struct BasicCredentials {
    /// Username, everything before the first `:`
    pub username: String,
    /// Password, everything after the first `:` (may itself contain `:`)
    pub password: Secret<String>,
}

impl BasicCredentials {
    /// Parses a raw `Authorization` header value.
    ///
    /// The header must be exactly two whitespace-separated tokens, the first
    /// being `Basic` in any case. The second is standard base64 of
    /// `username:password`.
    ///
    /// # Errors
    ///
    /// Returns the [`MalformedCredentials`] reason when any of those steps
    /// fails. Callers answer all of them the same way as a wrong password.
    ///
    /// # Examples
    ///
    /// ```
    /// use moat::BasicCredentials;
    ///
    /// // "alice:wonder:land"
    /// let creds = BasicCredentials::parse("Basic YWxpY2U6d29uZGVyOmxhbmQ=").unwrap();
    /// assert_eq!(creds.username, "alice");
    /// assert_eq!(creds.password.expose_secret(), "wonder:land");
    ///
    /// assert!(BasicCredentials::parse("Bearer abc").is_err());
    /// ```
    pub fn parse(header: &str) -> Result<Self, MalformedCredentials> {
        let mut parts = header.split_whitespace();
        let (scheme, token) = match (parts.next(), parts.next(), parts.next()) {
            (Some(scheme), Some(token), None) => (scheme, token),
            _ => return Err(MalformedCredentials::TokenCount),
        };

        if !scheme.eq_ignore_ascii_case("basic") {
            return Err(MalformedCredentials::NotBasic);
        }

        let decoded = STANDARD
            .decode(token)
            .map_err(|_| MalformedCredentials::Base64)?;
        let decoded = String::from_utf8(decoded).map_err(|_| MalformedCredentials::Utf8)?;

        let (username, password) = decoded
            .split_once(':')
            .ok_or(MalformedCredentials::MissingSeparator)?;

        Ok(Self {
            username: username.to_string(),
            password: Secret::new(password.to_string()),
        })
    }
}

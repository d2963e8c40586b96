use std::fmt;

/// A wrapper that keeps credential material out of logs.
///
/// Passwords decoded from a Basic `Authorization` header travel through the
/// gate inside a `Secret`. The value is only reachable through
/// [`expose_secret`](Self::expose_secret), so a stray `{:?}` in a tracing
/// event prints `[REDACTED]` instead of the password.
///
/// # Examples
///
/// ```
/// use moat::Secret;
///
/// let password = Secret::new("hunter2".to_string());
///
/// assert_eq!(format!("{:?}", password), "[REDACTED]");
/// assert_eq!(password.expose_secret(), "hunter2");
/// ```
// Do NOT derive Clone, Copy or Default: a verifier receives a borrow and
// should never be able to keep a copy around without saying so.
pub struct Secret<T> {
    inner: T,
}

impl<T> Secret<T> {
    /// Wraps a sensitive value.
    pub fn new(value: T) -> Self {
        Self { inner: value }
    }

    /// Explicitly exposes the wrapped value.
    ///
    /// Credential verifiers call this to compare against their backend.
    /// The returned reference must not end up in a log line.
    pub fn expose_secret(&self) -> &T {
        &self.inner
    }
}

impl<T> fmt::Debug for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl<T> fmt::Display for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// The gate's decision for one request.
///
/// Every variant is terminal: the request either continues to the
/// application or is answered by the gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdmissionOutcome {
    /// Let the request continue unmodified
    Allow,
    /// Answer with `307 Temporary Redirect` to the HTTPS URL
    RedirectToSecure {
        /// Absolute `https://` URL with the original host, path and query
        url: String,
    },
    /// Answer with `401 Unauthorized` and a Basic challenge
    Challenge {
        /// Realm to send in `WWW-Authenticate`
        realm: String,
    },
}

impl AdmissionOutcome {
    /// Whether the request may continue to the application.
    pub fn is_allowed(&self) -> bool {
        matches!(self, AdmissionOutcome::Allow)
    }
}

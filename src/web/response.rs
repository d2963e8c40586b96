//! Responses the gate answers with.

use crate::outcome::AdmissionOutcome;

/// An HTTP response produced by the gate instead of the application.
///
/// Framework glue copies the status and headers into its own response type.
/// The body is always empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateResponse {
    status: u16,
    headers: Vec<(String, String)>,
}

impl GateResponse {
    /// `307 Temporary Redirect` to `url`.
    pub fn temporary_redirect(url: impl Into<String>) -> Self {
        Self {
            status: 307,
            headers: vec![("Location".to_string(), url.into())],
        }
    }

    /// `401 Unauthorized` with a Basic challenge for `realm`.
    ///
    /// The realm is written as an HTTP quoted-string, so `"` and `\` are
    /// escaped.
    ///
    /// ```
    /// use moat::web::GateResponse;
    ///
    /// let resp = GateResponse::basic_challenge(r#"Team "A""#);
    /// assert_eq!(resp.header("www-authenticate"), Some(r#"Basic realm="Team \"A\"""#));
    /// ```
    pub fn basic_challenge(realm: &str) -> Self {
        Self {
            status: 401,
            headers: vec![(
                "WWW-Authenticate".to_string(),
                format!("Basic realm=\"{}\"", quote_escape(realm)),
            )],
        }
    }

    /// Maps an outcome to the response the gate sends, or `None` for
    /// [`AdmissionOutcome::Allow`].
    pub fn from_outcome(outcome: &AdmissionOutcome) -> Option<Self> {
        match outcome {
            AdmissionOutcome::Allow => None,
            AdmissionOutcome::RedirectToSecure { url } => {
                Some(Self::temporary_redirect(url.clone()))
            }
            AdmissionOutcome::Challenge { realm } => Some(Self::basic_challenge(realm)),
        }
    }

    /// Status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// All headers, in order.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Returns a header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

fn quote_escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

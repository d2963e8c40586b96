//! Request adapter for mapping HTTP requests to gate inputs.

use std::collections::HashMap;

use crate::request::{HttpMethod, RequestContext};

use super::ExtractRequestContext;

/// Owned copy of the request parts the gate reads.
///
/// `RequestAdapter` is the primary integration point between web frameworks
/// and the gate. Framework glue fills it from its own request type and hands
/// it to [`MoatMiddleware`](super::MoatMiddleware).
///
/// Header names are matched case-insensitively.
///
/// # Examples
///
/// ```
/// use moat::web::{ExtractRequestContext, RequestAdapter};
/// use moat::HttpMethod;
///
/// let mut adapter = RequestAdapter::new("req-12345", HttpMethod::Get, "example.com", "/reports");
/// adapter.set_query("year=2024");
/// adapter.add_header("X-Forwarded-Proto", "https");
///
/// let ctx = adapter.request_context();
/// assert_eq!(ctx.full_path(), "/reports?year=2024");
/// assert!(ctx.is_effectively_secure());
/// ```
#[derive(Debug, Clone)]
pub struct RequestAdapter {
    request_id: String,
    method: HttpMethod,
    host: String,
    path: String,
    query: Option<String>,
    is_secure: bool,
    /// Keyed by lower-cased header name
    headers: HashMap<String, String>,
}

impl RequestAdapter {
    /// Creates an adapter for a plain-HTTP request with no query or headers.
    pub fn new(
        request_id: impl Into<String>,
        method: HttpMethod,
        host: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            request_id: request_id.into(),
            method,
            host: host.into(),
            path: path.into(),
            query: None,
            is_secure: false,
            headers: HashMap::new(),
        }
    }

    /// Sets the raw query string, without the leading `?`.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = Some(query.into());
    }

    /// Records whether the connection to this process used TLS.
    pub fn set_secure(&mut self, is_secure: bool) {
        self.is_secure = is_secure;
    }

    /// Adds a header. A later header with the same name replaces the earlier one.
    pub fn add_header(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.headers
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
    }

    /// Returns a header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Returns the request ID.
    pub fn request_id(&self) -> &str {
        &self.request_id
    }
}

impl ExtractRequestContext for RequestAdapter {
    fn request_context(&self) -> RequestContext<'_> {
        RequestContext {
            request_id: &self.request_id,
            method: self.method.clone(),
            host: &self.host,
            path: &self.path,
            query: self.query.as_deref(),
            is_secure: self.is_secure,
            forwarded_proto: self.header("x-forwarded-proto"),
            authorization: self.header("authorization"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_adapter_new() {
        let adapter = RequestAdapter::new("req-test", HttpMethod::Get, "h", "/");
        let ctx = adapter.request_context();

        assert_eq!(adapter.request_id(), "req-test");
        assert_eq!(ctx.path, "/");
        assert!(!ctx.is_secure);
        assert!(ctx.query.is_none());
        assert!(ctx.authorization.is_none());
        assert!(ctx.forwarded_proto.is_none());
    }

    #[test]
    fn headers_are_case_insensitive() {
        let mut adapter = RequestAdapter::new("req-1", HttpMethod::Get, "h", "/");
        adapter.add_header("AUTHORIZATION", "Basic abc");

        assert_eq!(adapter.header("authorization"), Some("Basic abc"));
        assert_eq!(adapter.header("Authorization"), Some("Basic abc"));
    }

    #[test]
    fn later_header_replaces_earlier() {
        let mut adapter = RequestAdapter::new("req-1", HttpMethod::Get, "h", "/");
        adapter.add_header("X-Forwarded-Proto", "http");
        adapter.add_header("x-forwarded-proto", "https");

        assert_eq!(adapter.request_context().forwarded_proto, Some("https"));
    }

    #[test]
    fn context_carries_every_part() {
        let mut adapter = RequestAdapter::new("req-9", HttpMethod::Put, "example.com:8443", "/x");
        adapter.set_query("q=1");
        adapter.set_secure(true);
        adapter.add_header("Authorization", "Basic Zm9vOmJhcg==");

        let ctx = adapter.request_context();
        assert_eq!(ctx.request_id, "req-9");
        assert_eq!(ctx.method, HttpMethod::Put);
        assert_eq!(ctx.host, "example.com:8443");
        assert_eq!(ctx.query, Some("q=1"));
        assert!(ctx.is_secure);
        assert_eq!(ctx.authorization, Some("Basic Zm9vOmJhcg=="));
    }

    #[test]
    fn unrelated_headers_are_not_forwarded() {
        let mut adapter = RequestAdapter::new("req-1", HttpMethod::Get, "h", "/");
        adapter.add_header("User-Agent", "curl");

        let ctx = adapter.request_context();
        assert!(ctx.authorization.is_none());
        assert!(ctx.forwarded_proto.is_none());
    }
}

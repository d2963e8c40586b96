use std::fmt;
use std::str::FromStr;

/// HTTP method of an incoming request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpMethod {
    /// HTTP GET method
    Get,
    /// HTTP HEAD method
    Head,
    /// HTTP OPTIONS method
    Options,
    /// HTTP TRACE method
    Trace,
    /// HTTP POST method
    Post,
    /// HTTP PUT method
    Put,
    /// HTTP PATCH method
    Patch,
    /// HTTP DELETE method
    Delete,
    /// HTTP CONNECT method
    Connect,
    /// Any extension method, stored upper-cased
    Other(String),
}

impl HttpMethod {
    /// Returns `true` for methods that carry no body worth preserving and
    /// can be replayed by a redirect without losing data.
    ///
    /// ```
    /// use moat::HttpMethod;
    ///
    /// assert!(HttpMethod::Get.is_safe());
    /// assert!(!HttpMethod::Post.is_safe());
    /// ```
    pub fn is_safe(&self) -> bool {
        matches!(
            self,
            HttpMethod::Get | HttpMethod::Head | HttpMethod::Options | HttpMethod::Trace
        )
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpMethod::Get => write!(f, "GET"),
            HttpMethod::Head => write!(f, "HEAD"),
            HttpMethod::Options => write!(f, "OPTIONS"),
            HttpMethod::Trace => write!(f, "TRACE"),
            HttpMethod::Post => write!(f, "POST"),
            HttpMethod::Put => write!(f, "PUT"),
            HttpMethod::Patch => write!(f, "PATCH"),
            HttpMethod::Delete => write!(f, "DELETE"),
            HttpMethod::Connect => write!(f, "CONNECT"),
            HttpMethod::Other(name) => f.write_str(name),
        }
    }
}

impl FromStr for HttpMethod {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_ascii_uppercase();
        Ok(match upper.as_str() {
            "GET" => HttpMethod::Get,
            "HEAD" => HttpMethod::Head,
            "OPTIONS" => HttpMethod::Options,
            "TRACE" => HttpMethod::Trace,
            "POST" => HttpMethod::Post,
            "PUT" => HttpMethod::Put,
            "PATCH" => HttpMethod::Patch,
            "DELETE" => HttpMethod::Delete,
            "CONNECT" => HttpMethod::Connect,
            _ => HttpMethod::Other(upper),
        })
    }
}

/// Everything the admission engine reads about one incoming request.
///
/// The context borrows from the host framework's request; the engine never
/// owns or mutates it. Header values are raw and untrusted.
///
/// # Examples
///
/// ```
/// use moat::{HttpMethod, RequestContext};
///
/// let ctx = RequestContext::new("req-1", HttpMethod::Get, "example.com", "/reports")
///     .with_query("page=2")
///     .with_forwarded_proto("https");
///
/// assert_eq!(ctx.full_path(), "/reports?page=2");
/// assert!(!ctx.is_secure);
/// assert!(ctx.is_effectively_secure());
/// ```
#[derive(Debug, Clone)]
pub struct RequestContext<'a> {
    /// Identifier used to correlate log events for this request
    pub request_id: &'a str,
    /// Request method
    pub method: HttpMethod,
    /// Host as sent by the client, including any port
    pub host: &'a str,
    /// Path without the query string
    pub path: &'a str,
    /// Raw query string without the leading `?`
    pub query: Option<&'a str>,
    /// Whether the connection to this process used TLS
    pub is_secure: bool,
    /// Value of the `X-Forwarded-Proto` header, if any
    pub forwarded_proto: Option<&'a str>,
    /// Value of the `Authorization` header, if any
    pub authorization: Option<&'a str>,
}

impl<'a> RequestContext<'a> {
    /// Creates a plain-HTTP context with no query and no optional headers.
    pub fn new(request_id: &'a str, method: HttpMethod, host: &'a str, path: &'a str) -> Self {
        Self {
            request_id,
            method,
            host,
            path,
            query: None,
            is_secure: false,
            forwarded_proto: None,
            authorization: None,
        }
    }

    /// Sets the query string (without the leading `?`).
    pub fn with_query(mut self, query: &'a str) -> Self {
        self.query = Some(query);
        self
    }

    /// Marks the connection as secure (or not).
    pub fn secure(mut self, is_secure: bool) -> Self {
        self.is_secure = is_secure;
        self
    }

    /// Sets the `X-Forwarded-Proto` header value.
    pub fn with_forwarded_proto(mut self, proto: &'a str) -> Self {
        self.forwarded_proto = Some(proto);
        self
    }

    /// Sets the `Authorization` header value.
    pub fn with_authorization(mut self, authorization: &'a str) -> Self {
        self.authorization = Some(authorization);
        self
    }

    /// Path plus `?query` when a non-empty query is present.
    pub fn full_path(&self) -> String {
        match self.query {
            Some(q) if !q.is_empty() => format!("{}?{}", self.path, q),
            _ => self.path.to_string(),
        }
    }

    /// Whether the request should be treated as having arrived over TLS.
    ///
    /// True when the connection itself was secure, or when a reverse proxy
    /// reported `X-Forwarded-Proto: https`. The header is client-controlled,
    /// so this is only sound behind a proxy that overwrites it.
    pub fn is_effectively_secure(&self) -> bool {
        self.is_secure || self.forwarded_proto == Some("https")
    }

    /// The `https://` URL for the same host, path and query.
    pub fn secure_url(&self) -> String {
        format!("https://{}{}", self.host, self.full_path())
    }
}

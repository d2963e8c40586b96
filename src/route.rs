//! Route resolution seam.
//!
//! The gate never inspects the host framework's router. It asks a
//! [`RouteResolver`] which logical view would serve a path and matches the
//! answer against its view and module allow-lists.

use std::collections::HashMap;
use std::fmt;

/// Logical identifier of the handler that would serve a path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteId {
    /// Dotted module (route group) path, e.g. `billing.views`
    pub module: String,
    /// Name of the view within the module, e.g. `invoice_detail`
    pub view: String,
}

impl RouteId {
    /// Creates a route identifier.
    pub fn new(module: impl Into<String>, view: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            view: view.into(),
        }
    }

    /// The fully qualified view name, `"{module}.{view}"`.
    ///
    /// ```
    /// use moat::RouteId;
    ///
    /// let route = RouteId::new("billing.views", "invoice_detail");
    /// assert_eq!(route.full_view_name(), "billing.views.invoice_detail");
    /// ```
    pub fn full_view_name(&self) -> String {
        format!("{}.{}", self.module, self.view)
    }
}

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.module, self.view)
    }
}

/// Resolves a request path to the logical view that would serve it.
///
/// Returns `None` when no route matches. The gate treats an unresolvable
/// path as not allow-listed and carries on with enforcement.
pub trait RouteResolver {
    /// Resolves `path` to a route identifier.
    fn resolve(&self, path: &str) -> Option<RouteId>;
}

impl<F> RouteResolver for F
where
    F: Fn(&str) -> Option<RouteId>,
{
    fn resolve(&self, path: &str) -> Option<RouteId> {
        self(path)
    }
}

/// A fixed table of exact path to route mappings.
///
/// Useful for small deployments and tests where the routing table is known
/// up front.
///
/// ```
/// use moat::{RouteId, RouteResolver, StaticRoutes};
///
/// let routes = StaticRoutes::new()
///     .route("/health", RouteId::new("ops.views", "health"));
///
/// assert_eq!(routes.resolve("/health").unwrap().view, "health");
/// assert!(routes.resolve("/missing").is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticRoutes {
    routes: HashMap<String, RouteId>,
}

impl StaticRoutes {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a mapping for an exact path.
    pub fn route(mut self, path: impl Into<String>, route: RouteId) -> Self {
        self.routes.insert(path.into(), route);
        self
    }
}

impl RouteResolver for StaticRoutes {
    fn resolve(&self, path: &str) -> Option<RouteId> {
        self.routes.get(path).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closure_resolvers_are_accepted() {
        let resolver = |path: &str| {
            path.strip_prefix("/api/")
                .map(|rest| RouteId::new("api.views", rest))
        };

        assert_eq!(
            resolver.resolve("/api/users"),
            Some(RouteId::new("api.views", "users"))
        );
        assert_eq!(resolver.resolve("/other"), None);
    }

    #[test]
    fn display_matches_full_view_name() {
        let route = RouteId::new("a.b", "c");
        assert_eq!(route.to_string(), route.full_view_name());
    }
}

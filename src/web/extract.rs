//! Extraction boundary trait for web integration.

use crate::request::RequestContext;

/// Borrows the gate's view of a framework-specific request.
///
/// Implement this directly on a framework request type to skip copying it
/// into a [`RequestAdapter`](super::RequestAdapter).
///
/// # Design Notes
///
/// This trait only maps framework types to gate inputs. It does NOT decide
/// anything about security: in particular it must pass `X-Forwarded-Proto`
/// through as-is and leave trusting it to the engine.
///
/// # Examples
///
/// ```
/// use moat::web::ExtractRequestContext;
/// use moat::{HttpMethod, RequestContext};
///
/// struct MyFrameworkRequest {
///     id: String,
///     path: String,
///     auth: Option<String>,
/// }
///
/// impl ExtractRequestContext for MyFrameworkRequest {
///     fn request_context(&self) -> RequestContext<'_> {
///         let mut ctx = RequestContext::new(&self.id, HttpMethod::Get, "internal", &self.path)
///             .secure(true);
///         ctx.authorization = self.auth.as_deref();
///         ctx
///     }
/// }
/// ```
pub trait ExtractRequestContext {
    /// Returns the request as the admission engine sees it.
    fn request_context(&self) -> RequestContext<'_>;
}

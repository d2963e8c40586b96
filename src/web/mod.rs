//! Web framework integration surface.
//!
//! This module is the boundary between an HTTP framework and the admission
//! engine. It handles:
//! - Collecting the request parts the gate needs ([`RequestAdapter`])
//! - Borrowing them as a [`RequestContext`](crate::RequestContext)
//! - Turning an [`AdmissionOutcome`](crate::AdmissionOutcome) into a response
//!
//! # Design Principles
//!
//! 1. **No Framework Dependencies**: nothing here knows about a specific
//!    framework. Framework glue fills a `RequestAdapter` (or implements
//!    [`ExtractRequestContext`] on its own request type) and writes a
//!    [`GateResponse`] back out.
//!
//! 2. **Headers Stay Raw**: header values are passed through untouched; the
//!    engine decides what to trust.
//!
//! 3. **Explicit Context**: no global state. Policy lives in the engine,
//!    session state is passed in per request.
//!
//! # Integration Flow
//!
//! ```text
//! HTTP Request
//!   ↓
//! Framework glue builds RequestAdapter
//!   ↓
//! MoatMiddleware::process_request(&adapter, &mut session)
//!   ↓
//! Ok(None)            → call the next handler
//! Ok(Some(response))  → write the 307 / 401 response
//! Err(error)          → misconfiguration, abort with a diagnostic
//! ```
//!
//! # Example
//!
//! ```
//! use std::collections::HashMap;
//! use moat::web::{MoatMiddleware, RequestAdapter};
//! use moat::{HttpMethod, Identity, PolicyConfig, Secret, StaticRoutes};
//!
//! let middleware = MoatMiddleware::new(
//!     PolicyConfig::builder().auth_realm("Staging").build().unwrap(),
//!     StaticRoutes::new(),
//!     |user: &str, _pw: &Secret<String>| Some(Identity::privileged(user)),
//! );
//!
//! let mut adapter = RequestAdapter::new("req-1", HttpMethod::Get, "example.com", "/");
//! adapter.set_secure(true);
//!
//! let mut session: HashMap<String, String> = HashMap::new();
//! let response = middleware
//!     .process_request(&adapter, &mut session)
//!     .unwrap()
//!     .expect("no credentials, so the gate answers");
//!
//! assert_eq!(response.status(), 401);
//! assert_eq!(response.header("WWW-Authenticate"), Some("Basic realm=\"Staging\""));
//! ```

mod adapter;
mod extract;
mod middleware;
mod response;

pub use adapter::RequestAdapter;
pub use extract::ExtractRequestContext;
pub use middleware::MoatMiddleware;
pub use response::GateResponse;

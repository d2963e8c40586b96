//! Middleware entry point for running the gate in a request pipeline.
//!
//! `MoatMiddleware` sits first in the framework's middleware chain. For each
//! request it extracts a [`RequestContext`](crate::RequestContext), asks the
//! admission engine for a decision and returns either nothing (continue) or
//! the response to send.
//!
//! # Design Principles
//!
//! 1. **Outcome In, Response Out**: the engine never builds HTTP responses;
//!    this layer maps outcomes through [`GateResponse::from_outcome`].
//!
//! 2. **Errors Are Misconfiguration**: failed logins are answered with a
//!    401, not an `Err`. An `Err` here means the deployment is set up in a
//!    way that would lose data and should abort loudly.

use std::sync::Arc;

use crate::credentials::CredentialVerifier;
use crate::error::AdmissionError;
use crate::gate::AdmissionEngine;
use crate::policy::PolicyConfig;
use crate::route::RouteResolver;
use crate::session::SessionStore;

use super::{ExtractRequestContext, GateResponse};

/// Request-gating middleware wrapping an [`AdmissionEngine`].
#[derive(Debug)]
pub struct MoatMiddleware<R, V> {
    engine: AdmissionEngine<R, V>,
}

impl<R, V> MoatMiddleware<R, V>
where
    R: RouteResolver,
    V: CredentialVerifier,
{
    /// Creates the middleware from a frozen policy and its collaborators.
    pub fn new(config: impl Into<Arc<PolicyConfig>>, resolver: R, verifier: V) -> Self {
        Self {
            engine: AdmissionEngine::new(config, resolver, verifier),
        }
    }

    /// Wraps an existing engine.
    pub fn from_engine(engine: AdmissionEngine<R, V>) -> Self {
        Self { engine }
    }

    /// Returns the wrapped engine.
    pub fn engine(&self) -> &AdmissionEngine<R, V> {
        &self.engine
    }

    /// Runs the gate for one request.
    ///
    /// # Returns
    ///
    /// * `Ok(None)` if the request may continue to the application
    /// * `Ok(Some(response))` if the gate answers with a redirect or challenge
    ///
    /// # Errors
    ///
    /// Returns [`AdmissionError`] when the request cannot be handled without
    /// dropping data. Framework glue should abort with a diagnostic rather
    /// than send anything to the client.
    pub fn process_request<E, S>(
        &self,
        request: &E,
        session: &mut S,
    ) -> Result<Option<GateResponse>, AdmissionError>
    where
        E: ExtractRequestContext + ?Sized,
        S: SessionStore + ?Sized,
    {
        let ctx = request.request_context();
        let outcome = self.engine.decide(&ctx, session)?;
        Ok(GateResponse::from_outcome(&outcome))
    }
}

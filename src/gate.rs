use std::sync::Arc;

use crate::{
    credentials::{BasicCredentials, CredentialVerifier},
    error::AdmissionError,
    logging::DecisionLog,
    outcome::AdmissionOutcome,
    policy::PolicyConfig,
    request::RequestContext,
    route::RouteResolver,
    session::{SessionStore, SESSION_USERNAME_KEY},
};

/// The admission engine.
///
/// Decides, per request, whether to let it through, redirect it to HTTPS or
/// challenge it for Basic credentials. Checks run in a fixed order and the
/// first conclusive one wins:
///
/// 1. gate disabled
/// 2. always-allow URL pattern
/// 3. username already in the session
/// 4. always-allow view, module or admin namespace
/// 5. HTTPS redirect for insecure requests
/// 6. Basic credentials verified as a privileged identity
///
/// Anything else is challenged. The allow-list checks run before HTTPS
/// enforcement and credential checks, so exempt paths never see either.
///
/// The engine holds no mutable state. One instance serves every request
/// concurrently as long as its resolver and verifier are `Sync`.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use moat::{
///     AdmissionEngine, AdmissionOutcome, HttpMethod, Identity, PolicyConfig,
///     RequestContext, RouteId, Secret,
/// };
///
/// let config = PolicyConfig::builder().auth_realm("Staging").build().unwrap();
/// let engine = AdmissionEngine::new(
///     config,
///     |_path: &str| Some(RouteId::new("app.views", "home")),
///     |user: &str, pw: &Secret<String>| {
///         (pw.expose_secret() == "letmein").then(|| Identity::privileged(user))
///     },
/// );
///
/// let mut session: HashMap<String, String> = HashMap::new();
/// let ctx = RequestContext::new("req-1", HttpMethod::Get, "example.com", "/").secure(true);
///
/// let outcome = engine.decide(&ctx, &mut session).unwrap();
/// assert_eq!(outcome, AdmissionOutcome::Challenge { realm: "Staging".to_string() });
/// ```
#[derive(Debug)]
pub struct AdmissionEngine<R, V> {
    config: Arc<PolicyConfig>,
    resolver: R,
    verifier: V,
}

impl<R, V> AdmissionEngine<R, V>
where
    R: RouteResolver,
    V: CredentialVerifier,
{
    /// Creates an engine from a frozen policy and its two collaborators.
    pub fn new(config: impl Into<Arc<PolicyConfig>>, resolver: R, verifier: V) -> Self {
        Self {
            config: config.into(),
            resolver,
            verifier,
        }
    }

    /// Returns the policy this engine enforces.
    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    /// Decides what to do with one request.
    ///
    /// The only side effect is writing the verified username to
    /// [`SESSION_USERNAME_KEY`] after a successful Basic login.
    ///
    /// # Errors
    ///
    /// Returns [`AdmissionError::UnsafeRedirect`] when, in debug mode, an
    /// insecure request with a non-safe method would have to be redirected
    /// to HTTPS. The redirect would drop the request body.
    pub fn decide<S>(
        &self,
        ctx: &RequestContext<'_>,
        session: &mut S,
    ) -> Result<AdmissionOutcome, AdmissionError>
    where
        S: SessionStore + ?Sized,
    {
        let log = DecisionLog::new(ctx.request_id);

        if !self.config.is_enabled() {
            return Ok(AdmissionOutcome::Allow);
        }

        if let Some(pattern) = self.config.matching_url_pattern(ctx.path) {
            log.debug(format_args!(
                "URL {} is allowed by pattern '{}'",
                ctx.path, pattern
            ));
            return Ok(AdmissionOutcome::Allow);
        }

        match session.get(SESSION_USERNAME_KEY) {
            Some(username) => {
                log.info(format_args!("Already authenticated as: {}", username));
                return Ok(AdmissionOutcome::Allow);
            }
            None => log.debug(format_args!("No gate username in session")),
        }

        if self.route_is_allowed(ctx, log) {
            return Ok(AdmissionOutcome::Allow);
        }

        if !self.config.https_disabled() && !ctx.is_effectively_secure() {
            return self.redirect_to_secure(ctx, log);
        }

        Ok(self.authenticate(ctx, session, log))
    }

    /// Resolves the path and checks it against the view and module allow-lists.
    fn route_is_allowed(&self, ctx: &RequestContext<'_>, log: DecisionLog<'_>) -> bool {
        let Some(route) = self.resolver.resolve(ctx.path) else {
            log.debug(format_args!("No route resolves {}", ctx.path));
            return false;
        };

        log.debug(format_args!("full_view_name = {}", route.full_view_name()));

        if self.config.allows_route(&route) {
            log.debug(format_args!("View {} is allowed by config", route));
            return true;
        }
        false
    }

    fn redirect_to_secure(
        &self,
        ctx: &RequestContext<'_>,
        log: DecisionLog<'_>,
    ) -> Result<AdmissionOutcome, AdmissionError> {
        let url = ctx.secure_url();

        if !ctx.method.is_safe() {
            if self.config.is_debug() {
                log.error(format_args!(
                    "Refusing to redirect {} {} to HTTPS: the body would be dropped",
                    ctx.method, ctx.path
                ));
                return Err(AdmissionError::UnsafeRedirect {
                    method: ctx.method.clone(),
                    url,
                });
            }
            log.warn(format_args!(
                "Redirecting {} {} to HTTPS; the request body is dropped",
                ctx.method, ctx.path
            ));
        }

        log.debug(format_args!("Redirecting insecure request to {}", url));
        Ok(AdmissionOutcome::RedirectToSecure { url })
    }

    /// Checks the `Authorization` header, challenging on anything short of
    /// a verified privileged identity.
    fn authenticate<S>(
        &self,
        ctx: &RequestContext<'_>,
        session: &mut S,
        log: DecisionLog<'_>,
    ) -> AdmissionOutcome
    where
        S: SessionStore + ?Sized,
    {
        if let Some(header) = ctx.authorization {
            match BasicCredentials::parse(header) {
                Ok(creds) => match self.verifier.verify(&creds.username, &creds.password) {
                    Some(identity) if identity.is_privileged => {
                        log.info(format_args!("Authenticated as: {}", creds.username));
                        session.set(SESSION_USERNAME_KEY, creds.username);
                        return AdmissionOutcome::Allow;
                    }
                    Some(_) => log.warn(format_args!(
                        "User {} is not privileged to pass the gate",
                        creds.username
                    )),
                    None => log.warn(format_args!(
                        "Invalid credentials for user {}",
                        creds.username
                    )),
                },
                Err(reason) => {
                    log.debug(format_args!("Ignoring Authorization header: {}", reason))
                }
            }
        }

        AdmissionOutcome::Challenge {
            realm: self.config.auth_realm().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;

    use super::*;
    use crate::credentials::Identity;
    use crate::request::HttpMethod;
    use crate::route::{RouteId, StaticRoutes};
    use crate::secret::Secret;

    fn routes() -> StaticRoutes {
        StaticRoutes::new()
            .route("/", RouteId::new("app.views", "home"))
            .route("/go", RouteId::new("generic.views", "redirect_to"))
            .route("/public", RouteId::new("public.views", "index"))
            .route("/landing", RouteId::new("shop.views", "landing"))
            .route("/admin/", RouteId::new("contrib.admin.sites", "index"))
    }

    fn verifier(user: &str, pw: &Secret<String>) -> Option<Identity> {
        match (user, pw.expose_secret().as_str()) {
            ("staff", "pw") => Some(Identity::privileged("staff")),
            ("member", "pw") => Some(Identity::unprivileged("member")),
            _ => None,
        }
    }

    type Verify = fn(&str, &Secret<String>) -> Option<Identity>;

    fn engine(config: PolicyConfig) -> AdmissionEngine<StaticRoutes, Verify> {
        AdmissionEngine::new(config, routes(), verifier as Verify)
    }

    fn default_engine() -> AdmissionEngine<StaticRoutes, Verify> {
        engine(
            PolicyConfig::builder()
                .always_allow_url(r"^/static/")
                .always_allow_module("public.views")
                .always_allow_view("shop.views.landing")
                .auth_realm("Test")
                .build()
                .unwrap(),
        )
    }

    fn basic(user: &str, pass: &str) -> String {
        format!("Basic {}", STANDARD.encode(format!("{user}:{pass}")))
    }

    fn challenge() -> AdmissionOutcome {
        AdmissionOutcome::Challenge {
            realm: "Test".to_string(),
        }
    }

    #[test]
    fn disabled_gate_allows_everything() {
        let engine = engine(PolicyConfig::builder().enabled(false).build().unwrap());
        let mut session: HashMap<String, String> = HashMap::new();
        let ctx = RequestContext::new("r", HttpMethod::Post, "h", "/");

        assert_eq!(
            engine.decide(&ctx, &mut session).unwrap(),
            AdmissionOutcome::Allow
        );
    }

    #[test]
    fn url_pattern_allows_insecure_unauthenticated_request() {
        let engine = default_engine();
        let mut session: HashMap<String, String> = HashMap::new();
        let ctx = RequestContext::new("r", HttpMethod::Post, "h", "/static/app.js");

        assert_eq!(
            engine.decide(&ctx, &mut session).unwrap(),
            AdmissionOutcome::Allow
        );
    }

    #[test]
    fn session_username_allows_request() {
        let engine = default_engine();
        let mut session: HashMap<String, String> = HashMap::new();
        session.insert(SESSION_USERNAME_KEY.to_string(), "staff".to_string());
        let ctx = RequestContext::new("r", HttpMethod::Get, "h", "/");

        assert_eq!(
            engine.decide(&ctx, &mut session).unwrap(),
            AdmissionOutcome::Allow
        );
    }

    #[test]
    fn allow_listed_routes_skip_https_and_auth() {
        let engine = default_engine();
        let mut session: HashMap<String, String> = HashMap::new();

        for path in ["/go", "/public", "/landing"] {
            let ctx = RequestContext::new("r", HttpMethod::Get, "h", path);
            assert_eq!(
                engine.decide(&ctx, &mut session).unwrap(),
                AdmissionOutcome::Allow,
                "{path}"
            );
        }
    }

    #[test]
    fn admin_routes_only_allowed_when_configured() {
        let closed = default_engine();
        let mut session: HashMap<String, String> = HashMap::new();
        let ctx = RequestContext::new("r", HttpMethod::Get, "h", "/admin/").secure(true);
        assert_eq!(closed.decide(&ctx, &mut session).unwrap(), challenge());

        let open = engine(
            PolicyConfig::builder()
                .allow_admin(true)
                .auth_realm("Test")
                .build()
                .unwrap(),
        );
        assert_eq!(
            open.decide(&ctx, &mut session).unwrap(),
            AdmissionOutcome::Allow
        );
    }

    #[test]
    fn unresolvable_path_is_enforced() {
        let engine = default_engine();
        let mut session: HashMap<String, String> = HashMap::new();
        let ctx = RequestContext::new("r", HttpMethod::Get, "h", "/nowhere").secure(true);

        assert_eq!(engine.decide(&ctx, &mut session).unwrap(), challenge());
    }

    #[test]
    fn insecure_request_is_redirected_with_query() {
        let engine = default_engine();
        let mut session: HashMap<String, String> = HashMap::new();
        let ctx = RequestContext::new("r", HttpMethod::Get, "example.com", "/").with_query("a=1");

        assert_eq!(
            engine.decide(&ctx, &mut session).unwrap(),
            AdmissionOutcome::RedirectToSecure {
                url: "https://example.com/?a=1".to_string()
            }
        );
    }

    #[test]
    fn redirect_happens_before_credentials_are_checked() {
        let engine = default_engine();
        let mut session: HashMap<String, String> = HashMap::new();
        let header = basic("staff", "pw");
        let ctx = RequestContext::new("r", HttpMethod::Get, "h", "/").with_authorization(&header);

        assert!(matches!(
            engine.decide(&ctx, &mut session).unwrap(),
            AdmissionOutcome::RedirectToSecure { .. }
        ));
        assert!(session.is_empty());
    }

    #[test]
    fn forwarded_proto_https_counts_as_secure() {
        let engine = default_engine();
        let mut session: HashMap<String, String> = HashMap::new();
        let ctx = RequestContext::new("r", HttpMethod::Get, "h", "/").with_forwarded_proto("https");

        assert_eq!(engine.decide(&ctx, &mut session).unwrap(), challenge());
    }

    #[test]
    fn https_redirect_can_be_disabled() {
        let engine = engine(
            PolicyConfig::builder()
                .debug_disable_https(true)
                .auth_realm("Test")
                .build()
                .unwrap(),
        );
        let mut session: HashMap<String, String> = HashMap::new();
        let ctx = RequestContext::new("r", HttpMethod::Get, "h", "/");

        assert_eq!(engine.decide(&ctx, &mut session).unwrap(), challenge());
    }

    #[test]
    fn unsafe_redirect_is_fatal_in_debug_mode() {
        let engine = engine(PolicyConfig::builder().debug(true).build().unwrap());
        let mut session: HashMap<String, String> = HashMap::new();
        let ctx = RequestContext::new("r", HttpMethod::Post, "h", "/form");

        assert_eq!(
            engine.decide(&ctx, &mut session).unwrap_err(),
            AdmissionError::UnsafeRedirect {
                method: HttpMethod::Post,
                url: "https://h/form".to_string(),
            }
        );
    }

    #[test]
    fn safe_redirect_is_fine_in_debug_mode() {
        let engine = engine(PolicyConfig::builder().debug(true).build().unwrap());
        let mut session: HashMap<String, String> = HashMap::new();
        let ctx = RequestContext::new("r", HttpMethod::Head, "h", "/form");

        assert!(matches!(
            engine.decide(&ctx, &mut session).unwrap(),
            AdmissionOutcome::RedirectToSecure { .. }
        ));
    }

    #[test]
    fn unsafe_redirect_proceeds_outside_debug_mode() {
        let engine = default_engine();
        let mut session: HashMap<String, String> = HashMap::new();
        let ctx = RequestContext::new("r", HttpMethod::Post, "h", "/form");

        assert_eq!(
            engine.decide(&ctx, &mut session).unwrap(),
            AdmissionOutcome::RedirectToSecure {
                url: "https://h/form".to_string()
            }
        );
    }

    #[test]
    fn privileged_credentials_allow_and_write_session() {
        let engine = default_engine();
        let mut session: HashMap<String, String> = HashMap::new();
        let header = basic("staff", "pw");
        let ctx = RequestContext::new("r", HttpMethod::Get, "h", "/")
            .secure(true)
            .with_authorization(&header);

        assert_eq!(
            engine.decide(&ctx, &mut session).unwrap(),
            AdmissionOutcome::Allow
        );
        assert_eq!(
            session.get(SESSION_USERNAME_KEY).map(String::as_str),
            Some("staff")
        );
    }

    #[test]
    fn unprivileged_identity_is_challenged() {
        let engine = default_engine();
        let mut session: HashMap<String, String> = HashMap::new();
        let header = basic("member", "pw");
        let ctx = RequestContext::new("r", HttpMethod::Get, "h", "/")
            .secure(true)
            .with_authorization(&header);

        assert_eq!(engine.decide(&ctx, &mut session).unwrap(), challenge());
        assert!(session.is_empty());
    }

    #[test]
    fn wrong_password_is_challenged() {
        let engine = default_engine();
        let mut session: HashMap<String, String> = HashMap::new();
        let header = basic("staff", "nope");
        let ctx = RequestContext::new("r", HttpMethod::Get, "h", "/")
            .secure(true)
            .with_authorization(&header);

        assert_eq!(engine.decide(&ctx, &mut session).unwrap(), challenge());
        assert!(session.is_empty());
    }

    #[test]
    fn malformed_headers_are_challenged_not_errors() {
        let engine = default_engine();
        let mut session: HashMap<String, String> = HashMap::new();
        let no_colon = format!("Basic {}", STANDARD.encode("staffpw"));

        for header in [
            "Basic",
            "Basic !!!",
            "Bearer token",
            "Basic a b",
            no_colon.as_str(),
        ] {
            let ctx = RequestContext::new("r", HttpMethod::Get, "h", "/")
                .secure(true)
                .with_authorization(header);
            assert_eq!(
                engine.decide(&ctx, &mut session).unwrap(),
                challenge(),
                "{header}"
            );
        }
        assert!(session.is_empty());
    }

    #[test]
    fn missing_header_is_challenged_with_realm() {
        let engine = default_engine();
        let mut session: HashMap<String, String> = HashMap::new();
        let ctx = RequestContext::new("r", HttpMethod::Get, "h", "/").secure(true);

        assert_eq!(engine.decide(&ctx, &mut session).unwrap(), challenge());
    }

    #[test]
    fn engine_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AdmissionEngine<StaticRoutes, Verify>>();
    }
}

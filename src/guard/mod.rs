//! Route guard: per-request allow/redirect decision made before any page renders.
//!
//! The guard is a UX gate, not a security boundary. The backend must still
//! authorize every API call. Credential errors fail closed: a token that cannot
//! be read counts as no token.

pub mod credential;
pub mod matcher;

pub use credential::{
    CookieCredentialResolver, CredentialError, CredentialResolver, DEFAULT_SESSION_COOKIE,
    SessionCredential,
};
pub use matcher::RouteMatcher;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, Uri},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use tracing::{debug, warn};
use url::{Url, form_urlencoded};

pub const SIGN_IN_PATH: &str = "/auth/signin";
pub const DASHBOARD_PATH: &str = "/dashboard";
const AUTH_PAGE_PREFIX: &str = "/auth";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    RedirectTo(String),
}

/// Decide for a guarded request. Total: every input yields a decision.
///
/// `original_url` is the full URL the user asked for; it is carried to the
/// sign-in page as `callbackUrl`.
#[must_use]
pub fn decide(path: &str, original_url: &str, credential: Option<&SessionCredential>) -> Decision {
    let is_auth_page = path.starts_with(AUTH_PAGE_PREFIX);

    match (is_auth_page, credential.is_some()) {
        (true, true) => Decision::RedirectTo(DASHBOARD_PATH.to_string()),
        (true, false) | (false, true) => Decision::Allow,
        (false, false) => Decision::RedirectTo(sign_in_url(original_url)),
    }
}

fn sign_in_url(callback: &str) -> String {
    let encoded: String = form_urlencoded::byte_serialize(callback.as_bytes()).collect();
    format!("{SIGN_IN_PATH}?callbackUrl={encoded}")
}

pub struct RouteGuard {
    matcher: RouteMatcher,
    resolver: Arc<dyn CredentialResolver>,
    public_url: Url,
}

impl RouteGuard {
    /// # Errors
    /// Returns an error if the matcher patterns fail to compile.
    pub fn new(
        public_url: Url,
        resolver: Arc<dyn CredentialResolver>,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            matcher: RouteMatcher::new()?,
            resolver,
            public_url,
        })
    }

    /// `None` when the path is outside the guarded set and the guard must not run.
    #[must_use]
    pub fn evaluate(&self, uri: &Uri, headers: &HeaderMap) -> Option<Decision> {
        let path = uri.path();
        if !self.matcher.applies(path) {
            return None;
        }

        let credential = match self.resolver.resolve(headers) {
            Ok(credential) => credential,
            Err(err) => {
                warn!("unreadable session credential, treating as signed out: {err}");
                None
            }
        };

        let decision = decide(path, &self.original_url(uri), credential.as_ref());
        debug!(path, ?decision, "route guard");
        Some(decision)
    }

    fn original_url(&self, uri: &Uri) -> String {
        let path_and_query = uri.path_and_query().map_or(uri.path(), |pq| pq.as_str());
        self.public_url
            .join(path_and_query)
            .map_or_else(|_| path_and_query.to_string(), String::from)
    }
}

impl std::fmt::Debug for RouteGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteGuard")
            .field("matcher", &self.matcher)
            .field("public_url", &self.public_url.as_str())
            .finish_non_exhaustive()
    }
}

/// axum middleware running [`RouteGuard::evaluate`] in front of the page router.
pub async fn route_guard(
    State(guard): State<Arc<RouteGuard>>,
    request: Request,
    next: Next,
) -> Response {
    match guard.evaluate(request.uri(), request.headers()) {
        Some(Decision::RedirectTo(location)) => Redirect::temporary(&location).into_response(),
        Some(Decision::Allow) | None => next.run(request).await,
    }
}

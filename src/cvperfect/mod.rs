//! Edge server: page shells behind the route guard, the same-origin auth proxy and
//! the operational endpoints.

use crate::guard::{CookieCredentialResolver, DEFAULT_SESSION_COOKIE, RouteGuard, route_guard};
use anyhow::{Context, Result};
use axum::{
    Router,
    body::Body,
    extract::MatchedPath,
    http::{HeaderName, HeaderValue, Request},
    middleware,
    routing::{any, get},
};
use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer, set_header::SetRequestHeaderLayer, trace::TraceLayer,
};
use tracing::{Span, info, info_span};
use ulid::Ulid;
use url::Url;

pub mod handlers;
mod openapi;

pub use openapi::openapi;

use handlers::{AuthProxy, auth_proxy, health, pages, plans};

const REQUEST_ID: &str = "x-request-id";

#[derive(Debug, Clone)]
pub struct EdgeConfig {
    backend_url: Url,
    public_url: Url,
    session_cookie: String,
    backend_timeout: Duration,
}

impl EdgeConfig {
    #[must_use]
    pub fn new(backend_url: Url, public_url: Url) -> Self {
        Self {
            backend_url,
            public_url,
            session_cookie: DEFAULT_SESSION_COOKIE.to_string(),
            backend_timeout: crate::session::client::DEFAULT_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_session_cookie(mut self, name: impl Into<String>) -> Self {
        self.session_cookie = name.into();
        self
    }

    #[must_use]
    pub const fn with_backend_timeout(mut self, timeout: Duration) -> Self {
        self.backend_timeout = timeout;
        self
    }

    #[must_use]
    pub const fn backend_url(&self) -> &Url {
        &self.backend_url
    }

    #[must_use]
    pub const fn public_url(&self) -> &Url {
        &self.public_url
    }

    #[must_use]
    pub fn session_cookie(&self) -> &str {
        &self.session_cookie
    }

    #[must_use]
    pub const fn backend_timeout(&self) -> Duration {
        self.backend_timeout
    }
}

/// Build the edge router.
///
/// Pages, the plan catalog, the auth proxy and the 404 fallback sit behind the route
/// guard; the matcher keeps the proxy out of it. `/health` is mounted outside.
///
/// # Errors
/// Returns an error if the guard patterns fail to compile or the proxy client cannot
/// be built.
pub fn router(config: &EdgeConfig) -> Result<Router> {
    let resolver = Arc::new(CookieCredentialResolver::new(config.session_cookie()));
    let guard = Arc::new(
        RouteGuard::new(config.public_url().clone(), resolver)
            .context("Failed to compile route guard patterns")?,
    );
    let proxy = Arc::new(AuthProxy::new(
        config.backend_url().clone(),
        config.backend_timeout(),
    )?);

    let guarded = Router::new()
        .route("/", get(pages::root))
        .route("/dashboard", get(pages::dashboard))
        .route("/history", get(pages::history))
        .route("/billing", get(pages::billing))
        .route("/auth/signin", get(pages::sign_in))
        .route("/auth/signup", get(pages::sign_up))
        .route("/auth/reset-password", get(pages::reset_password))
        .route("/api/billing/plans", get(plans))
        .route(
            "/api/auth/{*rest}",
            any(auth_proxy::forward).with_state(proxy),
        )
        .fallback(pages::not_found)
        .layer(middleware::from_fn_with_state(guard, route_guard));

    let app = guarded
        .merge(Router::new().route("/health", get(health)))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static(REQUEST_ID),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    REQUEST_ID,
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span)),
        );

    Ok(app)
}

/// Start the server
/// # Errors
/// Return error if failed to start the server
pub async fn new(port: u16, config: EdgeConfig) -> Result<()> {
    let app = router(&config)?;

    let listener = TcpListener::bind(format!("::0:{port}"))
        .await
        .with_context(|| format!("Failed to bind port {port}"))?;

    info!(
        backend = config.backend_url().as_str(),
        public = config.public_url().as_str(),
        "Listening on [::]:{}",
        port
    );

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Gracefully shutdown");
        })
        .await?;

    Ok(())
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get(REQUEST_ID)
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}

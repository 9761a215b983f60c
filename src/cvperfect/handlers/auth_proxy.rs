//! Same-origin pass-through for `/api/auth/*`. The browser's session cookie travels
//! to the backend and the backend's `Set-Cookie` travels back untouched.

use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::State,
    http::{
        HeaderMap, HeaderName, Method, StatusCode, Uri,
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, COOKIE, SET_COOKIE},
    },
    response::{IntoResponse, Json, Response},
};
use reqwest::{Client, redirect::Policy};
use serde_json::json;
use std::{sync::Arc, time::Duration};
use tracing::{error, instrument};
use url::Url;

static FORWARDED_REQUEST_HEADERS: [HeaderName; 4] = [ACCEPT, AUTHORIZATION, CONTENT_TYPE, COOKIE];
static RELAYED_RESPONSE_HEADERS: [HeaderName; 2] = [CONTENT_TYPE, SET_COOKIE];

#[derive(Debug)]
pub struct AuthProxy {
    client: Client,
    backend_url: Url,
}

impl AuthProxy {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(backend_url: Url, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(crate::APP_USER_AGENT)
            .redirect(Policy::none())
            .timeout(timeout)
            .build()
            .context("Failed to build auth proxy client")?;

        Ok(Self {
            client,
            backend_url,
        })
    }

    fn target(&self, uri: &Uri) -> Result<Url> {
        let path_and_query = uri.path_and_query().map_or(uri.path(), |pq| pq.as_str());
        self.backend_url
            .join(path_and_query)
            .with_context(|| format!("Invalid backend path: {path_and_query}"))
    }
}

#[instrument(skip(proxy, headers, body), fields(path = uri.path()))]
pub async fn forward(
    State(proxy): State<Arc<AuthProxy>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let target = match proxy.target(&uri) {
        Ok(target) => target,
        Err(err) => {
            error!("{err:#}");
            return bad_gateway();
        }
    };

    let mut request = proxy.client.request(method, target).body(body);
    for name in &FORWARDED_REQUEST_HEADERS {
        for value in headers.get_all(name) {
            request = request.header(name, value);
        }
    }

    let upstream = match request.send().await {
        Ok(upstream) => upstream,
        Err(err) => {
            error!("Auth backend request failed: {err}");
            return bad_gateway();
        }
    };

    let status = upstream.status();
    let mut response_headers = HeaderMap::new();
    for name in &RELAYED_RESPONSE_HEADERS {
        for value in upstream.headers().get_all(name) {
            response_headers.append(name, value.clone());
        }
    }

    match upstream.bytes().await {
        Ok(bytes) => (status, response_headers, bytes).into_response(),
        Err(err) => {
            error!("Failed to read auth backend response: {err}");
            bad_gateway()
        }
    }
}

fn bad_gateway() -> Response {
    (
        StatusCode::BAD_GATEWAY,
        Json(json!({"message": "Authentication service unavailable"})),
    )
        .into_response()
}

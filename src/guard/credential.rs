//! Session credential extraction from request headers.

use axum::http::{
    HeaderMap,
    header::{AUTHORIZATION, COOKIE},
};
use std::fmt;
use thiserror::Error;

/// Default name of the session cookie set by the auth backend.
pub const DEFAULT_SESSION_COOKIE: &str = "auth_token";

/// Opaque proof of authentication. Only its presence matters to the guard.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionCredential(String);

impl SessionCredential {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl fmt::Debug for SessionCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionCredential(***)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialError {
    #[error("{0} header is not valid ASCII")]
    InvalidHeader(&'static str),
    #[error("empty session token")]
    Empty,
}

/// Token extraction seam. Errors are treated as "no credential" by the guard.
pub trait CredentialResolver: Send + Sync {
    /// # Errors
    /// Returns an error when a credential is present but unreadable.
    fn resolve(&self, headers: &HeaderMap) -> Result<Option<SessionCredential>, CredentialError>;
}

/// Reads a bearer token first, then the session cookie.
#[derive(Debug, Clone)]
pub struct CookieCredentialResolver {
    cookie_name: String,
}

impl CookieCredentialResolver {
    #[must_use]
    pub fn new(cookie_name: impl Into<String>) -> Self {
        Self {
            cookie_name: cookie_name.into(),
        }
    }
}

impl Default for CookieCredentialResolver {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_COOKIE)
    }
}

impl CredentialResolver for CookieCredentialResolver {
    fn resolve(&self, headers: &HeaderMap) -> Result<Option<SessionCredential>, CredentialError> {
        if let Some(token) = bearer_token(headers)? {
            return Ok(Some(token));
        }

        for header in headers.get_all(COOKIE) {
            let value = header
                .to_str()
                .map_err(|_| CredentialError::InvalidHeader("Cookie"))?;
            for pair in value.split(';') {
                let Some((key, val)) = pair.trim().split_once('=') else {
                    continue;
                };
                if key.trim() == self.cookie_name {
                    let val = val.trim();
                    if val.is_empty() {
                        return Err(CredentialError::Empty);
                    }
                    return Ok(Some(SessionCredential::new(val)));
                }
            }
        }

        Ok(None)
    }
}

/// Other `Authorization` schemes are ignored rather than rejected.
fn bearer_token(headers: &HeaderMap) -> Result<Option<SessionCredential>, CredentialError> {
    let Some(header) = headers.get(AUTHORIZATION) else {
        return Ok(None);
    };
    let value = header
        .to_str()
        .map_err(|_| CredentialError::InvalidHeader("Authorization"))?;
    let trimmed = value.trim();
    let (scheme, token) = trimmed.split_once(' ').unwrap_or((trimmed, ""));
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Ok(None);
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(CredentialError::Empty);
    }
    Ok(Some(SessionCredential::new(token)))
}

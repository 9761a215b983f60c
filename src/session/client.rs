//! Client for the `/api/auth/*` endpoints. Requests share one cookie jar so the
//! session cookie set by sign-in is replayed on later calls, like a browser tab.

use super::{
    error::AuthError,
    types::{MessageResponse, ResetPasswordRequest, SignInRequest, SignUpRequest, UserProfile},
};
use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::SecretString;
use serde::{Serialize, de::DeserializeOwned};
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

/// Default request timeout applied by [`HttpAuthApi`].
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Remote authority behind the session store.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// `GET /api/auth/me`. Any non-success status is an error.
    async fn me(&self) -> Result<UserProfile, AuthError>;

    async fn sign_in(&self, email: &str, password: &SecretString)
    -> Result<UserProfile, AuthError>;

    async fn sign_up(
        &self,
        email: &str,
        password: &SecretString,
        full_name: &str,
    ) -> Result<UserProfile, AuthError>;

    async fn sign_out(&self) -> Result<(), AuthError>;

    /// Returns the backend's confirmation message, if it sent one.
    async fn reset_password(&self, email: &str) -> Result<Option<String>, AuthError>;
}

#[derive(Debug, Clone)]
pub struct HttpAuthApi {
    client: Client,
    base_url: Url,
}

impl HttpAuthApi {
    /// Build a client against `base_url` with the default timeout.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: Url) -> Result<Self, AuthError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_timeout(base_url: Url, timeout: Duration) -> Result<Self, AuthError> {
        let client = Client::builder()
            .user_agent(crate::APP_USER_AGENT)
            .cookie_store(true)
            .timeout(timeout)
            .build()
            .map_err(|err| AuthError::Transport(err.to_string()))?;

        Ok(Self { client, base_url })
    }

    fn endpoint(&self, path: &str) -> Result<Url, AuthError> {
        self.base_url
            .join(path)
            .map_err(|err| AuthError::Transport(format!("invalid endpoint {path}: {err}")))
    }

    async fn post<B: Serialize + Sync>(&self, path: &str, body: &B) -> Result<Response, AuthError> {
        let url = self.endpoint(path)?;
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(map_request_error)?;
        check_status(response).await
    }
}

#[async_trait]
impl AuthApi for HttpAuthApi {
    #[instrument(skip(self))]
    async fn me(&self) -> Result<UserProfile, AuthError> {
        let url = self.endpoint("/api/auth/me")?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_request_error)?;
        json_body(check_status(response).await?).await
    }

    #[instrument(skip(self, email, password))]
    async fn sign_in(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<UserProfile, AuthError> {
        let request = SignInRequest { email, password };
        json_body(self.post("/api/auth/signin", &request).await?).await
    }

    #[instrument(skip(self, email, password, full_name))]
    async fn sign_up(
        &self,
        email: &str,
        password: &SecretString,
        full_name: &str,
    ) -> Result<UserProfile, AuthError> {
        let request = SignUpRequest {
            email,
            password,
            full_name,
        };
        json_body(self.post("/api/auth/signup", &request).await?).await
    }

    #[instrument(skip(self))]
    async fn sign_out(&self) -> Result<(), AuthError> {
        let url = self.endpoint("/api/auth/signout")?;
        let response = self
            .client
            .post(url)
            .send()
            .await
            .map_err(map_request_error)?;
        check_status(response).await.map(|_| ())
    }

    #[instrument(skip(self, email))]
    async fn reset_password(&self, email: &str) -> Result<Option<String>, AuthError> {
        let response = self
            .post("/api/auth/reset-password", &ResetPasswordRequest { email })
            .await?;
        // The body is informational only; an empty or non-JSON 200 is still success.
        let body = response.text().await.unwrap_or_default();
        Ok(serde_json::from_str::<MessageResponse>(&body)
            .unwrap_or_default()
            .message)
    }
}

fn map_request_error(err: reqwest::Error) -> AuthError {
    if err.is_timeout() {
        AuthError::Transport("Request timed out. Please try again.".to_string())
    } else {
        AuthError::Transport(err.to_string())
    }
}

/// Pass success responses through and turn everything else into [`AuthError::Backend`].
async fn check_status(response: Response) -> Result<Response, AuthError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    debug!("auth backend answered {}", status);
    let body = response.text().await.unwrap_or_default();
    Err(AuthError::from_body(status.as_u16(), &body))
}

async fn json_body<T: DeserializeOwned>(response: Response) -> Result<T, AuthError> {
    response
        .json::<T>()
        .await
        .map_err(|err| AuthError::Decode(err.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn profile_json() -> serde_json::Value {
        json!({
            "id": "u1",
            "email": "a@b.com",
            "fullName": "A B",
            "subscription": {"status": "active", "plan": "premium", "expiresAt": null}
        })
    }

    fn api(server: &MockServer) -> HttpAuthApi {
        HttpAuthApi::new(Url::parse(&server.uri()).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn sign_in_posts_credentials_and_replays_session_cookie() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/auth/signin"))
            .and(body_json(json!({"email": "a@b.com", "password": "secret"})))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("set-cookie", "auth_token=abc; Path=/")
                    .set_body_json(profile_json()),
            )
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/auth/me"))
            .and(header("cookie", "auth_token=abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(profile_json()))
            .mount(&server)
            .await;

        let api = api(&server);
        let profile = api
            .sign_in("a@b.com", &SecretString::from("secret"))
            .await
            .unwrap();
        assert_eq!(profile.id, "u1");

        let me = api.me().await.unwrap();
        assert_eq!(me, profile);
    }

    #[tokio::test]
    async fn me_unauthorized_is_backend_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/auth/me"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "Could not validate credentials"})))
            .mount(&server)
            .await;

        let err = api(&server).me().await.unwrap_err();
        assert_eq!(
            err,
            AuthError::Backend {
                status: 401,
                message: "Could not validate credentials".to_string()
            }
        );
    }

    #[tokio::test]
    async fn reset_password_returns_backend_message() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/auth/reset-password"))
            .and(body_json(json!({"email": "a@b.com"})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"message": "Check your inbox"})),
            )
            .mount(&server)
            .await;

        let message = api(&server).reset_password("a@b.com").await.unwrap();
        assert_eq!(message.as_deref(), Some("Check your inbox"));
    }

    #[tokio::test]
    async fn unreachable_backend_is_transport_error() {
        // Nothing listens on port 9 (discard) in the test environment.
        let api = HttpAuthApi::with_timeout(
            Url::parse("http://127.0.0.1:9").unwrap(),
            Duration::from_millis(500),
        )
        .unwrap();

        assert!(matches!(api.sign_out().await, Err(AuthError::Transport(_))));
    }

    #[tokio::test]
    async fn malformed_profile_is_decode_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/auth/me"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        assert!(matches!(api(&server).me().await, Err(AuthError::Decode(_))));
    }
}

/// Client-Side Session Pipeline
///
/// Holds the current token pair, attaches the access token to outbound
/// requests, and performs exactly one refresh-then-retry cycle when a
/// request comes back unauthorized. A second unauthorized response after
/// the retry propagates untouched, so the pipeline can never loop.
///
/// Requests that target the auth endpoints themselves (login, register,
/// refresh) are sent without a token and never trigger recovery.
///
/// Concurrent requests that fail at the same time will each attempt their
/// own refresh; there is no shared in-flight refresh guard.

use std::fmt;
use std::sync::RwLock;

use reqwest::{Method, StatusCode};
use serde::Deserialize;

use crate::auth::{peek_expiry, TokenPair};
use crate::client::storage::{Session, SessionStorage};
use crate::users::AuthUser;

/// Single error shape for every client-side failure. Network failures and
/// server-reported failures differ only in message content.
#[derive(Debug)]
pub struct ClientError {
    pub message: String,
}

impl ClientError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ClientError {}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        Self::new(format!("Network error: {}", err))
    }
}

#[derive(Deserialize)]
struct AuthResponseBody {
    user: AuthUser,
    tokens: TokenPair,
}

#[derive(Deserialize)]
struct RefreshResponseBody {
    tokens: TokenPair,
}

pub struct SessionClient {
    http: reqwest::Client,
    base_url: String,
    storage: SessionStorage,
    session: RwLock<Option<Session>>,
}

impl SessionClient {
    /// Create a client for the given server, restoring any persisted
    /// session from storage.
    pub fn new(base_url: impl Into<String>, storage: SessionStorage) -> Self {
        let session = storage.load();
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            storage,
            session: RwLock::new(session),
        }
    }

    pub fn current_user(&self) -> Option<AuthUser> {
        self.session
            .read()
            .ok()
            .and_then(|s| s.as_ref().map(|s| s.user.clone()))
    }

    fn access_token(&self) -> Option<String> {
        self.session
            .read()
            .ok()
            .and_then(|s| s.as_ref().map(|s| s.access_token.clone()))
    }

    fn refresh_token(&self) -> Option<String> {
        self.session
            .read()
            .ok()
            .and_then(|s| s.as_ref().map(|s| s.refresh_token.clone()))
    }

    /// Advisory check: does the held access token claim to be unexpired?
    ///
    /// Decodes the expiry without verifying the signature. Useful for
    /// navigation-guard decisions; the authoritative check is always the
    /// server's verification.
    pub fn has_live_access_token(&self) -> bool {
        match self.access_token().as_deref().and_then(peek_expiry) {
            Some(exp) => exp > chrono::Utc::now().timestamp(),
            None => false,
        }
    }

    /// Register a new account and start a session.
    pub async fn register(
        &self,
        email: &str,
        username: &str,
        password: &str,
    ) -> Result<AuthUser, ClientError> {
        let body = serde_json::json!({
            "email": email,
            "username": username,
            "password": password,
        });
        let response = self
            .request(Method::POST, "/api/auth/register", Some(body))
            .await?;
        self.start_session(response).await
    }

    /// Log in with an email or username and start a session.
    pub async fn login(&self, identifier: &str, password: &str) -> Result<AuthUser, ClientError> {
        let body = serde_json::json!({
            "emailOrUsername": identifier,
            "password": password,
        });
        let response = self
            .request(Method::POST, "/api/auth/login", Some(body))
            .await?;
        self.start_session(response).await
    }

    /// End the session. The server call is advisory; local state is
    /// cleared regardless of the network outcome.
    pub async fn logout(&self) {
        if self.access_token().is_some() {
            let _ = self
                .request(Method::POST, "/api/auth/logout", None)
                .await;
        }
        self.clear_session();
    }

    /// Issue a request through the session pipeline.
    ///
    /// Attaches the access token (unless the target is an auth endpoint),
    /// and on a 401 performs the single recovery cycle: refresh, then
    /// re-issue the original request once. A failed refresh clears the
    /// session and the original response is returned for the caller to
    /// inspect.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<reqwest::Response, ClientError> {
        let response = self.send_once(method.clone(), path, body.as_ref()).await?;

        if is_authorization_failure(response.status()) && !is_auth_endpoint(path) {
            if self.refresh().await.is_ok() {
                // Exactly one retry; whatever it returns is final.
                return self.send_once(method, path, body.as_ref()).await;
            }
            self.clear_session();
        }

        Ok(response)
    }

    pub async fn get(&self, path: &str) -> Result<reqwest::Response, ClientError> {
        self.request(Method::GET, path, None).await
    }

    /// Exchange the held refresh token for a new pair.
    pub async fn refresh(&self) -> Result<(), ClientError> {
        let refresh_token = self
            .refresh_token()
            .ok_or_else(|| ClientError::new("No refresh token available"))?;

        let body = serde_json::json!({ "refreshToken": refresh_token });
        let response = self
            .http
            .post(format!("{}/api/auth/refresh", self.base_url))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(server_error(response).await);
        }

        let parsed: RefreshResponseBody = response
            .json()
            .await
            .map_err(|e| ClientError::new(format!("Failed to parse response: {}", e)))?;

        self.store_tokens(parsed.tokens);
        Ok(())
    }

    async fn send_once(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<reqwest::Response, ClientError> {
        let mut request = self
            .http
            .request(method, format!("{}{}", self.base_url, path));

        if !is_auth_endpoint(path) {
            if let Some(token) = self.access_token() {
                request = request.bearer_auth(token);
            }
        }

        if let Some(body) = body {
            request = request.json(body);
        }

        Ok(request.send().await?)
    }

    async fn start_session(
        &self,
        response: reqwest::Response,
    ) -> Result<AuthUser, ClientError> {
        if !response.status().is_success() {
            return Err(server_error(response).await);
        }

        let parsed: AuthResponseBody = response
            .json()
            .await
            .map_err(|e| ClientError::new(format!("Failed to parse response: {}", e)))?;

        let session = Session {
            access_token: parsed.tokens.access_token,
            refresh_token: parsed.tokens.refresh_token,
            user: parsed.user.clone(),
        };
        self.storage.save(&session);
        if let Ok(mut current) = self.session.write() {
            *current = Some(session);
        }

        Ok(parsed.user)
    }

    fn store_tokens(&self, tokens: TokenPair) {
        if let Ok(mut current) = self.session.write() {
            if let Some(session) = current.as_mut() {
                session.access_token = tokens.access_token;
                session.refresh_token = tokens.refresh_token;
                self.storage.save(session);
            }
        }
    }

    fn clear_session(&self) {
        self.storage.clear();
        if let Ok(mut current) = self.session.write() {
            *current = None;
        }
    }
}

/// The server guard answers 401 for a missing token and 403 for one that
/// fails verification (including expiry); both start the recovery cycle.
fn is_authorization_failure(status: StatusCode) -> bool {
    status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN
}

/// Auth endpoints are excluded from token attachment and recovery so a
/// failing login or refresh can never trigger another refresh.
fn is_auth_endpoint(path: &str) -> bool {
    path.contains("/auth/login") || path.contains("/auth/register") || path.contains("/auth/refresh")
}

/// Extract the server's `{"error": ...}` message, falling back to the
/// status code.
async fn server_error(response: reqwest::Response) -> ClientError {
    let status = response.status();

    #[derive(Deserialize)]
    struct ErrorBody {
        error: String,
    }

    match response.json::<ErrorBody>().await {
        Ok(body) => ClientError::new(body.error),
        Err(_) => ClientError::new(format!("Request failed with status {}", status)),
    }
}

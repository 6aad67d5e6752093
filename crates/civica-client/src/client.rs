//! Main client implementation.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use tracing::debug;
use url::Url;

use crate::api::{CreditTitlesApi, PasswordApi, TaxpayersApi, TermsApi, UsersApi};
use crate::error::{Error, ErrorResponse, Result};

/// Default timeout for requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Environment variable naming the backend base URL.
pub const BASE_URL_ENV: &str = "CIVICA_API_BASE_URL";

/// Shared handle to the Authorization header value.
///
/// The session store arms this on login and disarms it on logout; every
/// request reads it at send time, so a forced logout takes effect on the
/// next call without rebuilding the client. When unarmed, requests are
/// sent unauthenticated (pre-login flows).
#[derive(Debug, Clone, Default)]
pub struct TokenHandle {
    value: Arc<RwLock<Option<HeaderValue>>>,
}

impl TokenHandle {
    /// Create an unarmed handle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the handle with a full Authorization value (e.g. `Bearer <token>`).
    ///
    /// The value is validated as an HTTP header value up front so a bad
    /// token fails here instead of at send time.
    pub fn set(&self, authorization: &str) -> Result<()> {
        let value = HeaderValue::from_str(authorization)
            .map_err(|_| Error::Config("Invalid authorization header value".to_string()))?;
        *self.value.write() = Some(value);
        Ok(())
    }

    /// Disarm the handle. Subsequent requests go out unauthenticated.
    pub fn clear(&self) {
        *self.value.write() = None;
    }

    /// Whether a token is currently armed.
    pub fn is_armed(&self) -> bool {
        self.value.read().is_some()
    }

    fn current(&self) -> Option<HeaderValue> {
        self.value.read().clone()
    }
}

/// CIVICA portal API client.
///
/// Provides typed access to the backend resource groups, attaching the
/// bearer token from its [`TokenHandle`] to every request.
///
/// # Example
///
/// ```no_run
/// use civica_client::PortalClient;
///
/// # async fn example() -> civica_client::Result<()> {
/// let client = PortalClient::builder()
///     .base_url("http://localhost:8080")
///     .build()?;
///
/// let titles = client.credit_titles().page(0).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct PortalClient {
    /// Inner shared state.
    inner: Arc<ClientInner>,
}

/// Inner client state (shared across clones).
pub(crate) struct ClientInner {
    /// HTTP client.
    pub(crate) http: reqwest::Client,
    /// Base URL for API requests.
    pub(crate) base_url: Url,
    /// Request timeout.
    pub(crate) timeout: Duration,
    /// Authorization header handle.
    pub(crate) token: TokenHandle,
}

impl PortalClient {
    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Get the shared token handle.
    pub fn token(&self) -> TokenHandle {
        self.inner.token.clone()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // API accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Access the users API.
    pub fn users(&self) -> UsersApi {
        UsersApi::new(self.clone())
    }

    /// Access the terms API.
    pub fn terms(&self) -> TermsApi {
        TermsApi::new(self.clone())
    }

    /// Access the taxpayers API.
    pub fn taxpayers(&self) -> TaxpayersApi {
        TaxpayersApi::new(self.clone())
    }

    /// Access the credit titles API.
    pub fn credit_titles(&self) -> CreditTitlesApi {
        CreditTitlesApi::new(self.clone())
    }

    /// Access the password reset API.
    pub fn password(&self) -> PasswordApi {
        PasswordApi::new(self.clone())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internal HTTP methods
    // ─────────────────────────────────────────────────────────────────────────

    /// Build a URL for an API path.
    pub(crate) fn url(&self, path: &str) -> Result<Url> {
        let path = path.trim_start_matches('/');
        self.inner
            .base_url
            .join(&format!("api/v1/{}", path))
            .map_err(Error::from)
    }

    /// Attach the Authorization header if a token is armed.
    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.inner.token.current() {
            Some(value) => request.header(AUTHORIZATION, value),
            None => request,
        }
    }

    /// Make a GET request.
    pub(crate) async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path)?;
        let request = self.authorize(self.inner.http.get(url));
        let response = request.timeout(self.inner.timeout).send().await?;
        self.handle_response(response).await
    }

    /// Make a POST request.
    pub(crate) async fn post<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
        B: serde::Serialize + ?Sized,
    {
        let url = self.url(path)?;
        let request = self.authorize(self.inner.http.post(url)).json(body);
        let response = request.timeout(self.inner.timeout).send().await?;
        self.handle_response(response).await
    }

    /// Make a POST request, discarding the response body.
    pub(crate) async fn post_unit<B>(&self, path: &str, body: &B) -> Result<()>
    where
        B: serde::Serialize + ?Sized,
    {
        let url = self.url(path)?;
        let request = self.authorize(self.inner.http.post(url)).json(body);
        let response = request.timeout(self.inner.timeout).send().await?;

        if !response.status().is_success() {
            return Err(self.extract_error(response).await);
        }

        Ok(())
    }

    /// Make a PUT request.
    pub(crate) async fn put<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
        B: serde::Serialize + ?Sized,
    {
        let url = self.url(path)?;
        let request = self.authorize(self.inner.http.put(url)).json(body);
        let response = request.timeout(self.inner.timeout).send().await?;
        self.handle_response(response).await
    }

    /// Make a DELETE request.
    pub(crate) async fn delete(&self, path: &str) -> Result<()> {
        let url = self.url(path)?;
        let request = self.authorize(self.inner.http.delete(url));
        let response = request.timeout(self.inner.timeout).send().await?;

        if !response.status().is_success() {
            return Err(self.extract_error(response).await);
        }

        Ok(())
    }

    /// Handle a response, extracting the body or error.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            Err(self.extract_error(response).await)
        }
    }

    /// Extract an error from a failed response.
    ///
    /// 400 bodies carrying a field→message map become [`Error::Validation`];
    /// 401 and 403 get their own variants so callers can distinguish a
    /// session-invalidation signal from a permission failure. Everything
    /// else lands in [`Error::Api`] with the structured payload's message.
    async fn extract_error(&self, response: reqwest::Response) -> Error {
        let status = response.status().as_u16();
        let body = response.json::<serde_json::Value>().await.ok();

        debug!(status = status, "Request failed");

        if status == 400 {
            if let Some(value) = body.clone() {
                if let Ok(fields) = serde_json::from_value::<HashMap<String, String>>(value) {
                    return Error::Validation { fields };
                }
            }
        }

        let message = body
            .and_then(|value| serde_json::from_value::<ErrorResponse>(value).ok())
            .map(|err| err.message)
            .filter(|msg| !msg.is_empty())
            .unwrap_or_else(|| format!("HTTP {}", status));

        match status {
            401 => Error::Unauthorized { message },
            403 => Error::Forbidden { message },
            _ => Error::Api { status, message },
        }
    }
}

/// Builder for creating a [`PortalClient`].
#[derive(Debug)]
pub struct ClientBuilder {
    base_url: Option<String>,
    timeout: Duration,
    user_agent: Option<String>,
    token: TokenHandle,
}

impl ClientBuilder {
    /// Create a new builder with defaults.
    pub fn new() -> Self {
        Self {
            base_url: None,
            timeout: DEFAULT_TIMEOUT,
            user_agent: None,
            token: TokenHandle::new(),
        }
    }

    /// Create a builder with the base URL taken from `CIVICA_API_BASE_URL`.
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var(BASE_URL_ENV)
            .map_err(|_| Error::Config(format!("{} is not set", BASE_URL_ENV)))?;
        Ok(Self::new().base_url(base_url))
    }

    /// Set the base URL for the backend.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set a custom user agent.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Use an existing token handle instead of a fresh unarmed one.
    pub fn token_handle(mut self, token: TokenHandle) -> Self {
        self.token = token;
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<PortalClient> {
        let base_url = self
            .base_url
            .ok_or_else(|| Error::Config("base_url is required".to_string()))?;

        // Parse and normalize base URL
        let mut base_url = Url::parse(&base_url)?;
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let user_agent = self
            .user_agent
            .unwrap_or_else(|| format!("civica-client/{}", env!("CARGO_PKG_VERSION")));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(user_agent)
            .build()?;

        Ok(PortalClient {
            inner: Arc::new(ClientInner {
                http,
                base_url,
                timeout: self.timeout,
                token: self.token,
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_requires_base_url() {
        let result = ClientBuilder::new().build();
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_normalizes_trailing_slash() {
        let client = ClientBuilder::new()
            .base_url("http://localhost:8080")
            .build()
            .unwrap();

        assert_eq!(client.base_url().as_str(), "http://localhost:8080/");
    }

    #[test]
    fn test_url_building() {
        let client = ClientBuilder::new()
            .base_url("http://localhost:8080")
            .build()
            .unwrap();

        let url = client.url("users/page/0").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/api/v1/users/page/0");

        let url = client.url("/terms/latest").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/api/v1/terms/latest");
    }

    #[test]
    fn test_token_handle_arm_disarm() {
        let handle = TokenHandle::new();
        assert!(!handle.is_armed());

        handle.set("Bearer abc.def.ghi").unwrap();
        assert!(handle.is_armed());

        handle.clear();
        assert!(!handle.is_armed());
    }

    #[test]
    fn test_token_handle_rejects_invalid_header() {
        let handle = TokenHandle::new();
        assert!(handle.set("Bearer bad\nvalue").is_err());
        assert!(!handle.is_armed());
    }

    #[test]
    fn test_token_handle_shared_across_clones() {
        let handle = TokenHandle::new();
        let clone = handle.clone();

        handle.set("Bearer tok").unwrap();
        assert!(clone.is_armed());

        clone.clear();
        assert!(!handle.is_armed());
    }
}

//! Digi REST API client.
//!
//! # Architecture
//!
//! - `reqwest` with a cookie store: the backend keeps its session in a cookie
//! - Every endpoint answers with an [`Envelope`]
//! - A CSRF token fetched once at startup is attached to every later request
//!   as [`CSRF_HEADER`]
//! - A response interceptor hands untagged 401s to the installed
//!   [`UnauthorizedHandler`]; requests tagged with [`RequestOptions::retry`]
//!   are never intercepted
//!
//! # Example
//!
//! ```rust,ignore
//! use digi_storefront::api::ApiClient;
//!
//! let client = ApiClient::new(&config)?;
//! client.fetch_csrf_token().await?;
//!
//! let orders = client.orders().list(None).await?.into_result()?;
//! ```

mod envelope;
mod error;
pub mod orders;
pub mod products;
pub mod types;
pub mod users;

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use reqwest::header::HeaderValue;
use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument, warn};
use url::Url;

use crate::config::StorefrontConfig;

pub use envelope::{Accepted, ApiMessage, Envelope};
pub use error::ApiError;
pub use orders::Orders;
pub use products::Products;
pub use users::Users;

/// Result of an endpoint wrapper: the accepted envelope or the failure.
pub type ApiResult<T> = Result<Accepted<T>, ApiError>;

/// Header carrying the CSRF token on every request after bootstrap.
pub const CSRF_HEADER: &str = "X-CSRF-TOKEN";

/// Boxed future returned by [`UnauthorizedHandler`].
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Reacts to an authorization failure reported by the API.
///
/// The handler receives the client so it can issue its own calls; those
/// calls must be tagged with [`RequestOptions::retry`].
pub trait UnauthorizedHandler: Send + Sync {
    /// Run the recovery. `Ok` means the 401 was absorbed.
    fn on_unauthorized<'a>(&'a self, client: &'a ApiClient) -> BoxFuture<'a, Result<(), ApiError>>;
}

/// Per-request flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// The request is itself part of a recovery; a 401 on it is returned
    /// as-is instead of triggering another recovery.
    pub retry: bool,
}

impl RequestOptions {
    /// Options for a request issued by the recovery sequence.
    #[must_use]
    pub const fn retry() -> Self {
        Self { retry: true }
    }
}

/// Request payload.
#[derive(Debug, Default)]
pub enum Body {
    #[default]
    Empty,
    Json(serde_json::Value),
    Multipart(reqwest::multipart::Form),
}

impl Body {
    /// Encode a serializable value as a JSON body.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Encode` if serialization fails.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, ApiError> {
        Ok(Self::Json(serde_json::to_value(value)?))
    }
}

/// Error body of a non-success response.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: ApiMessage,
}

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the Digi REST API.
///
/// Cheap to clone; clones share the HTTP connection pool, cookie store,
/// CSRF token and unauthorized handler.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    http: reqwest::Client,
    base_url: Url,
    csrf_token: RwLock<Option<SecretString>>,
    unauthorized: OnceLock<Arc<dyn UnauthorizedHandler>>,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: &StorefrontConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .cookie_store(true)
            .build()?;

        // Url::join replaces the last path segment unless the base ends in '/'
        let mut base_url = config.api_base_url.clone();
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                http,
                base_url,
                csrf_token: RwLock::new(None),
                unauthorized: OnceLock::new(),
            }),
        })
    }

    /// Install the unauthorized handler.
    ///
    /// The handler can only be installed once per client; returns `false`
    /// (and keeps the existing handler) on later calls.
    pub fn install_unauthorized_handler(&self, handler: Arc<dyn UnauthorizedHandler>) -> bool {
        let installed = self.inner.unauthorized.set(handler).is_ok();
        if !installed {
            warn!("Unauthorized handler already installed; ignoring");
        }
        installed
    }

    /// Base URL all paths are resolved against (always ends in `/`).
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Resolve an API path such as `users/login` or `/orders`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidUrl` if the path cannot be joined.
    pub fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.inner.base_url.join(path.trim_start_matches('/'))?)
    }

    /// Resolve an API path with query parameters.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidUrl` if the path cannot be joined.
    pub fn endpoint_with_query<'q>(
        &self,
        path: &str,
        query: impl IntoIterator<Item = (&'q str, &'q str)>,
    ) -> Result<Url, ApiError> {
        let mut url = self.endpoint(path)?;
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        // An empty query leaves a dangling '?'
        if url.query() == Some("") {
            url.set_query(None);
        }
        Ok(url)
    }

    /// Whether a CSRF token has been fetched.
    #[must_use]
    pub fn has_csrf_token(&self) -> bool {
        self.inner
            .csrf_token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Fetch the CSRF token and attach it to all subsequent requests.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response has no token.
    #[instrument(skip(self))]
    pub async fn fetch_csrf_token(&self) -> Result<(), ApiError> {
        let url = self.endpoint("csrf-token")?;
        let envelope: Envelope<String> = self
            .request(Method::GET, url, Body::Empty, RequestOptions::default())
            .await?;

        let token = envelope
            .result
            .filter(|token| !token.is_empty())
            .ok_or(ApiError::MissingCsrfToken)?;

        *self
            .inner
            .csrf_token
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(SecretString::from(token));
        debug!("CSRF token installed");
        Ok(())
    }

    // =========================================================================
    // Endpoint groups
    // =========================================================================

    /// User account endpoints.
    #[must_use]
    pub const fn users(&self) -> Users<'_> {
        Users::new(self)
    }

    /// Order endpoints.
    #[must_use]
    pub const fn orders(&self) -> Orders<'_> {
        Orders::new(self)
    }

    /// Product catalog endpoints.
    #[must_use]
    pub const fn products(&self) -> Products<'_> {
        Products::new(self)
    }

    // =========================================================================
    // Request execution
    // =========================================================================

    /// Send a request and decode its envelope, intercepting 401s.
    ///
    /// An untagged request answered with 401 runs the unauthorized handler
    /// once. If the handler succeeds the caller gets
    /// [`ApiError::SessionExpired`]; if it fails the caller gets the original
    /// [`ApiError::Unauthorized`].
    ///
    /// # Errors
    ///
    /// Returns an error for transport failures, non-success statuses and
    /// bodies that are not an envelope of `T`.
    #[instrument(skip(self, body), fields(method = %method, path = %url.path(), retry = options.retry))]
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: Body,
        options: RequestOptions,
    ) -> Result<Envelope<T>, ApiError> {
        let result = self.execute(method, url, body).await;

        match result {
            Err(original @ ApiError::Unauthorized { .. }) if !options.retry => {
                let Some(handler) = self.inner.unauthorized.get().cloned() else {
                    return Err(original);
                };

                warn!("Received 401, running recovery");
                match handler.on_unauthorized(self).await {
                    Ok(()) => Err(ApiError::SessionExpired),
                    Err(e) => {
                        error!(error = %e, "Recovery after 401 failed");
                        Err(original)
                    }
                }
            }
            other => other,
        }
    }

    /// Send a request and decode its envelope without interception.
    async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: Body,
    ) -> Result<Envelope<T>, ApiError> {
        let mut builder = self.inner.http.request(method, url);

        if let Some(token) = self.csrf_header() {
            builder = builder.header(CSRF_HEADER, token);
        }

        builder = match body {
            Body::Empty => builder,
            Body::Json(value) => builder.json(&value),
            Body::Multipart(form) => builder.multipart(form),
        };

        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let messages = serde_json::from_str::<ErrorBody>(&text)
                .map(|body| body.message.into_vec())
                .unwrap_or_default();

            debug!(status = %status, messages = ?messages, "API returned non-success status");

            return Err(if status == StatusCode::UNAUTHORIZED {
                ApiError::Unauthorized { messages }
            } else {
                ApiError::Http {
                    status: status.as_u16(),
                    messages,
                }
            });
        }

        serde_json::from_str(&text).map_err(|e| {
            error!(
                error = %e,
                body = %text.chars().take(500).collect::<String>(),
                "Failed to parse API response"
            );
            ApiError::Decode(e.to_string())
        })
    }

    fn csrf_header(&self) -> Option<HeaderValue> {
        let guard = self
            .inner
            .csrf_token
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let token = guard.as_ref()?;

        match HeaderValue::from_str(token.expose_secret()) {
            Ok(mut value) => {
                value.set_sensitive(true);
                Some(value)
            }
            Err(e) => {
                warn!(error = %e, "CSRF token is not a valid header value; not sending it");
                None
            }
        }
    }

    /// GET `path` with default options.
    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<Envelope<T>, ApiError> {
        let url = self.endpoint(path)?;
        self.request(Method::GET, url, Body::Empty, RequestOptions::default())
            .await
    }

    /// Send `body` to `path` with default options.
    pub(crate) async fn send_to<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Body,
    ) -> Result<Envelope<T>, ApiError> {
        let url = self.endpoint(path)?;
        self.request(method, url, body, RequestOptions::default())
            .await
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("csrf_token", &self.has_csrf_token().then_some("[REDACTED]"))
            .field("unauthorized_handler", &self.inner.unauthorized.get().is_some())
            .finish()
    }
}

/// Percent-encode a value used as a single path segment.
pub(crate) fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;

    use super::*;

    fn client_for(base: &str) -> ApiClient {
        ApiClient::new(&StorefrontConfig::new(Url::parse(base).unwrap())).unwrap()
    }

    struct CountingHandler {
        calls: AtomicUsize,
        succeed: bool,
    }

    impl UnauthorizedHandler for CountingHandler {
        fn on_unauthorized<'a>(
            &'a self,
            _client: &'a ApiClient,
        ) -> BoxFuture<'a, Result<(), ApiError>> {
            Box::pin(async move {
                self.calls.fetch_add(1, Ordering::SeqCst);
                if self.succeed {
                    Ok(())
                } else {
                    Err(ApiError::MissingResult)
                }
            })
        }
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let client = client_for("http://localhost:3100/api/v1");
        assert_eq!(
            client.endpoint("/users/login").unwrap().as_str(),
            "http://localhost:3100/api/v1/users/login"
        );
        assert_eq!(
            client.endpoint("orders").unwrap().as_str(),
            "http://localhost:3100/api/v1/orders"
        );
    }

    #[test]
    fn test_endpoint_with_query() {
        let client = client_for("http://localhost:3100/api/v1/");
        let url = client
            .endpoint_with_query("orders", [("status", "pending")])
            .unwrap();
        assert_eq!(url.as_str(), "http://localhost:3100/api/v1/orders?status=pending");

        let url = client.endpoint_with_query("orders", []).unwrap();
        assert_eq!(url.as_str(), "http://localhost:3100/api/v1/orders");
    }

    #[test]
    fn test_segment_encoding() {
        assert_eq!(segment("a@b.com"), "a%40b.com");
    }

    #[tokio::test]
    async fn test_csrf_token_is_attached_after_bootstrap() {
        let mut server = mockito::Server::new_async().await;
        let csrf = server
            .mock("GET", "/csrf-token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"success":true,"message":"","result":"tok-123"}"#)
            .create_async()
            .await;
        let orders = server
            .mock("GET", "/orders")
            .match_header(CSRF_HEADER, "tok-123")
            .with_status(200)
            .with_body(r#"{"success":true,"message":"ok","result":[]}"#)
            .create_async()
            .await;

        let client = client_for(&server.url());
        assert!(!client.has_csrf_token());
        client.fetch_csrf_token().await.unwrap();
        assert!(client.has_csrf_token());

        let envelope: Envelope<Vec<serde_json::Value>> = client.get("orders").await.unwrap();
        assert!(envelope.success);

        csrf.assert_async().await;
        orders.assert_async().await;
    }

    #[tokio::test]
    async fn test_missing_csrf_token() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/csrf-token")
            .with_status(200)
            .with_body(r#"{"success":true,"message":"","result":""}"#)
            .create_async()
            .await;

        let client = client_for(&server.url());
        let err = client.fetch_csrf_token().await.unwrap_err();
        assert!(matches!(err, ApiError::MissingCsrfToken));
        assert!(!client.has_csrf_token());
    }

    #[tokio::test]
    async fn test_error_body_messages_are_extracted() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/users")
            .with_status(400)
            .with_body(r#"{"success":false,"message":["email must be an email"]}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/orders")
            .with_status(503)
            .with_body("upstream down")
            .create_async()
            .await;

        let client = client_for(&server.url());

        let err = client
            .send_to::<serde_json::Value>(Method::POST, "users", Body::json(&json!({})).unwrap())
            .await
            .unwrap_err();
        assert_eq!(err.messages(), vec!["email must be an email".to_string()]);

        let err = client.get::<serde_json::Value>("orders").await.unwrap_err();
        assert!(matches!(err, ApiError::Http { status: 503, .. }));
        assert_eq!(
            err.messages(),
            vec!["Request failed with status code 503".to_string()]
        );
    }

    #[tokio::test]
    async fn test_401_runs_handler_once_and_reports_session_expired() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/orders")
            .with_status(401)
            .with_body(r#"{"success":false,"message":"Unauthorized"}"#)
            .create_async()
            .await;

        let client = client_for(&server.url());
        let handler = Arc::new(CountingHandler {
            calls: AtomicUsize::new(0),
            succeed: true,
        });
        assert!(client.install_unauthorized_handler(handler.clone()));
        assert!(!client.install_unauthorized_handler(handler.clone()));

        let err = client.get::<serde_json::Value>("orders").await.unwrap_err();
        assert!(matches!(err, ApiError::SessionExpired));
        assert_eq!(handler.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_recovery_returns_original_401() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/orders")
            .with_status(401)
            .with_body(r#"{"success":false,"message":"Token expired"}"#)
            .create_async()
            .await;

        let client = client_for(&server.url());
        let handler = Arc::new(CountingHandler {
            calls: AtomicUsize::new(0),
            succeed: false,
        });
        client.install_unauthorized_handler(handler.clone());

        let err = client.get::<serde_json::Value>("orders").await.unwrap_err();
        assert!(
            matches!(err, ApiError::Unauthorized { ref messages } if messages == &["Token expired"])
        );
        assert_eq!(handler.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_tagged_request_skips_handler() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("PUT", "/users/logout")
            .with_status(401)
            .with_body(r#"{"success":false,"message":"Unauthorized"}"#)
            .create_async()
            .await;

        let client = client_for(&server.url());
        let handler = Arc::new(CountingHandler {
            calls: AtomicUsize::new(0),
            succeed: true,
        });
        client.install_unauthorized_handler(handler.clone());

        let url = client.endpoint("users/logout").unwrap();
        let err = client
            .request::<serde_json::Value>(Method::PUT, url, Body::Empty, RequestOptions::retry())
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Unauthorized { .. }));
        assert_eq!(handler.calls.load(Ordering::SeqCst), 0);
    }
}

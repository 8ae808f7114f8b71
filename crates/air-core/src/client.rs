//! HTTP transport shared by the Air API clients.
//!
//! [`HttpClient`] owns the bearer token, the connect/read timeout pair and the
//! pagination page size. Clones share that state, so re-authenticating through one
//! handle is visible to every entity created from it.

use crate::config::AirClientConfig;
use crate::error::DEFAULT_AUTHORIZATION_MESSAGE;
use crate::response::HttpResponse;
use crate::util::redact_payload;
use crate::{Error, Result};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{redirect, Client, ClientBuilder, Method};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tracing::{debug, info, warn};

const USER_AGENT: &str = concat!("air-sdk/", env!("CARGO_PKG_VERSION"));

/// Maximum number of redirects followed for one request.
pub const MAX_REDIRECTS: usize = 10;

/// Body attached to an outgoing request.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// No body
    Empty,
    /// JSON document
    Json(Value),
    /// Raw bytes (image uploads)
    Bytes(Vec<u8>),
}

/// Connect and read timeouts applied to every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// Time allowed to establish a connection
    pub connect: Duration,
    /// Time allowed for the whole response to arrive
    pub read: Duration,
}

struct Inner {
    http: RwLock<Client>,
    timeouts: RwLock<Timeouts>,
    page_size: AtomicU32,
    token: RwLock<Option<SecretString>>,
    allowed_hosts: Arc<Vec<String>>,
    tls_verify: bool,
}

/// Shared HTTP session for the Air API.
#[derive(Clone)]
pub struct HttpClient {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("timeouts", &self.timeouts())
            .field("page_size", &self.page_size())
            .field("authenticated", &self.is_authenticated())
            .finish_non_exhaustive()
    }
}

fn build_http(
    connect_timeout: Duration,
    tls_verify: bool,
    allowed_hosts: &Arc<Vec<String>>,
) -> Result<Client> {
    let hosts = Arc::clone(allowed_hosts);
    let policy = redirect::Policy::custom(move |attempt| {
        if attempt.previous().len() >= MAX_REDIRECTS {
            return attempt.error("too many redirects");
        }
        let target = attempt.url().host_str().unwrap_or_default().to_string();
        let same_host = attempt
            .previous()
            .first()
            .and_then(|url| url.host_str())
            .is_some_and(|origin| origin == target);
        if same_host || hosts.iter().any(|host| *host == target) {
            attempt.follow()
        } else {
            attempt.stop()
        }
    });

    if !tls_verify {
        warn!("TLS certificate verification is disabled");
    }

    ClientBuilder::new()
        .user_agent(USER_AGENT)
        .connect_timeout(connect_timeout)
        .redirect(policy)
        .danger_accept_invalid_certs(!tls_verify)
        .build()
        .map_err(|e| Error::Config(format!("Failed to build HTTP client: {e}")))
}

impl HttpClient {
    /// Create a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &AirClientConfig) -> Result<Self> {
        let allowed_hosts = Arc::new(config.allowed_hosts.clone());
        let http = build_http(config.connect_timeout(), config.tls_verify, &allowed_hosts)?;
        Ok(Self {
            inner: Arc::new(Inner {
                http: RwLock::new(http),
                timeouts: RwLock::new(Timeouts {
                    connect: config.connect_timeout(),
                    read: config.read_timeout(),
                }),
                page_size: AtomicU32::new(config.page_size),
                token: RwLock::new(None),
                allowed_hosts,
                tls_verify: config.tls_verify,
            }),
        })
    }

    /// Current timeouts.
    #[must_use]
    pub fn timeouts(&self) -> Timeouts {
        *self
            .inner
            .timeouts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Change the connect timeout. The underlying connection pool is rebuilt.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be rebuilt.
    pub fn set_connect_timeout(&self, timeout: Duration) -> Result<()> {
        let http = build_http(timeout, self.inner.tls_verify, &self.inner.allowed_hosts)?;
        *self
            .inner
            .http
            .write()
            .unwrap_or_else(PoisonError::into_inner) = http;
        self.inner
            .timeouts
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .connect = timeout;
        Ok(())
    }

    /// Change the read timeout.
    pub fn set_read_timeout(&self, timeout: Duration) {
        self.inner
            .timeouts
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .read = timeout;
    }

    /// Page size used by paginated list requests.
    #[must_use]
    pub fn page_size(&self) -> u32 {
        self.inner.page_size.load(Ordering::Relaxed)
    }

    /// Change the pagination page size.
    ///
    /// # Errors
    ///
    /// Returns an error unless `size` is a positive integer.
    pub fn set_page_size(&self, size: i64) -> Result<()> {
        let size = u32::try_from(size)
            .ok()
            .filter(|size| *size > 0)
            .ok_or_else(|| {
                Error::Air("Pagination page size must be a positive integer.".to_string())
            })?;
        self.inner.page_size.store(size, Ordering::Relaxed);
        Ok(())
    }

    /// Install the bearer token attached to subsequent requests.
    pub fn set_bearer_token(&self, token: SecretString) {
        *self
            .inner
            .token
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(token);
    }

    /// Forget the bearer token.
    pub fn clear_bearer_token(&self) {
        *self
            .inner
            .token
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Returns true if a bearer token is installed.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.inner
            .token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn authorization(&self) -> Option<String> {
        self.inner
            .token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|token| format!("Bearer {}", token.expose_secret()))
    }

    fn http(&self) -> Client {
        self.inner
            .http
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Send a request and buffer the response.
    ///
    /// Any status code is returned as a response; callers decide which codes are
    /// acceptable.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails at the transport level.
    pub async fn send(
        &self,
        method: Method,
        url: &str,
        query: &[(String, String)],
        body: RequestBody,
    ) -> Result<HttpResponse> {
        let timeouts = self.timeouts();
        let mut request = self
            .http()
            .request(method.clone(), url)
            .timeout(timeouts.read)
            .header(ACCEPT, "application/json");

        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(authorization) = self.authorization() {
            request = request.header(AUTHORIZATION, authorization);
        }
        match body {
            RequestBody::Empty => {}
            RequestBody::Json(payload) => {
                debug!(payload = %redact_payload(&payload), "request payload");
                request = request.json(&payload);
            }
            RequestBody::Bytes(bytes) => {
                request = request
                    .header(CONTENT_TYPE, "application/octet-stream")
                    .body(bytes);
            }
        }

        debug!(%method, url, "sending Air API request");
        let response = request.send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;
        debug!(%method, url, status, "received Air API response");
        Ok(HttpResponse::new(status, text))
    }

    /// GET `url` with query parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails at the transport level.
    pub async fn get(&self, url: &str, query: &[(String, String)]) -> Result<HttpResponse> {
        self.send(Method::GET, url, query, RequestBody::Empty).await
    }

    /// Exchange a username and password for a bearer token at `login_url`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Authorization`] if the body is not JSON or carries no token.
    pub async fn fetch_token(
        &self,
        login_url: &str,
        username: &str,
        password: &SecretString,
    ) -> Result<SecretString> {
        let payload = json!({"username": username, "password": password.expose_secret()});
        let response = self
            .send(Method::POST, login_url, &[], RequestBody::Json(payload))
            .await?;
        let body: Value = serde_json::from_str(response.text()).map_err(|_| {
            Error::Authorization("API did not return a valid JSON response".to_string())
        })?;

        match body.get("token").and_then(Value::as_str) {
            Some(token) => {
                info!(username, "obtained Air API token");
                Ok(SecretString::from(token.to_string()))
            }
            None => {
                debug!(response = %redact_payload(&body), "login response carried no token");
                Err(Error::Authorization(format!(
                    "API did not provide a token for {username}"
                )))
            }
        }
    }
}

/// Default authorization error.
#[must_use]
pub fn authorization_error() -> Error {
    Error::Authorization(DEFAULT_AUTHORIZATION_MESSAGE.to_string())
}

//! v1 client context: authentication, request dispatch and endpoint accessors.

use crate::endpoint::ResourceApi;
use crate::kind::ModelKind;
use crate::Result;
use air_core::error::DEFAULT_FORBIDDEN_MESSAGE;
use air_core::util::{join_urls, normalize_api_url, normalize_api_version};
use air_core::{
    validate_response, AirClientConfig, Credentials, Error, ExpectedBody, HttpClient,
    HttpResponse, QueryParams, RequestBody,
};
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info};

struct ApiInner {
    http: HttpClient,
    base_url: String,
    api_url: String,
    credentials: RwLock<Option<Credentials>>,
    username: RwLock<Option<String>>,
}

/// Shared v1 client. Clones are cheap and share the session.
#[derive(Clone)]
pub struct AirApi {
    inner: Arc<ApiInner>,
}

impl fmt::Debug for AirApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AirApi")
            .field("api_url", &self.inner.api_url)
            .field("username", &self.username())
            .finish_non_exhaustive()
    }
}

/// Drop `_`-prefixed keys from request payloads.
fn strip_private(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(key, _)| !key.starts_with('_'))
                .map(|(key, value)| (key, strip_private(value)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(strip_private).collect()),
        other => other,
    }
}

impl AirApi {
    /// Unauthenticated client for `api_url` and `version` (`1`, `"1"` or `"v1"`).
    ///
    /// # Errors
    ///
    /// Fails if the URL is invalid.
    pub fn new(api_url: &str, version: impl fmt::Display) -> Result<Self> {
        let config = AirClientConfig::new(normalize_api_url(api_url))?;
        Self::with_config(&config, version)
    }

    /// Unauthenticated client from explicit configuration.
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be built.
    pub fn with_config(config: &AirClientConfig, version: impl fmt::Display) -> Result<Self> {
        let base_url = normalize_api_url(&config.api_url);
        let api_url = format!("{base_url}{}", normalize_api_version(version));
        Ok(Self {
            inner: Arc::new(ApiInner {
                http: HttpClient::new(config)?,
                base_url,
                api_url,
                credentials: RwLock::new(None),
                username: RwLock::new(None),
            }),
        })
    }

    /// Create a client and authorize it.
    ///
    /// # Errors
    ///
    /// Fails if the URL is invalid or authorization fails.
    pub async fn connect(
        api_url: &str,
        version: impl fmt::Display,
        credentials: Credentials,
    ) -> Result<Self> {
        let api = Self::new(api_url, version)?;
        api.authorize(credentials).await?;
        Ok(api)
    }

    /// Versioned API root, e.g. `https://air.nvidia.com/api/v1`.
    #[must_use]
    pub fn api_url(&self) -> &str {
        &self.inner.api_url
    }

    /// Unversioned API root, e.g. `https://air.nvidia.com/api/`.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Underlying HTTP session.
    #[must_use]
    pub fn http(&self) -> &HttpClient {
        &self.inner.http
    }

    /// Username of the authorized account, once known.
    #[must_use]
    pub fn username(&self) -> Option<String> {
        self.inner
            .username
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn login_url(&self) -> String {
        format!("{}/login/", self.inner.api_url)
    }

    /// Authorize with a bearer token or a username/password pair, then look up the
    /// account's username.
    ///
    /// Password credentials are kept so that a `403` can trigger one re-authentication.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Authorization`] when no token can be obtained.
    pub async fn authorize(&self, credentials: Credentials) -> Result<()> {
        let token = match &credentials {
            Credentials::BearerToken(token) => {
                SecretString::from(token.expose_secret().to_string())
            }
            Credentials::Password { username, password } => {
                self.get_token(username, password).await?
            }
        };
        self.inner.http.set_bearer_token(token);
        *self
            .inner
            .credentials
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(credentials);

        let res = self.get(&self.login_url(), &QueryParams::new()).await?;
        validate_response(&res, 200, ExpectedBody::Object)?;
        let login: Value = res.json()?;
        let username = login
            .get("username")
            .and_then(Value::as_str)
            .map(str::to_string);
        info!(username = username.as_deref().unwrap_or_default(), "authorized Air API client");
        *self
            .inner
            .username
            .write()
            .unwrap_or_else(PoisonError::into_inner) = username;
        Ok(())
    }

    /// Exchange a username and password for a bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Authorization`] if the API does not provide a token.
    pub async fn get_token(&self, username: &str, password: &SecretString) -> Result<SecretString> {
        self.inner
            .http
            .fetch_token(&self.login_url(), username, password)
            .await
    }

    fn password_credentials(&self) -> Option<(String, SecretString)> {
        match &*self
            .inner
            .credentials
            .read()
            .unwrap_or_else(PoisonError::into_inner)
        {
            Some(Credentials::Password { username, password }) => Some((
                username.clone(),
                SecretString::from(password.expose_secret().to_string()),
            )),
            _ => None,
        }
    }

    /// Send a request.
    ///
    /// `_`-prefixed payload keys are dropped. A `403` triggers one re-authentication and
    /// retry when the client was authorized with a username and password.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Forbidden`] for a final `403` and
    /// [`Error::UnexpectedResponse`] for any other status of `400` or above.
    pub async fn request(
        &self,
        method: Method,
        url: &str,
        query: &[(String, String)],
        body: RequestBody,
    ) -> Result<HttpResponse> {
        let body = match body {
            RequestBody::Json(payload) => RequestBody::Json(strip_private(payload)),
            other => other,
        };
        let http = &self.inner.http;
        let mut res = http.send(method.clone(), url, query, body.clone()).await?;

        if res.status() == 403 {
            if let Some((username, password)) = self.password_credentials() {
                info!(username = %username, "received 403, re-authenticating");
                let token = self.get_token(&username, &password).await?;
                http.set_bearer_token(token);
                res = http.send(method, url, query, body).await?;
            }
        }
        if res.status() == 403 {
            let message = if res.text().is_empty() {
                DEFAULT_FORBIDDEN_MESSAGE.to_string()
            } else {
                res.text().to_string()
            };
            return Err(Error::Forbidden(message));
        }
        if res.status() >= 400 {
            debug!(url, status = res.status(), "request rejected");
            return Err(Error::unexpected_response(res.status(), res.text()));
        }
        Ok(res)
    }

    /// `GET` wrapper.
    ///
    /// # Errors
    ///
    /// See [`AirApi::request`].
    pub async fn get(&self, url: &str, params: &QueryParams) -> Result<HttpResponse> {
        self.request(Method::GET, url, params.pairs(), RequestBody::Empty)
            .await
    }

    /// `POST` wrapper.
    ///
    /// # Errors
    ///
    /// See [`AirApi::request`].
    pub async fn post(&self, url: &str, payload: Value) -> Result<HttpResponse> {
        self.request(Method::POST, url, &[], RequestBody::Json(payload))
            .await
    }

    /// `PUT` wrapper.
    ///
    /// # Errors
    ///
    /// See [`AirApi::request`].
    pub async fn put(&self, url: &str, payload: Value) -> Result<HttpResponse> {
        self.request(Method::PUT, url, &[], RequestBody::Json(payload))
            .await
    }

    /// `PATCH` wrapper.
    ///
    /// # Errors
    ///
    /// See [`AirApi::request`].
    pub async fn patch(&self, url: &str, payload: Value) -> Result<HttpResponse> {
        self.request(Method::PATCH, url, &[], RequestBody::Json(payload))
            .await
    }

    /// `DELETE` wrapper.
    ///
    /// # Errors
    ///
    /// See [`AirApi::request`].
    pub async fn delete(&self, url: &str) -> Result<HttpResponse> {
        self.request(Method::DELETE, url, &[], RequestBody::Empty)
            .await
    }

    /// Endpoint for `kind`.
    ///
    /// Fleets live under the v2 prefix. Variants without an endpoint of their own
    /// are rooted at the versioned API root.
    #[must_use]
    pub fn resource(&self, kind: ModelKind) -> ResourceApi {
        let url = match (kind, kind.path()) {
            (ModelKind::Fleet, Some(path)) => join_urls(&[&self.inner.base_url, "v2", path]),
            (_, Some(path)) => format!("{}/{path}/", self.inner.api_url),
            (_, None) => format!("{}/", self.inner.api_url),
        };
        ResourceApi::new(self.clone(), kind, url)
    }

    /// Accounts endpoint.
    #[must_use]
    pub fn accounts(&self) -> ResourceApi {
        self.resource(ModelKind::Account)
    }

    /// API tokens endpoint.
    #[must_use]
    pub fn api_tokens(&self) -> ResourceApi {
        self.resource(ModelKind::ApiToken)
    }

    /// Demos endpoint.
    #[must_use]
    pub fn demos(&self) -> ResourceApi {
        self.resource(ModelKind::Demo)
    }

    /// Fleets endpoint.
    #[must_use]
    pub fn fleets(&self) -> ResourceApi {
        self.resource(ModelKind::Fleet)
    }

    /// Images endpoint.
    #[must_use]
    pub fn images(&self) -> ResourceApi {
        self.resource(ModelKind::Image)
    }

    /// Interfaces endpoint.
    #[must_use]
    pub fn interfaces(&self) -> ResourceApi {
        self.resource(ModelKind::Interface)
    }

    /// Jobs endpoint.
    #[must_use]
    pub fn jobs(&self) -> ResourceApi {
        self.resource(ModelKind::Job)
    }

    /// Links endpoint.
    #[must_use]
    pub fn links(&self) -> ResourceApi {
        self.resource(ModelKind::Link)
    }

    /// Login endpoint.
    #[must_use]
    pub fn login(&self) -> ResourceApi {
        self.resource(ModelKind::Login)
    }

    /// Nodes endpoint.
    #[must_use]
    pub fn nodes(&self) -> ResourceApi {
        self.resource(ModelKind::Node)
    }

    /// Organizations endpoint.
    #[must_use]
    pub fn organizations(&self) -> ResourceApi {
        self.resource(ModelKind::Organization)
    }

    /// Permissions endpoint.
    #[must_use]
    pub fn permissions(&self) -> ResourceApi {
        self.resource(ModelKind::Permission)
    }

    /// Resource budgets endpoint.
    #[must_use]
    pub fn resource_budgets(&self) -> ResourceApi {
        self.resource(ModelKind::ResourceBudget)
    }

    /// Services endpoint.
    #[must_use]
    pub fn services(&self) -> ResourceApi {
        self.resource(ModelKind::Service)
    }

    /// Simulations endpoint.
    #[must_use]
    pub fn simulations(&self) -> ResourceApi {
        self.resource(ModelKind::Simulation)
    }

    /// Simulation interfaces endpoint.
    #[must_use]
    pub fn simulation_interfaces(&self) -> ResourceApi {
        self.resource(ModelKind::SimulationInterface)
    }

    /// Simulation nodes endpoint.
    #[must_use]
    pub fn simulation_nodes(&self) -> ResourceApi {
        self.resource(ModelKind::SimulationNode)
    }

    /// SSH keys endpoint.
    #[must_use]
    pub fn ssh_keys(&self) -> ResourceApi {
        self.resource(ModelKind::SshKey)
    }

    /// Topologies endpoint.
    #[must_use]
    pub fn topologies(&self) -> ResourceApi {
        self.resource(ModelKind::Topology)
    }

    /// User configs endpoint.
    #[must_use]
    pub fn user_configs(&self) -> ResourceApi {
        self.resource(ModelKind::UserConfig)
    }

    /// Workers endpoint.
    #[must_use]
    pub fn workers(&self) -> ResourceApi {
        self.resource(ModelKind::Worker)
    }
}

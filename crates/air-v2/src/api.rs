//! v2 client context: authentication, client settings, request dispatch and endpoint
//! accessors.

use crate::endpoints::{
    AccountEndpoint, AnnouncementEndpoint, ApiTokenEndpoint, CloudInitEndpoint, FleetEndpoint,
    ImageEndpoint, InterfaceEndpoint, JobEndpoint, LinkEndpoint, NodeEndpoint,
    NodeInstructionEndpoint, OrganizationEndpoint, ResourceBudgetEndpoint, ServiceEndpoint,
    SimulationEndpoint, SystemEndpoint, UserConfigEndpoint, WorkerEndpoint,
};
use crate::Result;
use air_core::util::{join_urls, normalize_api_url};
use air_core::{AirClientConfig, Credentials, HttpClient, HttpResponse, QueryParams, RequestBody};
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

struct ApiInner {
    http: HttpClient,
    api_url: String,
    base_url: String,
}

/// Shared v2 client. Clones are cheap and share the session, timeouts and page size.
#[derive(Clone)]
pub struct AirApi {
    inner: Arc<ApiInner>,
}

impl fmt::Debug for AirApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AirApi")
            .field("base_url", &self.inner.base_url)
            .field("http", &self.inner.http)
            .finish()
    }
}

impl AirApi {
    /// Unauthenticated client for `api_url`. `http://host` is normalized to
    /// `http://host/api/`.
    ///
    /// # Errors
    ///
    /// Fails if the URL is invalid.
    pub fn new(api_url: &str) -> Result<Self> {
        let config = AirClientConfig::new(normalize_api_url(api_url))?;
        Self::with_config(&config)
    }

    /// Unauthenticated client from explicit configuration.
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be built.
    pub fn with_config(config: &AirClientConfig) -> Result<Self> {
        let api_url = normalize_api_url(&config.api_url);
        let base_url = join_urls(&[&api_url, "v2"]);
        Ok(Self {
            inner: Arc::new(ApiInner {
                http: HttpClient::new(config)?,
                api_url,
                base_url,
            }),
        })
    }

    /// Create a client and authenticate it.
    ///
    /// # Errors
    ///
    /// Fails if the URL is invalid or no token can be obtained.
    pub async fn connect(api_url: &str, credentials: Credentials) -> Result<Self> {
        let api = Self::new(api_url)?;
        api.authenticate(credentials).await?;
        Ok(api)
    }

    /// Install a bearer token, exchanging a username and password for one at the v1
    /// login endpoint if needed.
    ///
    /// # Errors
    ///
    /// Returns [`air_core::Error::Authorization`] when no token can be obtained.
    pub async fn authenticate(&self, credentials: Credentials) -> Result<()> {
        let token = match &credentials {
            Credentials::BearerToken(token) => {
                SecretString::from(token.expose_secret().to_string())
            }
            Credentials::Password { username, password } => {
                self.get_token(username, password).await?
            }
        };
        self.inner.http.set_bearer_token(token);
        info!(base_url = %self.inner.base_url, "authenticated Air v2 client");
        Ok(())
    }

    /// Exchange a username and password for a bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`air_core::Error::Authorization`] if the API does not provide a token.
    pub async fn get_token(&self, username: &str, password: &SecretString) -> Result<SecretString> {
        let login_url = join_urls(&[&self.inner.api_url, "v1", "login"]);
        self.inner
            .http
            .fetch_token(&login_url, username, password)
            .await
    }

    /// Unversioned API root, e.g. `https://air.nvidia.com/api/`.
    #[must_use]
    pub fn api_url(&self) -> &str {
        &self.inner.api_url
    }

    /// v2 API root, e.g. `https://air.nvidia.com/api/v2/`.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Underlying HTTP session.
    #[must_use]
    pub fn http(&self) -> &HttpClient {
        &self.inner.http
    }

    /// Change the connect timeout.
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be rebuilt.
    pub fn set_connect_timeout(&self, timeout: Duration) -> Result<()> {
        self.inner.http.set_connect_timeout(timeout)
    }

    /// Change the read timeout.
    pub fn set_read_timeout(&self, timeout: Duration) {
        self.inner.http.set_read_timeout(timeout);
    }

    /// Change the number of items requested per page.
    ///
    /// # Errors
    ///
    /// Returns [`air_core::Error::Air`] unless `size` is a positive integer.
    pub fn set_page_size(&self, size: i64) -> Result<()> {
        self.inner.http.set_page_size(size)
    }

    /// Number of items requested per page.
    #[must_use]
    pub fn page_size(&self) -> u32 {
        self.inner.http.page_size()
    }

    /// Join `path` onto the v2 root.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        join_urls(&[&self.inner.base_url, path])
    }

    /// Send a request. Status codes are checked by the caller.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails at the transport level.
    pub async fn request(
        &self,
        method: Method,
        url: &str,
        query: &[(String, String)],
        body: RequestBody,
    ) -> Result<HttpResponse> {
        let res = self.inner.http.send(method.clone(), url, query, body).await?;
        if !res.is_success() {
            debug!(%method, url, status = res.status(), "request rejected");
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

    /// Accounts endpoint.
    #[must_use]
    pub fn accounts(&self) -> AccountEndpoint {
        AccountEndpoint::new(self.clone())
    }

    /// Announcements endpoint.
    #[must_use]
    pub fn announcements(&self) -> AnnouncementEndpoint {
        AnnouncementEndpoint::new(self.clone())
    }

    /// API tokens endpoint.
    #[must_use]
    pub fn api_tokens(&self) -> ApiTokenEndpoint {
        ApiTokenEndpoint::new(self.clone())
    }

    /// Cloud-init assignments endpoint.
    #[must_use]
    pub fn cloud_inits(&self) -> CloudInitEndpoint {
        CloudInitEndpoint::new(self.clone())
    }

    /// Fleets endpoint.
    #[must_use]
    pub fn fleets(&self) -> FleetEndpoint {
        FleetEndpoint::new(self.clone())
    }

    /// Images endpoint.
    #[must_use]
    pub fn images(&self) -> ImageEndpoint {
        ImageEndpoint::new(self.clone())
    }

    /// Interfaces endpoint.
    #[must_use]
    pub fn interfaces(&self) -> InterfaceEndpoint {
        InterfaceEndpoint::new(self.clone())
    }

    /// Jobs endpoint.
    #[must_use]
    pub fn jobs(&self) -> JobEndpoint {
        JobEndpoint::new(self.clone())
    }

    /// Links endpoint.
    #[must_use]
    pub fn links(&self) -> LinkEndpoint {
        LinkEndpoint::new(self.clone())
    }

    /// Node instructions endpoint.
    #[must_use]
    pub fn node_instructions(&self) -> NodeInstructionEndpoint {
        NodeInstructionEndpoint::new(self.clone())
    }

    /// Nodes endpoint.
    #[must_use]
    pub fn nodes(&self) -> NodeEndpoint {
        NodeEndpoint::new(self.clone())
    }

    /// Organizations endpoint.
    #[must_use]
    pub fn organizations(&self) -> OrganizationEndpoint {
        OrganizationEndpoint::new(self.clone())
    }

    /// Resource budgets endpoint.
    #[must_use]
    pub fn resource_budgets(&self) -> ResourceBudgetEndpoint {
        ResourceBudgetEndpoint::new(self.clone())
    }

    /// Services endpoint.
    #[must_use]
    pub fn services(&self) -> ServiceEndpoint {
        ServiceEndpoint::new(self.clone())
    }

    /// Simulations endpoint.
    #[must_use]
    pub fn simulations(&self) -> SimulationEndpoint {
        SimulationEndpoint::new(self.clone())
    }

    /// Systems endpoint.
    #[must_use]
    pub fn systems(&self) -> SystemEndpoint {
        SystemEndpoint::new(self.clone())
    }

    /// User configs endpoint.
    #[must_use]
    pub fn user_configs(&self) -> UserConfigEndpoint {
        UserConfigEndpoint::new(self.clone())
    }

    /// Workers endpoint.
    #[must_use]
    pub fn workers(&self) -> WorkerEndpoint {
        WorkerEndpoint::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mixins::Endpoint;

    #[test]
    fn urls_are_normalized() {
        let api = AirApi::new("http://localhost").unwrap();
        assert_eq!(api.api_url(), "http://localhost/api/");
        assert_eq!(api.base_url(), "http://localhost/api/v2/");
        assert_eq!(api.fleets().url(), "http://localhost/api/v2/fleet/");
        assert_eq!(
            api.links().url(),
            "http://localhost/api/v2/simulations/nodes/interfaces/links/"
        );
        assert_eq!(api.user_configs().url(), "http://localhost/api/v2/userconfigs/");
        assert_eq!(api.url("/workers/heartbeat"), "http://localhost/api/v2/workers/heartbeat/");
    }

    #[test]
    fn settings_are_shared_between_clones() {
        let api = AirApi::new("http://localhost/api/").unwrap();
        let clone = api.clone();
        clone.set_page_size(25).unwrap();
        assert_eq!(api.page_size(), 25);

        let err = api.set_page_size(0).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Pagination page size must be a positive integer."
        );

        api.set_read_timeout(Duration::from_secs(5));
        api.set_connect_timeout(Duration::from_secs(3)).unwrap();
        let timeouts = clone.http().timeouts();
        assert_eq!(timeouts.read, Duration::from_secs(5));
        assert_eq!(timeouts.connect, Duration::from_secs(3));
    }
}

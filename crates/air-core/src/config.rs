//! Configuration structures for Air clients.
//!
//! [`AirClientConfig`] controls where a client connects, which timeouts are attached to
//! each request and how many items are requested per page.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;
use validator::Validate;

/// Default Air API root.
pub const DEFAULT_API_URL: &str = "https://air.nvidia.com/api/";

/// Hosts that may share credentials when a request is redirected.
pub const ALLOWED_HOSTS: [&str; 4] = [
    "air.nvidia.com",
    "staging.air.nvidia.com",
    "air.cumulusnetworks.com",
    "staging.air.cumulusnetworks.com",
];

/// Default connect timeout in seconds.
pub const DEFAULT_CONNECT_TIMEOUT: u64 = 16;

/// Default read timeout in seconds.
pub const DEFAULT_READ_TIMEOUT: u64 = 61;

/// Default number of items requested per page.
pub const DEFAULT_PAGINATION_PAGE_SIZE: u32 = 200;

/// Configuration for an Air client instance.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AirClientConfig {
    /// Air API root URL (e.g. `https://air.nvidia.com/api/`)
    #[validate(url)]
    pub api_url: String,

    /// Connect timeout in seconds
    #[validate(range(min = 1, max = 300))]
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Read timeout in seconds
    #[validate(range(min = 1, max = 600))]
    #[serde(default = "default_read_timeout_secs")]
    pub read_timeout_secs: u64,

    /// Page size used by paginated list requests
    #[validate(range(min = 1, max = 10000))]
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Whether to verify TLS certificates
    #[serde(default = "default_tls_verify")]
    pub tls_verify: bool,

    /// Hosts a redirect may lead to in addition to the original host
    #[serde(default = "default_allowed_hosts")]
    pub allowed_hosts: Vec<String>,
}

const fn default_connect_timeout_secs() -> u64 {
    DEFAULT_CONNECT_TIMEOUT
}

const fn default_read_timeout_secs() -> u64 {
    DEFAULT_READ_TIMEOUT
}

const fn default_page_size() -> u32 {
    DEFAULT_PAGINATION_PAGE_SIZE
}

const fn default_tls_verify() -> bool {
    true
}

fn default_allowed_hosts() -> Vec<String> {
    ALLOWED_HOSTS.iter().map(|host| (*host).to_string()).collect()
}

impl AirClientConfig {
    /// Create a new client configuration for the given API root.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or validation fails.
    pub fn new(api_url: impl Into<String>) -> Result<Self, Error> {
        let config = Self {
            api_url: api_url.into(),
            ..Self::default()
        };

        config
            .validate()
            .map_err(|e| Error::Config(format!("Invalid configuration: {e}")))?;

        Ok(config)
    }

    /// Build a configuration from `AIR_*` environment variables.
    ///
    /// Reads `AIR_API_URL`, `AIR_CONNECT_TIMEOUT`, `AIR_READ_TIMEOUT` and
    /// `AIR_PAGE_SIZE`; unset variables keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable cannot be parsed or validation fails.
    pub fn from_env() -> Result<Self, Error> {
        let mut config = Self::default();
        if let Ok(url) = std::env::var("AIR_API_URL") {
            config.api_url = url;
        }
        if let Some(secs) = env_number("AIR_CONNECT_TIMEOUT")? {
            config.connect_timeout_secs = secs;
        }
        if let Some(secs) = env_number("AIR_READ_TIMEOUT")? {
            config.read_timeout_secs = secs;
        }
        if let Some(size) = env_number("AIR_PAGE_SIZE")? {
            config.page_size = u32::try_from(size)
                .map_err(|_| Error::Config(format!("AIR_PAGE_SIZE is out of range: {size}")))?;
        }

        config
            .validate()
            .map_err(|e| Error::Config(format!("Invalid configuration: {e}")))?;
        Ok(config)
    }

    /// Set the connect timeout in seconds.
    #[must_use]
    pub const fn with_connect_timeout(mut self, seconds: u64) -> Self {
        self.connect_timeout_secs = seconds;
        self
    }

    /// Set the read timeout in seconds.
    #[must_use]
    pub const fn with_read_timeout(mut self, seconds: u64) -> Self {
        self.read_timeout_secs = seconds;
        self
    }

    /// Set the pagination page size.
    #[must_use]
    pub const fn with_page_size(mut self, size: u32) -> Self {
        self.page_size = size;
        self
    }

    /// Set whether to verify TLS certificates.
    #[must_use]
    pub const fn with_tls_verify(mut self, verify: bool) -> Self {
        self.tls_verify = verify;
        self
    }

    /// Allow redirects to an additional host.
    #[must_use]
    pub fn with_allowed_host(mut self, host: impl Into<String>) -> Self {
        self.allowed_hosts.push(host.into());
        self
    }

    /// Get the connect timeout as a Duration.
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Get the read timeout as a Duration.
    #[must_use]
    pub const fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    /// Parse and validate the API URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be parsed.
    pub fn parse_api_url(&self) -> Result<Url, Error> {
        Url::parse(&self.api_url).map_err(|e| Error::Config(format!("Invalid API URL: {e}")))
    }
}

impl Default for AirClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            connect_timeout_secs: default_connect_timeout_secs(),
            read_timeout_secs: default_read_timeout_secs(),
            page_size: default_page_size(),
            tls_verify: default_tls_verify(),
            allowed_hosts: default_allowed_hosts(),
        }
    }
}

fn env_number(name: &str) -> Result<Option<u64>, Error> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|e| Error::Config(format!("{name} must be a positive integer: {e}"))),
        Err(_) => Ok(None),
    }
}

//! Configuration structures for DigitalOcean API clients.
//!
//! This module provides the configuration type controlling how a client
//! connects to the API: base URL, timeouts, and TLS verification.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;
use validator::Validate;

/// Public DigitalOcean APIv2 base URL.
pub const DEFAULT_API_URL: &str = "https://api.digitalocean.com/v2/";

const fn default_tls_verify() -> bool {
    true
}

const fn default_request_timeout_secs() -> u64 {
    30
}

const fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

/// Configuration for a DigitalOcean API client instance.
///
/// Defaults target the public API endpoint; the base URL is overridable so
/// tests can point the client at a local mock server.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DoClientConfig {
    /// API base URL.
    #[validate(url)]
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Request timeout in seconds.
    #[validate(range(min = 1, max = 300))]
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Connection timeout in seconds.
    #[validate(range(min = 1, max = 60))]
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Whether to verify TLS certificates.
    #[serde(default = "default_tls_verify")]
    pub tls_verify: bool,
}

impl DoClientConfig {
    /// Create a new configuration pointing at the public API endpoint.
    #[must_use]
    pub fn new() -> Self {
        Self {
            api_url: default_api_url(),
            request_timeout_secs: default_request_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            tls_verify: default_tls_verify(),
        }
    }

    /// Override the API base URL.
    #[must_use]
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Set the request timeout in seconds.
    #[must_use]
    pub const fn with_request_timeout(mut self, seconds: u64) -> Self {
        self.request_timeout_secs = seconds;
        self
    }

    /// Set the connection timeout in seconds.
    #[must_use]
    pub const fn with_connect_timeout(mut self, seconds: u64) -> Self {
        self.connect_timeout_secs = seconds;
        self
    }

    /// Set whether to verify TLS certificates.
    #[must_use]
    pub const fn with_tls_verify(mut self, verify: bool) -> Self {
        self.tls_verify = verify;
        self
    }

    /// Get the request timeout as a [`Duration`].
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Get the connection timeout as a [`Duration`].
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Parse and validate the configured API base URL.
    ///
    /// A base URL without a trailing slash would silently drop its last path
    /// segment when endpoint paths are joined onto it, so one is appended
    /// here when missing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the URL cannot be parsed or cannot serve
    /// as a base.
    pub fn parse_api_url(&self) -> Result<Url, Error> {
        let mut url = Url::parse(&self.api_url)
            .map_err(|e| Error::Config(format!("Invalid API URL: {e}")))?;
        if url.cannot_be_a_base() {
            return Err(Error::Config(format!(
                "API URL cannot serve as a base: {}",
                self.api_url
            )));
        }
        if !url.path().ends_with('/') {
            url.set_path(&format!("{}/", url.path()));
        }
        Ok(url)
    }
}

impl Default for DoClientConfig {
    fn default() -> Self {
        Self::new()
    }
}

//! The HTTP transport abstraction.
//!
//! The request mediator only needs `GET/POST/DELETE(url, headers, body)` to
//! return a status/headers/body triple, so that capability is a trait with a
//! default [`reqwest`] implementation. Tests substitute a mock transport to
//! exercise classification paths without a server.

use crate::config::DoClientConfig;
use crate::error::{ApiErrorBody, Error, Result};
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{ClientBuilder, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::warn;

/// A raw HTTP exchange result: status code, response headers, and body text.
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: StatusCode,
    /// Response headers as returned by the server.
    pub headers: HeaderMap,
    /// Response body, undecoded.
    pub body: String,
}

impl RawResponse {
    /// Returns true for any 2xx status.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Decode the body as JSON into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] when the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body)
            .map_err(|err| Error::Parse(format!("Failed to decode response body: {err}")))
    }

    /// Extract the `message` field from a structured failure body, if any.
    #[must_use]
    pub fn message(&self) -> Option<String> {
        ApiErrorBody::message_from(&self.body)
    }
}

/// Minimal HTTP capability required by the request mediator.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Execute a single HTTP exchange and return the raw result.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Network`] when the request cannot reach the API.
    async fn execute(
        &self,
        method: Method,
        url: Url,
        headers: HeaderMap,
        body: Option<String>,
    ) -> Result<RawResponse>;
}

/// Default [`Transport`] implementation backed by [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
}

impl HttpTransport {
    /// Build a transport honoring the configured timeouts and TLS settings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when the underlying client cannot be built.
    pub fn from_config(config: &DoClientConfig, user_agent: &str) -> Result<Self> {
        let mut builder = ClientBuilder::new()
            .user_agent(user_agent)
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout());

        if !config.tls_verify {
            warn!("TLS verification disabled for API client");
            builder = builder.danger_accept_invalid_certs(true);
        }

        let http = builder
            .build()
            .map_err(|err| Error::Config(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self { http })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(
        &self,
        method: Method,
        url: Url,
        headers: HeaderMap,
        body: Option<String>,
    ) -> Result<RawResponse> {
        let mut request = self.http.request(method, url).headers(headers);
        if let Some(payload) = body {
            request = request.body(payload);
        }

        let response = request.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await?;

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}

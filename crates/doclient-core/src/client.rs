//! The authenticated request mediator.
//!
//! Every outbound API call funnels through [`ApiClient`]: it owns the bearer
//! token, builds the fixed header set, dispatches the verb through the
//! [`Transport`], and classifies failure status codes into the error
//! taxonomy. There is no retry, backoff, or circuit breaking; every failure
//! is surfaced synchronously to the immediate caller.

use crate::config::DoClientConfig;
use crate::error::{Error, Result};
use crate::transport::{HttpTransport, RawResponse, Transport};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;
use url::Url;

const USER_AGENT: &str = concat!("doclient/", env!("CARGO_PKG_VERSION"));

/// HTTP verbs supported by the mediator.
///
/// The API surface only ever needs these three; anything else is a caller
/// mistake and is rejected at parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    /// HTTP GET.
    Get,
    /// HTTP POST.
    Post,
    /// HTTP DELETE.
    Delete,
}

impl Verb {
    /// The canonical upper-case verb name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Delete => "DELETE",
        }
    }

    /// Convert to the transport-level [`Method`].
    #[must_use]
    pub fn as_method(self) -> Method {
        match self {
            Self::Get => Method::GET,
            Self::Post => Method::POST,
            Self::Delete => Method::DELETE,
        }
    }
}

impl FromStr for Verb {
    type Err = Error;

    /// Case-insensitive verb parsing; unsupported verbs fail with
    /// [`Error::InvalidArgument`].
    fn from_str(s: &str) -> Result<Self> {
        if s.eq_ignore_ascii_case("get") {
            Ok(Self::Get)
        } else if s.eq_ignore_ascii_case("post") {
            Ok(Self::Post)
        } else if s.eq_ignore_ascii_case("delete") {
            Ok(Self::Delete)
        } else {
            Err(Error::InvalidArgument(format!(
                "Unsupported HTTP verb `{s}`"
            )))
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builder for [`ApiClient`].
pub struct ApiClientBuilder {
    config: DoClientConfig,
    token: SecretString,
    user_agent: String,
    extra_headers: Vec<(String, String)>,
    transport: Option<Arc<dyn Transport>>,
}

impl ApiClientBuilder {
    /// Create a builder holding the bearer token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            config: DoClientConfig::default(),
            token: SecretString::from(token.into()),
            user_agent: USER_AGENT.to_string(),
            extra_headers: Vec::new(),
            transport: None,
        }
    }

    /// Override the client configuration.
    #[must_use]
    pub fn with_config(mut self, config: DoClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Override the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Register an additional header sent with every request.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.push((name.into(), value.into()));
        self
    }

    /// Substitute the HTTP transport (used by tests).
    #[must_use]
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Build the mediator.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for an unusable configuration and
    /// [`Error::InvalidArgument`] for malformed extra headers.
    pub fn build(self) -> Result<ApiClient> {
        use validator::Validate;

        self.config
            .validate()
            .map_err(|err| Error::Config(format!("Invalid configuration: {err}")))?;
        let base_url = self.config.parse_api_url()?;

        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::from_config(&self.config, &self.user_agent)?),
        };

        let mut client = ApiClient {
            transport,
            base_url,
            token: self.token,
            extra_headers: HeaderMap::new(),
        };
        client.add_request_headers(&self.extra_headers)?;

        Ok(client)
    }
}

/// The authenticated request mediator.
///
/// Holds the credential and attaches `Content-Type: application/json` plus a
/// bearer `Authorization` header to every request.
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    base_url: Url,
    token: SecretString,
    extra_headers: HeaderMap,
}

impl ApiClient {
    /// Start a builder holding the bearer token.
    #[must_use]
    pub fn builder(token: impl Into<String>) -> ApiClientBuilder {
        ApiClientBuilder::new(token)
    }

    /// Return the base URL every endpoint path is joined onto.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Register additional headers sent with every subsequent request.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] when a name or value is not a
    /// legal HTTP header.
    pub fn add_request_headers(
        &mut self,
        headers: &[(impl AsRef<str>, impl AsRef<str>)],
    ) -> Result<()> {
        for (name, value) in headers {
            let name = HeaderName::from_str(name.as_ref()).map_err(|err| {
                Error::InvalidArgument(format!(
                    "Invalid header name `{}`: {err}",
                    name.as_ref()
                ))
            })?;
            let value = HeaderValue::from_str(value.as_ref()).map_err(|err| {
                Error::InvalidArgument(format!("Invalid value for header `{name}`: {err}"))
            })?;
            self.extra_headers.insert(name, value);
        }
        Ok(())
    }

    /// Issue a request and return the raw status/headers/body triple.
    ///
    /// Transport failures and the always-fatal status codes (400, 401/403,
    /// 500) are classified here; any other status is returned for the caller
    /// to interpret, since mutating operations differ on which 2xx they
    /// accept.
    ///
    /// # Errors
    ///
    /// [`Error::Network`] on transport failure, [`Error::Auth`] on 401/403,
    /// [`Error::Api`] on 400 or 500.
    pub async fn request_raw<B>(
        &self,
        verb: Verb,
        path: &str,
        params: &[(&'static str, String)],
        body: Option<&B>,
    ) -> Result<RawResponse>
    where
        B: Serialize + ?Sized,
    {
        let url = self.endpoint(path, params)?;
        let headers = self.request_headers()?;
        let body = match body {
            Some(payload) => Some(serde_json::to_string(payload)?),
            None => None,
        };

        debug!(%verb, %url, "dispatching API request");
        let response = self
            .transport
            .execute(verb.as_method(), url, headers, body)
            .await?;
        debug!(status = %response.status, "API response received");

        match Self::classify(&response) {
            Some(err) => Err(err),
            None => Ok(response),
        }
    }

    /// Issue a request and decode the JSON response body into `T`.
    ///
    /// # Errors
    ///
    /// Everything [`Self::request_raw`] returns, plus [`Error::Api`] for any
    /// remaining non-2xx status (carrying the body `message` when present)
    /// and [`Error::Parse`] when the body fails decoding.
    pub async fn request_json<T, B>(
        &self,
        verb: Verb,
        path: &str,
        params: &[(&'static str, String)],
        body: Option<&B>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let response = self.request_raw(verb, path, params, body).await?;

        if !response.is_success() {
            return Err(Error::Api(response.message().unwrap_or_else(|| {
                format!("API request failed with status {}", response.status)
            })));
        }

        response.json()
    }

    fn endpoint(&self, path: &str, params: &[(&'static str, String)]) -> Result<Url> {
        let mut url = self.base_url.join(path.trim_start_matches('/'))?;
        if !params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in params {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    fn request_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let mut bearer =
            HeaderValue::from_str(&format!("Bearer {}", self.token.expose_secret())).map_err(
                |err| Error::Config(format!("Token is not a legal header value: {err}")),
            )?;
        bearer.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);

        headers.extend(self.extra_headers.clone());
        Ok(headers)
    }

    fn classify(response: &RawResponse) -> Option<Error> {
        match response.status {
            StatusCode::BAD_REQUEST => Some(Error::Api(
                response
                    .message()
                    .unwrap_or_else(|| "Invalid request data".to_string()),
            )),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Some(Error::Auth(
                "Invalid or missing authentication credential".to_string(),
            )),
            StatusCode::INTERNAL_SERVER_ERROR => Some(Error::Api(
                "DigitalOcean API error, please retry later".to_string(),
            )),
            _ => None,
        }
    }
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("token", &"<redacted>")
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;
    use serde_json::{json, Value};

    fn response(status: StatusCode, body: &str) -> RawResponse {
        RawResponse {
            status,
            headers: HeaderMap::new(),
            body: body.to_string(),
        }
    }

    fn client_with(transport: MockTransport) -> ApiClient {
        ApiClientBuilder::new("secret-token")
            .with_transport(Arc::new(transport))
            .build()
            .unwrap()
    }

    #[test]
    fn verb_parses_case_insensitively() {
        assert_eq!("get".parse::<Verb>().unwrap(), Verb::Get);
        assert_eq!("GET".parse::<Verb>().unwrap(), Verb::Get);
        assert_eq!("Post".parse::<Verb>().unwrap(), Verb::Post);
        assert_eq!("DELETE".parse::<Verb>().unwrap(), Verb::Delete);
    }

    #[test]
    fn verb_rejects_unsupported_methods() {
        for verb in ["put", "PATCH", "head", ""] {
            let err = verb.parse::<Verb>().unwrap_err();
            assert!(matches!(err, Error::InvalidArgument(_)), "verb: {verb}");
        }
    }

    #[test]
    fn builder_rejects_invalid_config() {
        let config = DoClientConfig::new().with_api_url("not-a-url");
        let err = ApiClientBuilder::new("token")
            .with_config(config)
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn builder_rejects_malformed_extra_header() {
        let err = ApiClientBuilder::new("token")
            .with_header("bad header name", "1")
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn attaches_fixed_header_set() {
        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .withf(|method, url, headers, _body| {
                method == &Method::GET
                    && url.path() == "/v2/account"
                    && headers.get(CONTENT_TYPE).map(HeaderValue::as_bytes)
                        == Some(b"application/json".as_slice())
                    && headers.get(AUTHORIZATION).map(HeaderValue::as_bytes)
                        == Some(b"Bearer secret-token".as_slice())
                    && headers.get("x-custom").map(HeaderValue::as_bytes)
                        == Some(b"yes".as_slice())
            })
            .returning(|_, _, _, _| Ok(response(StatusCode::OK, "{}")));

        let client = ApiClientBuilder::new("secret-token")
            .with_header("x-custom", "yes")
            .with_transport(Arc::new(transport))
            .build()
            .unwrap();

        let _: Value = client
            .request_json(Verb::Get, "account", &[], None::<&Value>)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn added_headers_apply_to_subsequent_requests() {
        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .withf(|_, _, headers, _| {
                headers
                    .get("x-request-source")
                    .map(HeaderValue::as_bytes)
                    == Some(b"doclient-tests".as_slice())
            })
            .returning(|_, _, _, _| Ok(response(StatusCode::OK, "{}")));

        let mut client = client_with(transport);
        client
            .add_request_headers(&[("x-request-source", "doclient-tests")])
            .unwrap();

        let _: Value = client
            .request_json(Verb::Get, "account", &[], None::<&Value>)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn appends_query_parameters() {
        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .withf(|_, url, _, _| url.query() == Some("page=1&per_page=100"))
            .returning(|_, _, _, _| Ok(response(StatusCode::OK, r#"{"droplets": []}"#)));

        let client = client_with(transport);
        let _: Value = client
            .request_json(
                Verb::Get,
                "droplets",
                &[("page", "1".to_string()), ("per_page", "100".to_string())],
                None::<&Value>,
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn serializes_body_once() {
        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .withf(|method, _, _, body| {
                method == &Method::POST && body.as_deref() == Some(r#"{"type":"power_off"}"#)
            })
            .returning(|_, _, _, _| Ok(response(StatusCode::CREATED, "{}")));

        let client = client_with(transport);
        let body = json!({"type": "power_off"});
        let result = client
            .request_raw(Verb::Post, "droplets/7/actions", &[], Some(&body))
            .await
            .unwrap();
        assert_eq!(result.status, StatusCode::CREATED);
    }

    #[tokio::test]
    async fn classifies_unauthorized_as_auth_error() {
        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .returning(|_, _, _, _| Ok(response(StatusCode::UNAUTHORIZED, "{}")));

        let client = client_with(transport);
        let err = client
            .request_raw(Verb::Get, "droplets", &[], None::<&Value>)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Auth(_)));
    }

    #[tokio::test]
    async fn classifies_forbidden_as_auth_error() {
        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .returning(|_, _, _, _| Ok(response(StatusCode::FORBIDDEN, "{}")));

        let client = client_with(transport);
        let err = client
            .request_raw(Verb::Get, "droplets", &[], None::<&Value>)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Auth(_)));
    }

    #[tokio::test]
    async fn classifies_bad_request_as_api_error() {
        let mut transport = MockTransport::new();
        transport.expect_execute().returning(|_, _, _, _| {
            Ok(response(
                StatusCode::BAD_REQUEST,
                r#"{"id": "bad_request", "message": "You must specify a name."}"#,
            ))
        });

        let client = client_with(transport);
        let err = client
            .request_raw(Verb::Post, "droplets", &[], None::<&Value>)
            .await
            .unwrap_err();
        assert_eq!(err, Error::Api("You must specify a name.".to_string()));
    }

    #[tokio::test]
    async fn classifies_server_error_as_api_error() {
        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .returning(|_, _, _, _| Ok(response(StatusCode::INTERNAL_SERVER_ERROR, "")));

        let client = client_with(transport);
        let err = client
            .request_raw(Verb::Get, "droplets", &[], None::<&Value>)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Api(_)));
    }

    #[tokio::test]
    async fn propagates_transport_failure_as_network_error() {
        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .returning(|_, _, _, _| Err(Error::Network("connection reset".to_string())));

        let client = client_with(transport);
        let err = client
            .request_raw(Verb::Get, "droplets", &[], None::<&Value>)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Network(_)));
    }

    #[tokio::test]
    async fn json_path_surfaces_body_message_for_unhandled_status() {
        let mut transport = MockTransport::new();
        transport.expect_execute().returning(|_, _, _, _| {
            Ok(response(
                StatusCode::NOT_FOUND,
                r#"{"id": "not_found", "message": "The resource you were accessing could not be found."}"#,
            ))
        });

        let client = client_with(transport);
        let err = client
            .request_json::<Value, Value>(Verb::Get, "droplets/1", &[], None)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            Error::Api("The resource you were accessing could not be found.".to_string())
        );
    }

    #[tokio::test]
    async fn raw_path_returns_unhandled_statuses_to_caller() {
        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .returning(|_, _, _, _| Ok(response(StatusCode::NO_CONTENT, "")));

        let client = client_with(transport);
        let result = client
            .request_raw(Verb::Delete, "droplets/7", &[], None::<&Value>)
            .await
            .unwrap();
        assert_eq!(result.status, StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn json_path_rejects_undecodable_success_body() {
        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .returning(|_, _, _, _| Ok(response(StatusCode::OK, "<html></html>")));

        let client = client_with(transport);
        let err = client
            .request_json::<Value, Value>(Verb::Get, "droplets", &[], None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn debug_redacts_token() {
        let transport = MockTransport::new();
        let client = client_with(transport);
        let rendered = format!("{client:?}");
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("secret-token"));
    }
}

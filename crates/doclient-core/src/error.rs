//! Error types for DigitalOcean API operations.
//!
//! This module provides the error taxonomy raised by the request mediator and
//! the resource facade, including HTTP status code mapping and decoding of the
//! API's structured failure payloads.

use serde::Deserialize;
use thiserror::Error;

/// Main error type for DigitalOcean API operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The API rejected the credential (HTTP 401 or 403).
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// A caller supplied a malformed or unusable argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A well-formed request was rejected by the API, or the API itself
    /// failed. Carries the upstream message when one was returned.
    #[error("API error: {0}")]
    Api(String),

    /// A transport-level failure prevented the request from completing.
    #[error("Network error: {0}")]
    Network(String),

    /// Client configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A response body failed JSON decoding.
    #[error("Failed to parse API response: {0}")]
    Parse(String),
}

/// Specialized result type for DigitalOcean API operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns the error code for this error type.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Auth(_) => "AUTH_ERROR",
            Self::InvalidArgument(_) => "INVALID_ARGUMENT",
            Self::Api(_) => "API_ERROR",
            Self::Network(_) => "NETWORK_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Parse(_) => "PARSE_ERROR",
        }
    }

    /// Returns true if the error came back from the API itself rather than
    /// from caller input or the local environment.
    #[must_use]
    pub const fn is_remote(&self) -> bool {
        matches!(self, Self::Auth(_) | Self::Api(_))
    }
}

/// Structured failure payload returned by the API.
///
/// Failure responses carry a short identifier, a human-readable message, and
/// occasionally a request id for support tickets.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ApiErrorBody {
    /// Short error identifier, e.g. `unauthorized` or `not_found`.
    #[serde(default)]
    pub id: Option<String>,
    /// Human-readable error message.
    #[serde(default)]
    pub message: Option<String>,
    /// Request id for correlating with upstream logs.
    #[serde(default)]
    pub request_id: Option<String>,
}

impl ApiErrorBody {
    /// Extracts the `message` field from a failure body, when the body is
    /// JSON and carries one.
    #[must_use]
    pub fn message_from(body: &str) -> Option<String> {
        serde_json::from_str::<Self>(body)
            .ok()
            .and_then(|parsed| parsed.message)
            .filter(|message| !message.is_empty())
    }
}

// Conversions from external error types
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Parse(err.to_string())
        } else if err.is_builder() {
            Self::Config(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::InvalidArgument(err.to_string())
    }
}

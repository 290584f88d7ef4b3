//! Client configuration loaded via OrthoConfig.
//!
//! Values come from `CONSENT_CLIENT_*` environment variables and the optional
//! configuration file. Command-line flags are applied on top by the binary.

use std::fmt;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use crate::domain::{AccessToken, DEFAULT_POLL_INTERVAL};
use crate::outbound::http::{DEFAULT_API_BASE_URL, DEFAULT_REQUEST_TIMEOUT};

/// Reasons configured values cannot be used.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// The API base URL does not parse.
    #[error("invalid api base url `{value}`: {source}")]
    InvalidBaseUrl {
        /// Configured value.
        value: String,
        /// Parser failure.
        source: url::ParseError,
    },
}

/// Connection and polling settings for `consentctl`.
#[derive(Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "CONSENT_CLIENT")]
pub struct ClientSettings {
    /// Root of the marketplace REST API.
    pub api_base_url: Option<String>,
    /// Bearer token from a previous `login`.
    pub access_token: Option<String>,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: Option<u64>,
    /// Interval between invitation polls in seconds.
    pub poll_interval_secs: Option<u64>,
}

impl fmt::Debug for ClientSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientSettings")
            .field("api_base_url", &self.api_base_url)
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "<redacted>"),
            )
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("poll_interval_secs", &self.poll_interval_secs)
            .finish()
    }
}

impl ClientSettings {
    /// Parsed API base URL, falling back to [`DEFAULT_API_BASE_URL`].
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidBaseUrl`] when the value does not parse.
    pub fn api_base_url(&self) -> Result<Url, SettingsError> {
        let raw = self
            .api_base_url
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(DEFAULT_API_BASE_URL);
        Url::parse(raw).map_err(|source| SettingsError::InvalidBaseUrl {
            value: raw.to_owned(),
            source,
        })
    }

    /// Stored bearer token, if any.
    pub fn access_token(&self) -> Option<AccessToken> {
        self.access_token.clone().and_then(AccessToken::new)
    }

    /// Request timeout; zero falls back to the default.
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .map_or(DEFAULT_REQUEST_TIMEOUT, Duration::from_secs)
    }

    /// Poll interval; zero falls back to the default.
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval_secs
            .filter(|secs| *secs > 0)
            .map_or(DEFAULT_POLL_INTERVAL, Duration::from_secs)
    }
}

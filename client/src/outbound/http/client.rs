//! Reqwest plumbing shared by the marketplace REST adapters.
//!
//! This module owns transport details only: URL building, bearer
//! authentication, timeout and HTTP status mapping, and envelope decoding.

use std::time::Duration;

use reqwest::header::ACCEPT;
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde::de::{DeserializeOwned, IgnoredAny};
use tracing::debug;

use super::dto::Envelope;
use crate::domain::AccessToken;
use crate::domain::ports::StoreError;

/// Backend used when no base URL is configured.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api";
/// Per-request timeout used when none is configured.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const USER_AGENT: &str = concat!("consentctl/", env!("CARGO_PKG_VERSION"));

/// Reasons the HTTP client cannot be built.
#[derive(Debug, thiserror::Error)]
pub enum HttpClientError {
    /// The base URL cannot carry path segments (for example `mailto:`).
    #[error("api base url {0} cannot carry path segments")]
    InvalidBaseUrl(Url),
    /// Reqwest rejected the client configuration.
    #[error("failed to build http client: {0}")]
    Build(#[from] reqwest::Error),
}

/// Marketplace REST client implementing every store port.
#[derive(Debug, Clone)]
pub struct MarketplaceHttpClient {
    client: Client,
    base: Url,
}

impl MarketplaceHttpClient {
    /// Build a client rooted at `base` with an explicit request timeout.
    ///
    /// ```rust,ignore
    /// let base = Url::parse(DEFAULT_API_BASE_URL)?;
    /// let client = MarketplaceHttpClient::new(base, DEFAULT_REQUEST_TIMEOUT)?;
    /// ```
    /// # Errors
    ///
    /// Returns an error when `base` cannot be extended with path segments or
    /// the reqwest client cannot be constructed.
    pub fn new(base: Url, timeout: Duration) -> Result<Self, HttpClientError> {
        if base.cannot_be_a_base() {
            return Err(HttpClientError::InvalidBaseUrl(base));
        }
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client, base })
    }

    /// Root of every endpoint.
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Append percent-encoded `segments` to the base URL.
    pub(super) fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    pub(super) fn request(
        &self,
        method: Method,
        url: Url,
        token: Option<&AccessToken>,
    ) -> RequestBuilder {
        let builder = self
            .client
            .request(method, url)
            .header(ACCEPT, "application/json");
        match token {
            Some(token) => builder.bearer_auth(token.expose()),
            None => builder,
        }
    }

    /// Send `request` and decode the envelope's `data`.
    pub(super) async fn fetch<T>(&self, request: RequestBuilder) -> Result<T, StoreError>
    where
        T: DeserializeOwned,
    {
        let body = self.execute(request).await?;
        decode_data(&body)
    }

    /// Like [`Self::fetch`], mapping 404 to `None`.
    pub(super) async fn fetch_optional<T>(
        &self,
        request: RequestBuilder,
    ) -> Result<Option<T>, StoreError>
    where
        T: DeserializeOwned,
    {
        match self.fetch(request).await {
            Ok(data) => Ok(Some(data)),
            Err(StoreError::NotFound { .. }) => Ok(None),
            Err(other) => Err(other),
        }
    }

    /// Send `request`, checking only the envelope's `success` flag.
    pub(super) async fn acknowledge(&self, request: RequestBuilder) -> Result<(), StoreError> {
        let body = self.execute(request).await?;
        let envelope: Envelope<IgnoredAny> = serde_json::from_slice(&body).map_err(|error| {
            StoreError::decode(format!("invalid response envelope: {error}"))
        })?;
        envelope.into_ack()
    }

    async fn execute(&self, request: RequestBuilder) -> Result<Vec<u8>, StoreError> {
        let request = request.build().map_err(map_transport_error)?;
        let method = request.method().clone();
        let path = request.url().path().to_owned();
        let response = self
            .client
            .execute(request)
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        debug!(
            %method,
            path,
            status = status.as_u16(),
            bytes = body.len(),
            "marketplace request completed"
        );
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        Ok(body.to_vec())
    }
}

fn decode_data<T>(body: &[u8]) -> Result<T, StoreError>
where
    T: DeserializeOwned,
{
    let envelope: Envelope<T> = serde_json::from_slice(body)
        .map_err(|error| StoreError::decode(format!("invalid response envelope: {error}")))?;
    envelope.into_data()
}

fn map_transport_error(error: reqwest::Error) -> StoreError {
    if error.is_timeout() {
        StoreError::timeout(error.to_string())
    } else if error.is_decode() {
        StoreError::decode(error.to_string())
    } else {
        StoreError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> StoreError {
    let detail = error_detail(body);
    let message = if detail.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), detail)
    };

    match status {
        StatusCode::BAD_REQUEST => StoreError::validation(message),
        StatusCode::UNAUTHORIZED => StoreError::unauthenticated(message),
        StatusCode::FORBIDDEN => StoreError::not_authorized(message),
        StatusCode::NOT_FOUND => StoreError::not_found(message),
        StatusCode::CONFLICT => StoreError::conflict(message),
        StatusCode::UNPROCESSABLE_ENTITY => StoreError::invalid_transition(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => StoreError::timeout(message),
        _ => StoreError::transport(message),
    }
}

/// Prefer the envelope's `message`; fall back to a compact body preview.
fn error_detail(body: &[u8]) -> String {
    serde_json::from_slice::<Envelope<IgnoredAny>>(body)
        .ok()
        .and_then(|envelope| envelope.message)
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| body_preview(body))
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

//! Google Maps Platform clients for isochrone search.
//!
//! # Architecture
//!
//! [`GoogleMapsClient`] implements both oracle traits from `isochrone-core`:
//!
//! - [`TravelTimeOracle`](isochrone_core::TravelTimeOracle) via the Distance Matrix API
//!   ([`distance_matrix`])
//! - [`GeocodeOracle`](isochrone_core::GeocodeOracle) via the Geocoding API ([`geocoding`])
//!
//! Every call goes through the same pipeline:
//!
//! 1. Wait out the minimum call interval ([`CallSpacing`])
//! 2. Send with transport-level retries ([`retry`])
//! 3. Decode the JSON body and map the service status to [`OracleError`]
//!
//! # Security
//!
//! The API key travels in the query string. Request URLs are never logged and
//! transport errors are stripped of their URL before they surface.

pub mod distance_matrix;
pub mod geocoding;
pub mod retry;
mod throttle;

use std::time::Duration;

use isochrone_core::OracleError;
use isochrone_types::ApiKey;
use serde::de::DeserializeOwned;
use url::Url;

use retry::{RetryConfig, RetryOutcome, send_with_retry};
pub use throttle::CallSpacing;

/// Canonical Google Maps Platform base URL.
pub const GOOGLE_MAPS_API_BASE_URL: &str = "https://maps.googleapis.com/";

const CONNECT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MIN_CALL_INTERVAL_MS: u64 = 100;
const TCP_KEEPALIVE_SECS: u64 = 60;

const MAX_ERROR_BODY_BYTES: usize = 32 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("invalid base URL '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("base URL '{0}' cannot carry a path")]
    UnsupportedBaseUrl(String),
    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Connection settings for [`GoogleMapsClient`].
#[derive(Debug, Clone)]
pub struct GoogleMapsConfig {
    pub api_key: ApiKey,
    pub base_url: String,
    pub timeout: Duration,
    pub min_call_interval: Duration,
    pub retry: RetryConfig,
}

impl GoogleMapsConfig {
    #[must_use]
    pub fn new(api_key: ApiKey) -> Self {
        Self {
            api_key,
            base_url: GOOGLE_MAPS_API_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            min_call_interval: Duration::from_millis(DEFAULT_MIN_CALL_INTERVAL_MS),
            retry: RetryConfig::default(),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_min_call_interval(mut self, interval: Duration) -> Self {
        self.min_call_interval = interval;
        self
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }
}

/// Client for the Distance Matrix and Geocoding web services.
#[derive(Debug)]
pub struct GoogleMapsClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: ApiKey,
    retry: RetryConfig,
    spacing: CallSpacing,
}

impl GoogleMapsClient {
    pub fn new(config: GoogleMapsConfig) -> Result<Self, ClientError> {
        let base_url = parse_base_url(&config.base_url)?;
        let http = base_client_builder(base_url.scheme() == "https")
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            http,
            base_url,
            api_key: config.api_key,
            retry: config.retry,
            spacing: CallSpacing::new(config.min_call_interval),
        })
    }

    /// Endpoint URL for `path` with the API key already attached.
    fn endpoint(&self, path: &str) -> Result<Url, OracleError> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|e| OracleError::Rejected(format!("bad endpoint path '{path}': {e}")))?;
        url.query_pairs_mut()
            .append_pair("key", self.api_key.expose_secret());
        Ok(url)
    }

    /// Sends a GET and decodes the JSON body. `service` names the API in errors.
    async fn get_json<T>(&self, url: Url, service: &'static str) -> Result<T, OracleError>
    where
        T: DeserializeOwned,
    {
        self.spacing.wait().await;

        let outcome = send_with_retry(|| self.http.get(url.clone()), &self.retry).await;
        let response = match outcome {
            RetryOutcome::Success(response) => response,
            RetryOutcome::HttpError(response) => {
                let status = response.status();
                let body = read_capped_error_body(response).await;
                return Err(OracleError::Transport(format!(
                    "{service} HTTP {status}: {body}"
                )));
            }
            RetryOutcome::ConnectionError { attempts, source } => {
                return Err(OracleError::Transport(format!(
                    "{service} request failed after {attempts} attempts: {source}"
                )));
            }
            RetryOutcome::NonRetryable(e) => {
                return Err(OracleError::Transport(format!(
                    "{service} request failed: {e}"
                )));
            }
        };

        let bytes = response
            .bytes()
            .await
            .map_err(|e| OracleError::Transport(format!("{service}: {}", e.without_url())))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| OracleError::Malformed(format!("{service} response: {e}")))
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ClientError> {
    let mut url = Url::parse(raw.trim()).map_err(|source| ClientError::InvalidBaseUrl {
        url: raw.to_string(),
        source,
    })?;
    if url.cannot_be_a_base() {
        return Err(ClientError::UnsupportedBaseUrl(raw.to_string()));
    }
    // Url::join replaces the last segment unless the path ends in '/'
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    Ok(url)
}

fn base_client_builder(https_only: bool) -> reqwest::ClientBuilder {
    reqwest::Client::builder()
        .user_agent(concat!("isochrone/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .redirect(reqwest::redirect::Policy::none())
        .https_only(https_only)
        .tcp_keepalive(Some(Duration::from_secs(TCP_KEEPALIVE_SECS)))
}

pub async fn read_capped_error_body(response: reqwest::Response) -> String {
    use futures_util::StreamExt;
    let mut body = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let Ok(chunk) = chunk else { break };
        body.extend_from_slice(&chunk);
        if body.len() > MAX_ERROR_BODY_BYTES {
            body.truncate(MAX_ERROR_BODY_BYTES);
            let text = String::from_utf8_lossy(&body);
            return format!("{text}...(truncated)");
        }
    }
    String::from_utf8_lossy(&body).into_owned()
}

/// Maps a Google `status` field to a result, attaching `error_message` if any.
pub(crate) fn check_status(
    service: &'static str,
    status: &str,
    error_message: Option<String>,
) -> Result<(), OracleError> {
    if status == "OK" {
        return Ok(());
    }
    if let Some(message) = error_message.as_deref() {
        tracing::warn!(service, status, message, "Service returned non-OK status");
    } else {
        tracing::warn!(service, status, "Service returned non-OK status");
    }
    Err(OracleError::Status {
        service,
        status: status.to_string(),
        message: error_message,
    })
}

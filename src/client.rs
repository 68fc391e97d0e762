use crate::config::Config;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

pub const API_SYSTEM_RESOURCES: &str = "/api/diagnostics/system/system_resources";
pub const API_SYSTEM_DISK: &str = "/api/diagnostics/system/system_disk";

pub const API_TIMEOUT: Duration = Duration::from_secs(15);

const BODY_SNIPPET_CHARS: usize = 100;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("failed to initialise HTTP client: {0}")]
    Build(#[source] reqwest::Error),
    #[error(
        "API call timed out after {secs} seconds for {endpoint}. Check network connectivity and OPNsense load."
    )]
    Timeout { endpoint: String, secs: u64 },
    #[error("API call failed to {endpoint}: {source}")]
    Request {
        endpoint: String,
        source: reqwest::Error,
    },
    #[error("API call failed to {endpoint}: HTTP status {status}")]
    Status { endpoint: String, status: StatusCode },
    #[error(
        "Failed to decode JSON response from {endpoint}: {snippet}... Is the API key/secret correct?"
    )]
    Decode { endpoint: String, snippet: String },
}

pub struct ApiClient {
    http: Client,
    base_url: String,
    key: String,
    secret: String,
    timeout: Duration,
}

impl ApiClient {
    pub fn new(cfg: &Config) -> Result<Self, ApiError> {
        Self::with_base_url(cfg.base_url(), &cfg.key, &cfg.secret, API_TIMEOUT)
    }

    pub fn with_base_url(
        base_url: impl Into<String>,
        key: &str,
        secret: &str,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let http = Client::builder()
            .user_agent(concat!("check-opnsense/", env!("CARGO_PKG_VERSION")))
            .danger_accept_invalid_certs(true)
            .timeout(timeout)
            .build()
            .map_err(ApiError::Build)?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            key: key.to_string(),
            secret: secret.to_string(),
            timeout,
        })
    }

    pub async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!(%url, "api request");

        let response = self
            .http
            .get(&url)
            .basic_auth(&self.key, Some(&self.secret))
            .send()
            .await
            .map_err(|err| self.transport_error(endpoint, err))?;

        let status = response.status();
        if !status.is_success() {
            warn!(endpoint, status = %status, "api returned error status");
            return Err(ApiError::Status {
                endpoint: endpoint.to_string(),
                status,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|err| self.transport_error(endpoint, err))?;

        serde_json::from_str(&body).map_err(|err| {
            warn!(endpoint, error = %err, "api returned undecodable body");
            ApiError::Decode {
                endpoint: endpoint.to_string(),
                snippet: body.chars().take(BODY_SNIPPET_CHARS).collect(),
            }
        })
    }

    fn transport_error(&self, endpoint: &str, err: reqwest::Error) -> ApiError {
        warn!(endpoint, error = %err, "api call failed");
        if err.is_timeout() {
            ApiError::Timeout {
                endpoint: endpoint.to_string(),
                secs: self.timeout.as_secs(),
            }
        } else {
            ApiError::Request {
                endpoint: endpoint.to_string(),
                source: err,
            }
        }
    }
}

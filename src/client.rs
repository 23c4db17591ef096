//! Blocking client for the noema analysis endpoint.
//!
//! The TUI talks to `noema serve` (or any compatible deployment) through
//! `ApiClient`, which implements the same `Analyzer` trait as the
//! provider-backed analyzer.

use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

use crate::analyzer::{
    AUTH_MESSAGE, AnalysisError, Analyzer, RATE_LIMIT_MESSAGE, ensure_min_notes, parse_analysis,
};
use crate::config::{ConfigError, api_url_from_env};
use crate::models::AnalysisResult;

/// Banner text when the endpoint fails without a usable message.
pub const FALLBACK_MESSAGE: &str =
    "Failed to generate insights. Please check your API key and try again.";

/// Errors raised while constructing an `ApiClient`.
#[derive(Debug, Error)]
pub enum ApiClientError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to build HTTP client: {0}")]
    Http(#[source] reqwest::Error),
}

/// Builder for `ApiClient`.
///
/// The endpoint root resolves in this order: `base_url()`, `NOEMA_API_URL`,
/// then the `NOEMA_ENV` mode default.
#[derive(Debug, Default)]
pub struct ApiClientBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
}

impl ApiClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the endpoint root (e.g., "http://localhost:3000").
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the request timeout. Defaults to 120 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the `ApiClient`.
    ///
    /// # Errors
    ///
    /// Returns `ApiClientError::Config` when production mode has no URL and
    /// `ApiClientError::InvalidUrl` when the root does not parse.
    pub fn build(self) -> Result<ApiClient, ApiClientError> {
        let base_url = match self.base_url {
            Some(url) => url,
            None => api_url_from_env()?,
        };
        let base_url = base_url.trim().trim_end_matches('/').to_string();

        reqwest::Url::parse(&base_url)
            .map_err(|e| ApiClientError::InvalidUrl(format!("{}: {}", base_url, e)))?;

        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout.unwrap_or(Duration::from_secs(120)))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(ApiClientError::Http)?;

        Ok(ApiClient { client, base_url })
    }
}

/// Synchronous client for `POST {base}/api/analyze`.
pub struct ApiClient {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl ApiClient {
    /// Returns the endpoint root this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Analyzer for ApiClient {
    fn analyze(&self, notes: &[String]) -> Result<AnalysisResult, AnalysisError> {
        ensure_min_notes(notes)?;

        let url = format!("{}/api/analyze", self.base_url);
        debug!(url = %url, notes = notes.len(), "requesting analysis");

        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "notes": notes }))
            .send()
            .map_err(|e| {
                warn!(error = %e, "analysis endpoint unreachable");
                AnalysisError::failed(format!(
                    "Could not reach the analysis server at {}.",
                    self.base_url
                ))
            })?;

        let status = response.status();
        let body = response.text().map_err(|e| {
            warn!(error = %e, "failed to read analysis response");
            AnalysisError::failed(FALLBACK_MESSAGE)
        })?;

        if status.is_success() {
            return parse_analysis(&body);
        }

        let message = error_message(&body);
        warn!(status = status.as_u16(), message = ?message, "analysis request failed");

        Err(match status.as_u16() {
            400 => AnalysisError::TooFewNotes { count: notes.len() },
            401 => AnalysisError::Auth {
                message: message.unwrap_or_else(|| AUTH_MESSAGE.to_string()),
            },
            429 => AnalysisError::RateLimit {
                message: message.unwrap_or_else(|| RATE_LIMIT_MESSAGE.to_string()),
            },
            _ => AnalysisError::failed(message.unwrap_or_else(|| FALLBACK_MESSAGE.to_string())),
        })
    }
}

/// Reads the `error` field of an endpoint error body.
fn error_message(body: &str) -> Option<String> {
    let json: serde_json::Value = serde_json::from_str(body).ok()?;
    json.get("error")
        .and_then(|v| v.as_str())
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.to_string())
}

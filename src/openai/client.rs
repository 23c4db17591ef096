/// OpenAI HTTP client implementation.
///
/// This module provides `OpenAiClient` for making synchronous chat-completion
/// requests, along with error types and a builder for configuration.
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

/// Default API root used when neither the builder nor `OPENAI_BASE_URL` sets one.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default model used when neither the builder nor `OPENAI_MODEL` sets one.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Errors that can occur when interacting with the OpenAI API.
#[derive(Debug, Error)]
pub enum OpenAiError {
    /// Network-related errors (connection failures, DNS resolution, etc.)
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// Request or response timeout errors
    #[error("Request timed out")]
    Timeout(#[source] reqwest::Error),

    /// Non-success HTTP status, with the provider's error message when present
    #[error("HTTP error: status {status}: {message}")]
    Http { status: u16, message: String },

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[source] serde_json::Error),

    /// Response arrived but did not have the expected shape
    #[error("OpenAI API error: {message}")]
    Api { message: String },

    /// Invalid URL configuration error
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// No API key was configured
    #[error("OpenAI API key is not configured")]
    MissingApiKey,
}

impl OpenAiError {
    /// Returns the HTTP status for `Http` errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    fn from_reqwest(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout(error)
        } else {
            Self::Network(error)
        }
    }
}

/// A single chat-completion request: one system message and one user message.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub system: String,
    pub user: String,
    pub temperature: f64,
    pub max_tokens: u32,
    /// Ask the provider to return a JSON object.
    pub json_response: bool,
}

impl ChatRequest {
    /// Creates a request with temperature 1.0, 1024 max tokens and free-form output.
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            temperature: 1.0,
            max_tokens: 1024,
            json_response: false,
        }
    }

    fn to_body(&self, model: &str) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": model,
            "messages": [
                { "role": "system", "content": self.system },
                { "role": "user", "content": self.user },
            ],
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
        });
        if self.json_response {
            body["response_format"] = serde_json::json!({ "type": "json_object" });
        }
        body
    }
}

/// Builder for constructing `OpenAiClient` instances.
///
/// # Examples
///
/// ```
/// use noema::openai::OpenAiClientBuilder;
///
/// let client = OpenAiClientBuilder::new()
///     .base_url("http://localhost:8080/v1")
///     .api_key("sk-test")
///     .build()
///     .expect("Failed to create client");
/// assert!(client.has_api_key());
/// ```
#[derive(Debug, Default)]
pub struct OpenAiClientBuilder {
    base_url: Option<String>,
    api_key: Option<String>,
    model: Option<String>,
}

impl OpenAiClientBuilder {
    /// Creates a new `OpenAiClientBuilder` with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API root (e.g., "https://api.openai.com/v1").
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the bearer token sent with every request.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the model name (e.g., "gpt-4o-mini").
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Builds the `OpenAiClient` with the configured settings.
    ///
    /// # Environment Variables
    ///
    /// Unset builder values fall back to `OPENAI_BASE_URL`, `OPENAI_API_KEY`
    /// and `OPENAI_MODEL`, then to the crate defaults. A missing API key is
    /// not a build error; requests fail with `OpenAiError::MissingApiKey`.
    ///
    /// # Errors
    ///
    /// Returns `OpenAiError::InvalidUrl` if the base URL does not parse.
    pub fn build(self) -> Result<OpenAiClient, OpenAiError> {
        let base_url = self
            .base_url
            .or_else(|| std::env::var("OPENAI_BASE_URL").ok())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = base_url.trim_end_matches('/').to_string();

        let api_key = self
            .api_key
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .filter(|key| !key.trim().is_empty());

        let model = self
            .model
            .or_else(|| std::env::var("OPENAI_MODEL").ok())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        reqwest::Url::parse(&base_url)
            .map_err(|e| OpenAiError::InvalidUrl(format!("{}: {}", base_url, e)))?;

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(120))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(OpenAiError::Network)?;

        Ok(OpenAiClient {
            client,
            base_url,
            api_key,
            model,
        })
    }
}

/// Synchronous HTTP client for the OpenAI chat-completions API.
///
/// It should be constructed using `OpenAiClientBuilder`. Calls are never
/// retried; every failure is returned to the caller as-is.
pub struct OpenAiClient {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

/// Trait for chat-completion operations.
///
/// This trait enables mocking in unit tests and keeps the analyzer
/// independent of the transport.
pub trait ChatClientTrait: Send + Sync {
    /// Sends one chat-completion request and returns the assistant message text.
    fn complete(&self, model: &str, request: &ChatRequest) -> Result<String, OpenAiError>;
}

impl OpenAiClient {
    /// Returns the API root configured for this client.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the model name configured for this client.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Returns whether an API key is configured.
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn complete_internal(&self, model: &str, request: &ChatRequest) -> Result<String, OpenAiError> {
        let api_key = self.api_key.as_deref().ok_or(OpenAiError::MissingApiKey)?;
        let url = format!("{}/chat/completions", self.base_url);

        debug!(model, url = %url, "sending chat completion request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&request.to_body(model))
            .send()
            .map_err(OpenAiError::from_reqwest)?;

        let status = response.status();
        let text = response.text().map_err(OpenAiError::from_reqwest)?;

        if !status.is_success() {
            let message = provider_error_message(&text)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());
            warn!(status = status.as_u16(), %message, "chat completion failed");
            return Err(OpenAiError::Http {
                status: status.as_u16(),
                message,
            });
        }

        let json: serde_json::Value =
            serde_json::from_str(&text).map_err(OpenAiError::Serialization)?;

        extract_message_content(&json)
    }
}

impl ChatClientTrait for OpenAiClient {
    fn complete(&self, model: &str, request: &ChatRequest) -> Result<String, OpenAiError> {
        self.complete_internal(model, request)
    }
}

/// Pulls `choices[0].message.content` out of a chat-completion response.
fn extract_message_content(json: &serde_json::Value) -> Result<String, OpenAiError> {
    json.pointer("/choices/0/message/content")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| OpenAiError::Api {
            message: "Missing 'choices[0].message.content' in API response".to_string(),
        })
}

/// Reads `error.message` from a provider error body, if it has one.
fn provider_error_message(body: &str) -> Option<String> {
    let json: serde_json::Value = serde_json::from_str(body).ok()?;
    json.pointer("/error/message")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

//! Environment-driven configuration.
//!
//! `.env` is loaded by the binary before anything here runs, so every value
//! below may come from the process environment or that file.

use std::str::FromStr;

use thiserror::Error;

/// Port the server listens on when neither `--port` nor `PORT` is set.
pub const DEFAULT_PORT: u16 = 3000;

/// Endpoint root used in development mode.
pub const DEVELOPMENT_API_URL: &str = "http://localhost:3000";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid NOEMA_ENV '{0}': expected 'development' or 'production'")]
    InvalidMode(String),

    #[error("NOEMA_API_URL must be set when NOEMA_ENV=production")]
    MissingProductionUrl,

    #[error("Invalid PORT '{0}': expected a number between 1 and 65535")]
    InvalidPort(String),
}

/// Deployment mode selecting the analysis endpoint root.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ApiMode {
    #[default]
    Development,
    Production,
}

impl FromStr for ApiMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "dev" | "development" => Ok(Self::Development),
            "prod" | "production" => Ok(Self::Production),
            _ => Err(ConfigError::InvalidMode(s.to_string())),
        }
    }
}

impl ApiMode {
    /// Reads `NOEMA_ENV`, defaulting to development.
    pub fn from_env() -> Result<Self, ConfigError> {
        std::env::var("NOEMA_ENV")
            .map(|value| value.parse())
            .unwrap_or(Ok(Self::Development))
    }
}

/// Resolves the analysis endpoint root.
///
/// `NOEMA_API_URL` wins when set. Otherwise development mode uses
/// `DEVELOPMENT_API_URL` and production mode is an error.
pub fn api_url_from_env() -> Result<String, ConfigError> {
    if let Ok(url) = std::env::var("NOEMA_API_URL")
        && !url.trim().is_empty()
    {
        return Ok(url.trim().to_string());
    }

    match ApiMode::from_env()? {
        ApiMode::Development => Ok(DEVELOPMENT_API_URL.to_string()),
        ApiMode::Production => Err(ConfigError::MissingProductionUrl),
    }
}

/// Settings for `noema serve`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: DEFAULT_PORT }
    }
}

impl ServerConfig {
    /// Reads `PORT`, falling back to `DEFAULT_PORT`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = match std::env::var("PORT") {
            Ok(raw) if !raw.trim().is_empty() => parse_port(&raw)?,
            _ => DEFAULT_PORT,
        };
        Ok(Self { port })
    }

    /// Overrides the port when one was given on the command line.
    pub fn with_port(mut self, port: Option<u16>) -> Self {
        if let Some(port) = port {
            self.port = port;
        }
        self
    }
}

fn parse_port(raw: &str) -> Result<u16, ConfigError> {
    match raw.trim().parse::<u16>() {
        Ok(0) | Err(_) => Err(ConfigError::InvalidPort(raw.to_string())),
        Ok(port) => Ok(port),
    }
}

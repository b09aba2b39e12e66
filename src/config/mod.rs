//! Configuration management for the loan client
//!
//! Configuration is read from environment variables, with an optional `.env`
//! file, and supports different environments (development, staging, production).

use std::env;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Largest page size the loan API accepts
pub const MAX_PAGE_SIZE: u32 = 100;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid environment value: {0}")]
    InvalidValue(String),
}

/// Application environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    /// Parse environment from string
    pub fn from_str(s: &str) -> Result<Self, ConfigError> {
        match s.to_lowercase().as_str() {
            "dev" | "development" => Ok(Environment::Development),
            "staging" => Ok(Environment::Staging),
            "prod" | "production" => Ok(Environment::Production),
            _ => Err(ConfigError::InvalidValue(format!(
                "Invalid environment: '{}'. Expected: dev, staging, or prod",
                s
            ))),
        }
    }

    /// Check if this is a production environment
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    /// Get the environment name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }
}

/// Client configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the loan-servicing API, always ending in `/`
    pub api_base_url: String,

    /// Current environment
    pub environment: Environment,

    /// Per-request timeout handed to the HTTP client
    pub request_timeout: Duration,

    /// Page size for loan list requests
    pub page_size: u32,

    /// Where the session token is kept between runs
    pub token_store_path: PathBuf,

    /// Clear list filters when a fetch fails while data is already shown
    pub reset_filters_on_error: bool,

    /// Log level (RUST_LOG)
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors)
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .map(|s| Environment::from_str(&s))
            .unwrap_or(Ok(Environment::Development))?;

        let api_base_url = env::var("LOAN_API_BASE_URL")
            .map_err(|_| ConfigError::MissingEnvVar("LOAN_API_BASE_URL".to_string()))?;
        let api_base_url = normalize_base_url(&api_base_url)?;

        if environment.is_production() && !api_base_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue(
                "LOAN_API_BASE_URL must use https in production".to_string(),
            ));
        }

        let timeout_seconds = env::var("LOAN_API_TIMEOUT_SECONDS")
            .unwrap_or_else(|_| "30".to_string())
            .parse::<u64>()
            .unwrap_or(30);

        let page_size = env::var("LOAN_PAGE_SIZE")
            .unwrap_or_else(|_| "20".to_string())
            .parse::<u32>()
            .map_err(|_| {
                ConfigError::InvalidValue("LOAN_PAGE_SIZE must be a valid number".to_string())
            })?;
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(ConfigError::InvalidValue(format!(
                "LOAN_PAGE_SIZE must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }

        let token_store_path = env::var("TOKEN_STORE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(".loanbook/token.json"));

        let reset_filters_on_error = env::var("RESET_FILTERS_ON_ERROR")
            .map(|s| !matches!(s.to_lowercase().as_str(), "0" | "false" | "no" | "off"))
            .unwrap_or(true);

        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Ok(Config {
            api_base_url,
            environment,
            request_timeout: Duration::from_secs(timeout_seconds),
            page_size,
            token_store_path,
            reset_filters_on_error,
            log_level,
        })
    }

    /// Configuration pointing at `base_url` with defaults for everything else
    pub fn for_base_url(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Config {
            api_base_url: normalize_base_url(base_url)?,
            environment: Environment::Development,
            request_timeout: Duration::from_secs(30),
            page_size: 20,
            token_store_path: PathBuf::from(".loanbook/token.json"),
            reset_filters_on_error: true,
            log_level: "info".to_string(),
        })
    }
}

/// Validate the scheme and make sure relative paths join under the base
fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim();
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(ConfigError::InvalidValue(format!(
            "Invalid API base URL: '{}'. Expected an http(s) URL",
            trimmed
        )));
    }
    if trimmed.ends_with('/') {
        Ok(trimmed.to_string())
    } else {
        Ok(format!("{}/", trimmed))
    }
}

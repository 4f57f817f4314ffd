//! Configuration management for the openHAB MCP server

use crate::error::{OpenHabError, Result};
use serde::{Deserialize, Serialize};
use std::{env, time::Duration};
use url::Url;

/// Authentication method used against the openHAB REST API
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum AuthMethod {
    /// Bearer API token (recommended)
    Token,
    /// Basic HTTP authentication with username and password
    Basic,
    /// Unauthenticated access (openHAB with auth disabled)
    None,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// openHAB instance configuration
    pub openhab: OpenHabConfig,
}

/// openHAB instance configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenHabConfig {
    /// Base URL of the openHAB instance (e.g. "http://192.168.1.10:8080")
    pub url: Url,

    /// API token for bearer authentication
    #[serde(default)]
    pub api_token: Option<String>,

    /// Username for basic authentication
    #[serde(default)]
    pub username: Option<String>,

    /// Password for basic authentication
    #[serde(default)]
    pub password: Option<String>,

    /// Per-request timeout
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,

    /// Maximum number of retries for idempotent requests
    pub max_retries: u32,

    /// Enable SSL/TLS certificate verification
    pub verify_ssl: bool,

    /// Upper bound for the `limit` parameter of listing tools; larger
    /// requested limits are clamped, not rejected
    #[serde(default = "default_max_page_size")]
    pub max_page_size: usize,
}

fn default_max_page_size() -> usize {
    500
}

impl Default for OpenHabConfig {
    fn default() -> Self {
        Self {
            url: Url::parse("http://localhost:8080").expect("valid default URL"),
            api_token: None,
            username: None,
            password: None,
            timeout: Duration::from_secs(30),
            max_retries: 3,
            verify_ssl: true,
            max_page_size: default_max_page_size(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            openhab: OpenHabConfig::default(),
        }
    }
}

impl OpenHabConfig {
    /// Authentication method derived from which credentials are present.
    /// A token takes precedence over basic credentials.
    pub fn auth_method(&self) -> AuthMethod {
        if self.api_token.is_some() {
            AuthMethod::Token
        } else if self.username.is_some() && self.password.is_some() {
            AuthMethod::Basic
        } else {
            AuthMethod::None
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// Recognized variables: `OPENHAB_URL`, `OPENHAB_API_TOKEN`,
    /// `OPENHAB_USERNAME`, `OPENHAB_PASSWORD`, `OPENHAB_TIMEOUT_SECS`,
    /// `OPENHAB_MAX_RETRIES`, `OPENHAB_VERIFY_SSL`, `OPENHAB_MAX_PAGE_SIZE`.
    pub fn from_env() -> Result<Self> {
        let mut openhab = OpenHabConfig::default();

        if let Ok(raw) = env::var("OPENHAB_URL") {
            openhab.url = Url::parse(&raw)
                .map_err(|e| OpenHabError::config(format!("Invalid OPENHAB_URL '{raw}': {e}")))?;
        }
        openhab.api_token = env::var("OPENHAB_API_TOKEN").ok().filter(|v| !v.is_empty());
        openhab.username = env::var("OPENHAB_USERNAME").ok().filter(|v| !v.is_empty());
        openhab.password = env::var("OPENHAB_PASSWORD").ok().filter(|v| !v.is_empty());

        if let Ok(raw) = env::var("OPENHAB_TIMEOUT_SECS") {
            let secs: u64 = raw.parse().map_err(|_| {
                OpenHabError::config(format!("Invalid OPENHAB_TIMEOUT_SECS '{raw}'"))
            })?;
            openhab.timeout = Duration::from_secs(secs);
        }
        if let Ok(raw) = env::var("OPENHAB_MAX_RETRIES") {
            openhab.max_retries = raw.parse().map_err(|_| {
                OpenHabError::config(format!("Invalid OPENHAB_MAX_RETRIES '{raw}'"))
            })?;
        }
        if let Ok(raw) = env::var("OPENHAB_VERIFY_SSL") {
            openhab.verify_ssl = matches!(raw.to_lowercase().as_str(), "1" | "true" | "yes");
        }
        if let Ok(raw) = env::var("OPENHAB_MAX_PAGE_SIZE") {
            openhab.max_page_size = raw.parse().map_err(|_| {
                OpenHabError::config(format!("Invalid OPENHAB_MAX_PAGE_SIZE '{raw}'"))
            })?;
        }

        let config = Self { openhab };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let openhab = &self.openhab;

        match openhab.url.scheme() {
            "http" | "https" => {}
            scheme => {
                return Err(OpenHabError::config(format!(
                    "Unsupported URL scheme '{scheme}', expected http or https"
                )));
            }
        }

        if openhab.timeout.is_zero() {
            return Err(OpenHabError::config("Timeout must be greater than zero"));
        }

        if openhab.max_page_size == 0 {
            return Err(OpenHabError::config("max_page_size must be greater than zero"));
        }

        // Basic auth needs both halves
        if openhab.username.is_some() != openhab.password.is_some() {
            return Err(OpenHabError::config(
                "Basic authentication requires both OPENHAB_USERNAME and OPENHAB_PASSWORD",
            ));
        }

        Ok(())
    }
}

//! Client configuration

use crate::error::{Result, SdkError};
use reqwest::Url;
use std::fmt;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.ctl.io/v2/";

const DEFAULT_USER_AGENT: &str = concat!("clc-exec/", env!("CARGO_PKG_VERSION"));

/// Connection settings for the CLC v2 API
#[derive(Clone)]
pub struct ApiConfig {
    pub username: String,
    pub password: String,
    /// Account alias; filled from the login response when empty
    pub alias: String,
    /// Data center alias; filled from the login response when empty
    pub location: String,
    pub base_url: Url,
    pub user_agent: String,
    pub request_timeout: Duration,
}

impl ApiConfig {
    /// Create a config against the public endpoint
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        alias: impl Into<String>,
        location: impl Into<String>,
    ) -> Result<Self> {
        let username = username.into();
        let password = password.into();

        if username.is_empty() {
            return Err(SdkError::InvalidConfig("username must not be empty".to_string()));
        }
        if password.is_empty() {
            return Err(SdkError::InvalidConfig("password must not be empty".to_string()));
        }

        Ok(Self {
            username,
            password,
            alias: alias.into(),
            location: location.into(),
            base_url: parse_base_url(DEFAULT_BASE_URL)?,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout: Duration::from_secs(60),
        })
    }

    /// Point the client at another endpoint (e.g. `CLC_BASE_URL`)
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self> {
        self.base_url = parse_base_url(base_url)?;
        Ok(self)
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Resolve a path relative to the base URL
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| SdkError::InvalidConfig(format!("invalid endpoint path {}: {}", path, e)))
    }
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("username", &self.username)
            .field("password", &"********")
            .field("alias", &self.alias)
            .field("location", &self.location)
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}

fn parse_base_url(raw: &str) -> Result<Url> {
    // Url::join drops the last segment unless the base ends with '/'
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{}/", raw)
    };

    let url = Url::parse(&normalized)
        .map_err(|e| SdkError::InvalidConfig(format!("invalid base URL {}: {}", raw, e)))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(SdkError::InvalidConfig(format!(
            "unsupported base URL scheme: {}",
            other
        ))),
    }
}

//! CLC v2 API client
//!
//! Bearer-token authenticated JSON client. `authenticate` must succeed before
//! any other call; the token is kept on the client for the rest of its life.

use crate::config::ApiConfig;
use crate::error::{Result, SdkError};
use crate::poll::PollConfig;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Authenticated CLC API client
#[derive(Clone)]
pub struct ClcClient {
    http: reqwest::Client,
    config: ApiConfig,
    session: Option<Session>,
    poll_config: PollConfig,
}

/// Login result returned by `authentication/login`
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user_name: String,
    pub account_alias: String,
    #[serde(default)]
    pub location_alias: String,
    #[serde(default)]
    pub roles: Vec<String>,
    pub bearer_token: String,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user_name", &self.user_name)
            .field("account_alias", &self.account_alias)
            .field("location_alias", &self.location_alias)
            .field("roles", &self.roles)
            .finish_non_exhaustive()
    }
}

impl ClcClient {
    /// Create an unauthenticated client
    pub fn new(config: ApiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            http,
            config,
            session: None,
            poll_config: PollConfig::default(),
        })
    }

    pub fn with_poll_config(mut self, poll_config: PollConfig) -> Self {
        self.poll_config = poll_config;
        self
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn poll_config(&self) -> &PollConfig {
        &self.poll_config
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Account alias used in operation paths
    pub fn alias(&self) -> &str {
        &self.config.alias
    }

    /// Log in and keep the bearer token for subsequent calls
    pub async fn authenticate(&mut self) -> Result<&Session> {
        let url = self.config.endpoint("authentication/login")?;
        let body = LoginRequest {
            username: &self.config.username,
            password: &self.config.password,
        };

        tracing::debug!("Authenticating as {} against {}", self.config.username, url);

        let response = self.http.post(url).json(&body).send().await?;
        let status = response.status();

        if status == StatusCode::BAD_REQUEST || status == StatusCode::UNAUTHORIZED {
            let message = error_message(status, &response.text().await.unwrap_or_default());
            return Err(SdkError::AuthenticationFailed(message));
        }
        if !status.is_success() {
            let message = error_message(status, &response.text().await.unwrap_or_default());
            return Err(SdkError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let session: Session = response.json().await?;

        if self.config.alias.is_empty() {
            self.config.alias = session.account_alias.clone();
        }
        if self.config.location.is_empty() {
            self.config.location = session.location_alias.clone();
        }

        tracing::info!(
            "Authenticated as {} (account {}, location {})",
            session.user_name,
            self.config.alias,
            self.config.location
        );

        Ok(&*self.session.insert(session))
    }

    /// Build an authenticated request for a path below the base URL
    pub(crate) fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let session = self.session.as_ref().ok_or(SdkError::NotAuthenticated)?;
        let url = self.config.endpoint(path)?;
        Ok(self
            .http
            .request(method, url)
            .bearer_auth(&session.bearer_token))
    }

    /// Send a request and decode a JSON body, mapping non-2xx to `SdkError::Api`
    pub(crate) async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SdkError::Api {
                status: status.as_u16(),
                message: error_message(status, &body),
            });
        }

        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Prefer the API's `message` field, fall back to the raw body or reason
fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ApiErrorBody>(body) {
        return parsed.message;
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string()
    } else {
        trimmed.to_string()
    }
}

//! Client abstraction used by the provisioner
//!
//! The provisioner only talks to the API through these traits so that the
//! workflow can run against an in-memory fake as well as the HTTP client.

use crate::client::ClcClient;
use crate::config::ApiConfig;
use crate::error::Result;
use crate::poll::PollConfig;
use crate::server::{Package, QueuedOperation};
use crate::status::StatusUpdate;
use async_trait::async_trait;
use std::fmt;
use std::time::Duration;
use tokio::sync::mpsc;

/// Operations the package provisioner needs from the CLC API
#[async_trait]
pub trait ClcApi: Send + Sync {
    async fn authenticate(&mut self) -> Result<()>;

    async fn execute_package(
        &self,
        package: &Package,
        server_id: &str,
    ) -> Result<Vec<QueuedOperation>>;

    /// Register for the terminal status of `id`; see [`ClcClient::poll`]
    async fn poll_status(&self, id: &str, tx: mpsc::Sender<StatusUpdate>) -> Result<()>;
}

/// Builds API clients from user credentials
pub trait Connector: Send + Sync {
    type Client: ClcApi;

    fn connect(&self, credentials: &Credentials) -> Result<Self::Client>;
}

/// Credentials for one provisioning run
#[derive(Clone, Default)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    pub account: String,
}

impl Credentials {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        account: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            account: account.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"********")
            .field("account", &self.account)
            .finish()
    }
}

#[async_trait]
impl ClcApi for ClcClient {
    async fn authenticate(&mut self) -> Result<()> {
        ClcClient::authenticate(self).await?;
        Ok(())
    }

    async fn execute_package(
        &self,
        package: &Package,
        server_id: &str,
    ) -> Result<Vec<QueuedOperation>> {
        ClcClient::execute_package(self, package, &[server_id]).await
    }

    async fn poll_status(&self, id: &str, tx: mpsc::Sender<StatusUpdate>) -> Result<()> {
        self.poll(id, tx).await
    }
}

/// Connector producing [`ClcClient`]s
#[derive(Debug, Clone, Default)]
pub struct HttpConnector {
    /// Endpoint override; the public API is used when `None`
    pub base_url: Option<String>,
    /// Per-request HTTP timeout; `ApiConfig`'s default when `None`
    pub request_timeout: Option<Duration>,
    pub poll_config: PollConfig,
}

impl HttpConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn with_poll_config(mut self, poll_config: PollConfig) -> Self {
        self.poll_config = poll_config;
        self
    }
}

impl Connector for HttpConnector {
    type Client = ClcClient;

    fn connect(&self, credentials: &Credentials) -> Result<ClcClient> {
        let mut config = ApiConfig::new(
            &credentials.username,
            &credentials.password,
            &credentials.account,
            "",
        )?;
        if let Some(base_url) = &self.base_url {
            config = config.with_base_url(base_url)?;
        }
        if let Some(timeout) = self.request_timeout {
            config = config.with_request_timeout(timeout);
        }

        Ok(ClcClient::new(config)?.with_poll_config(self.poll_config.clone()))
    }
}

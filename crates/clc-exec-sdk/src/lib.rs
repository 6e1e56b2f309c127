//! CenturyLink Cloud v2 API client for clc-exec
//!
//! Covers the slice of the CLC control plane a package provisioner needs:
//!
//! - Login with username/password to obtain a bearer token
//! - Execute a blueprint package on one or more servers
//! - Read and poll the status of a queued operation
//!
//! # Example
//!
//! ```ignore
//! use clc_exec_sdk::{ApiConfig, ClcClient, Package};
//!
//! let config = ApiConfig::new("user", "secret", "ACME", "")?;
//! let mut client = ClcClient::new(config)?;
//! client.authenticate().await?;
//!
//! let package = Package::new("PKG1");
//! let queued = client.execute_package(&package, &["WA1ACMEWEB01"]).await?;
//!
//! let (tx, mut rx) = tokio::sync::mpsc::channel(1);
//! if let Some(id) = queued[0].status_id() {
//!     client.poll(id, tx).await?;
//!     let status = rx.recv().await;
//! }
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod poll;
pub mod server;
pub mod status;

pub use api::{ClcApi, Connector, Credentials, HttpConnector};
pub use client::{ClcClient, Session};
pub use config::{ApiConfig, DEFAULT_BASE_URL};
pub use error::{Result, SdkError};
pub use poll::{PollConfig, RetryConfig};
pub use server::{Link, Package, QueuedOperation};
pub use status::{JobStatus, StatusResponse, StatusUpdate};

//! clc_exec provisioner
//!
//! Runs a CenturyLink Cloud blueprint package on the server a host runtime
//! just created, and waits for the queued operation to finish.
//!
//! # Workflow
//!
//! ```text
//! Init -> Authenticated -> Submitted -> Queued -> Polling -> Succeeded
//!   \__________\_______________\__________\_________\______> Failed
//! ```
//!
//! # Configuration
//!
//! | key            | required | fallback        |
//! |----------------|----------|-----------------|
//! | `username`     | yes      | `CLC_USERNAME`  |
//! | `password`     | yes      | `CLC_PASSWORD`  |
//! | `account`      | yes      | `CLC_ACCOUNT`   |
//! | `package`      | yes      |                 |
//! | `parameters.*` | no       |                 |
//!
//! # Example
//!
//! ```ignore
//! use clc_exec::ClcExecProvisioner;
//! use clc_exec_host::{BufferedOutput, InstanceState, ResourceConfig, ResourceProvisioner};
//!
//! let provisioner = ClcExecProvisioner::from_env();
//! let config = ResourceConfig::from_value(serde_json::json!({
//!     "username": "user",
//!     "password": "secret",
//!     "account": "ACME",
//!     "package": "PKG1",
//! }))?;
//!
//! let output = BufferedOutput::new();
//! provisioner.apply(&output, &InstanceState::new("WA1ACMEWEB01"), &config).await?;
//! ```

pub mod config;
pub mod env;
pub mod error;
pub mod provisioner;

pub use config::{PROVISIONER_NAME, ProvisionerConfig, decode_config};
pub use env::{BASE_URL_ENV, ENV_OVERRIDES, EnvReader, SystemEnv, merge_env_overrides};
pub use error::{ProvisionError, Result};
pub use provisioner::{ClcExecProvisioner, wait_status};

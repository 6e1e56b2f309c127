//! clc-exec host contract
//!
//! This crate models the contract a provisioner host (Terraform) offers to a
//! resource provisioner: the declarative resource configuration, the state of
//! the instance being provisioned, and a sink for human-readable progress.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                   host runtime                   │
//! │        validate(config) / apply(output, ...)     │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │                 clc-exec-host                    │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │  trait ResourceProvisioner { ... }        │   │
//! │  └──────────────────────────────────────────┘   │
//! │  ┌──────────────┐  ┌──────────────┐            │
//! │  │ResourceConfig│  │  Validator   │            │
//! │  └──────────────┘  └──────────────┘            │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//!           ┌───────▼───────┐
//!           │   clc-exec    │
//!           │  provisioner  │
//!           └───────────────┘
//! ```

pub mod config;
pub mod error;
pub mod output;
pub mod provisioner;
pub mod state;
pub mod validator;

// Re-exports
pub use config::ResourceConfig;
pub use error::{HostError, Result, ValidationError};
pub use output::{BufferedOutput, UiOutput};
pub use provisioner::ResourceProvisioner;
pub use state::InstanceState;
pub use validator::Validator;

//! Provisioner error types

use clc_exec_sdk::{JobStatus, SdkError};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProvisionError {
    #[error("Failed to decode clc_exec configuration: {0}")]
    Decode(String),

    #[error("Unknown clc_exec configuration keys: {}", .0.join(", "))]
    UnknownKeys(Vec<String>),

    #[error("Required configuration field '{0}' is empty")]
    EmptyField(&'static str),

    #[error("No server id in instance state to execute the package on")]
    MissingServerId,

    #[error("Failed to create CLC config with provided details: {0}")]
    ClientConfig(#[source] SdkError),

    #[error("Failed to authenticate with provided credentials: {0}")]
    Authentication(#[source] SdkError),

    #[error("Failed executing package {package}: {source}")]
    Submission {
        package: String,
        #[source]
        source: SdkError,
    },

    #[error("Failed executing package {package}: empty response for server {server}")]
    EmptyResponse { package: String, server: String },

    #[error("Failed executing package {package}: server {server} did not queue the operation: {reason}")]
    NotQueued {
        package: String,
        server: String,
        reason: String,
    },

    #[error("Failed extracting status to poll on for server {server}")]
    StatusUnavailable { server: String },

    #[error("Failed to start polling status {id}: {source}")]
    StatusRegistration {
        id: String,
        #[source]
        source: SdkError,
    },

    #[error("Failed polling status {id}: {source}")]
    StatusPoll {
        id: String,
        #[source]
        source: SdkError,
    },

    #[error("Status poll for {id} ended without a result")]
    StatusChannelClosed { id: String },

    #[error("Timed out after {timeout:?} waiting for job {id}")]
    Timeout { id: String, timeout: Duration },

    #[error("unsuccessful job {id} failed with status: {status}")]
    JobFailed { id: String, status: JobStatus },
}

pub type Result<T> = std::result::Result<T, ProvisionError>;

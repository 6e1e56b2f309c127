//! Host contract error types

use thiserror::Error;

/// Errors raised while building host-side values
#[derive(Error, Debug)]
pub enum HostError {
    #[error("Invalid resource configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, HostError>;

/// A single validation finding, reported against a configuration key
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{key}: {message}")]
pub struct ValidationError {
    pub key: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            message: message.into(),
        }
    }
}

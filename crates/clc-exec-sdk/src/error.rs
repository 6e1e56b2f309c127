//! CLC API error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SdkError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Client is not authenticated")]
    NotAuthenticated,

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Status poll for {id} gave up after {attempts} failed attempts: {message}")]
    PollFailed {
        id: String,
        attempts: u32,
        message: String,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SdkError>;

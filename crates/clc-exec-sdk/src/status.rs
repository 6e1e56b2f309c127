//! Operation status

use crate::client::ClcClient;
use crate::error::Result;
use reqwest::Method;
use serde::{Deserialize, Serialize};

/// State of a queued operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum JobStatus {
    NotStarted,
    Executing,
    Resumed,
    Succeeded,
    Failed,
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::NotStarted => write!(f, "notStarted"),
            JobStatus::Executing => write!(f, "executing"),
            JobStatus::Resumed => write!(f, "resumed"),
            JobStatus::Succeeded => write!(f, "succeeded"),
            JobStatus::Failed => write!(f, "failed"),
            JobStatus::Unknown => write!(f, "unknown"),
        }
    }
}

/// Body of `operations/{alias}/status/{id}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: JobStatus,
}

impl StatusResponse {
    pub fn new(status: JobStatus) -> Self {
        Self { status }
    }

    /// Whether the operation reached a terminal state
    pub fn is_complete(&self) -> bool {
        matches!(self.status, JobStatus::Succeeded | JobStatus::Failed)
    }

    pub fn failed(&self) -> bool {
        self.status == JobStatus::Failed
    }
}

/// Message delivered by the poller: a terminal status or the error that ended polling
pub type StatusUpdate = Result<StatusResponse>;

impl ClcClient {
    /// Read the current status of an operation once
    pub async fn get_status(&self, id: &str) -> Result<StatusResponse> {
        let path = format!("operations/{}/status/{}", self.alias(), id);
        let request = self.request(Method::GET, &path)?;
        self.send(request).await
    }
}

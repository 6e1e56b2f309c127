//! Status polling
//!
//! `ClcClient::poll` reads the status once to register the operation, then
//! hands the rest of the wait to a background task that delivers exactly one
//! `StatusUpdate` on the caller's channel. Transient read failures are retried
//! with exponential backoff; once the retry budget is spent the task delivers
//! `SdkError::PollFailed` instead of a status.

use crate::client::ClcClient;
use crate::error::{Result, SdkError};
use crate::status::StatusUpdate;
use std::time::Duration;
use tokio::sync::mpsc;

/// Polling cadence for queued operations
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Delay between successful status reads
    pub interval: Duration,

    /// Backoff applied after failed status reads
    pub retry: RetryConfig,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            retry: RetryConfig::default(),
        }
    }
}

impl PollConfig {
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}

/// Retry configuration for status reads
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Consecutive failures tolerated before giving up
    pub max_attempts: u32,

    /// Initial delay between retries
    pub initial_delay: Duration,

    /// Maximum delay between retries
    pub max_delay: Duration,

    /// Backoff multiplier
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// Delay before retry number `attempt` (0-based), capped at `max_delay`
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = self.backoff_multiplier.powi(attempt as i32);
        let delay = self.initial_delay.as_secs_f64() * factor;
        Duration::from_secs_f64(delay.min(self.max_delay.as_secs_f64()))
    }
}

impl ClcClient {
    /// Register interest in operation `id` and deliver its terminal status on `tx`
    ///
    /// Errors returned here are registration failures (bad id, not
    /// authenticated, first status read failed); nothing is sent on `tx` in
    /// that case. Otherwise exactly one message is sent, unless the receiver
    /// is dropped first.
    pub async fn poll(&self, id: &str, tx: mpsc::Sender<StatusUpdate>) -> Result<()> {
        if id.is_empty() {
            return Err(SdkError::InvalidConfig("status id must not be empty".to_string()));
        }

        let first = self.get_status(id).await?;
        tracing::debug!("Status of {}: {}", id, first.status);

        if first.is_complete() {
            if tx.send(Ok(first)).await.is_err() {
                tracing::debug!("Status receiver for {} dropped", id);
            }
            return Ok(());
        }

        let client = self.clone();
        let id = id.to_string();
        tokio::spawn(async move {
            if let Some(update) = client.poll_until_complete(&id, &tx).await {
                if tx.send(update).await.is_err() {
                    tracing::debug!("Status receiver for {} dropped", id);
                }
            }
        });

        Ok(())
    }

    /// Returns `None` when the receiver went away before completion
    async fn poll_until_complete(
        &self,
        id: &str,
        tx: &mpsc::Sender<StatusUpdate>,
    ) -> Option<StatusUpdate> {
        let retry = &self.poll_config().retry;
        let mut failures = 0u32;

        loop {
            let delay = if failures == 0 {
                self.poll_config().interval
            } else {
                retry.delay_for_attempt(failures - 1)
            };

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = tx.closed() => {
                    tracing::debug!("Stopped polling {}: receiver dropped", id);
                    return None;
                }
            }

            match self.get_status(id).await {
                Ok(status) if status.is_complete() => {
                    tracing::debug!("Operation {} finished: {}", id, status.status);
                    return Some(Ok(status));
                }
                Ok(status) => {
                    tracing::debug!("Operation {} still {}", id, status.status);
                    failures = 0;
                }
                Err(e) => {
                    failures += 1;
                    tracing::warn!(
                        "Status read for {} failed ({}/{}): {}",
                        id,
                        failures,
                        retry.max_attempts,
                        e
                    );
                    if failures >= retry.max_attempts {
                        return Some(Err(SdkError::PollFailed {
                            id: id.to_string(),
                            attempts: failures,
                            message: e.to_string(),
                        }));
                    }
                }
            }
        }
    }
}

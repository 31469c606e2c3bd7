//! # Retry Executor
//!
//! Runs one remote call with bounded retries and exponential backoff.
//!
//! A call is described by a [`RemoteCall`] value that owns its parameters, so
//! the executor can replay it without re-borrowing caller state. Failures are
//! classified once, here, for every operation the façade performs:
//!
//! | Failure | Outcome |
//! |---------|---------|
//! | timeout | retry |
//! | HTTP 429, 500, 503 | retry |
//! | any other HTTP status | fail immediately |
//! | transport, I/O, decode | retry |
//!
//! The delay before retry `n` (0-based) is `base_delay * 2^n`. The executor
//! never touches a cache.

use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::storage::RemoteFileClient;
use core_runtime::config::DriveConfig;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::error::{DriveError, Result};

/// HTTP statuses worth another attempt.
pub const RETRYABLE_STATUSES: [u16; 3] = [429, 500, 503];

/// A single remote call the executor may replay.
#[async_trait]
pub trait RemoteCall: Send + Sync {
    type Output: Send;

    /// Operation name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Perform exactly one attempt.
    async fn call(&self, client: &dyn RemoteFileClient) -> BridgeResult<Self::Output>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Retryable,
    Fatal,
}

pub fn classify(error: &BridgeError) -> Classification {
    match error {
        BridgeError::Timeout(_) => Classification::Retryable,
        BridgeError::Status { status, .. } if RETRYABLE_STATUSES.contains(status) => {
            Classification::Retryable
        }
        BridgeError::Status { .. } => Classification::Fatal,
        _ => Classification::Retryable,
    }
}

/// Executes [`RemoteCall`]s against one client.
pub struct RetryExecutor {
    client: Arc<dyn RemoteFileClient>,
    max_retries: u32,
    base_delay: Duration,
}

impl RetryExecutor {
    /// `max_retries` is the total number of attempts; values below 1 are treated as 1.
    pub fn new(client: Arc<dyn RemoteFileClient>, max_retries: u32, base_delay: Duration) -> Self {
        Self {
            client,
            max_retries: max_retries.max(1),
            base_delay,
        }
    }

    pub fn from_config(client: Arc<dyn RemoteFileClient>, config: &DriveConfig) -> Self {
        Self::new(client, config.max_retries, config.base_retry_delay)
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Backoff before the retry following attempt `attempt_index`.
    pub fn delay_for(&self, attempt_index: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempt_index))
    }

    /// Run `call` until it succeeds, fails fatally or runs out of attempts.
    pub async fn execute<C>(&self, call: &C) -> Result<C::Output>
    where
        C: RemoteCall + ?Sized,
    {
        let operation = call.name();
        let mut attempt_index = 0;

        loop {
            let attempts = attempt_index + 1;

            let error = match call.call(self.client.as_ref()).await {
                Ok(output) => {
                    if attempt_index > 0 {
                        debug!(operation, attempts, "Remote call succeeded after retry");
                    }
                    return Ok(output);
                }
                Err(error) => error,
            };

            if classify(&error) == Classification::Fatal {
                warn!(operation, attempts, error = %error, "Remote call rejected");
                return Err(DriveError::Rejected {
                    operation,
                    attempts,
                    source: error,
                });
            }

            if attempts >= self.max_retries {
                warn!(operation, attempts, error = %error, "Remote call failed, retries exhausted");
                return Err(DriveError::RetriesExhausted {
                    operation,
                    attempts,
                    last: error,
                });
            }

            let delay = self.delay_for(attempt_index);
            warn!(
                operation,
                attempt = attempts,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "Remote call failed, retrying"
            );
            sleep(delay).await;
            attempt_index += 1;
        }
    }
}

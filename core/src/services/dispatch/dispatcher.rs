//! Bounded, strictly sequential SMS retry

use lc_shared::phone::mask_phone_number;
use lc_shared::DispatchConfig;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use super::traits::{SmsError, SmsSender};

/// Successful dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReceipt {
    /// Provider message id
    pub message_id: String,
    /// Attempts it took, starting at 1
    pub attempts: u32,
    /// Provider that accepted the message
    pub provider: String,
}

/// Dispatch that failed after every allowed attempt
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("SMS dispatch via {provider} failed after {attempts} attempt(s): {last_error}")]
pub struct DispatchError {
    pub attempts: u32,
    pub provider: String,
    pub last_error: SmsError,
}

/// Wraps an [`SmsSender`] with retry and linear backoff
///
/// Attempt `n` is followed, on a retryable failure, by a pause of
/// `min(retry_delay × n, max_delay)`. A new attempt only starts once the
/// previous one has returned, so a message is never in flight twice.
pub struct RetryingDispatcher {
    sender: Arc<dyn SmsSender>,
    config: DispatchConfig,
}

impl RetryingDispatcher {
    pub fn new(sender: Arc<dyn SmsSender>, config: DispatchConfig) -> Self {
        Self { sender, config }
    }

    /// Send `message` to `phone`, retrying transient failures
    ///
    /// # Returns
    /// * `Ok(DispatchReceipt)` - The provider accepted the message
    /// * `Err(DispatchError)` - Attempts ran out or the failure was permanent
    pub async fn send(&self, phone: &str, message: &str) -> Result<DispatchReceipt, DispatchError> {
        let max_attempts = self.config.retry_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            let result = self.sender.send(phone, message).await;
            // Read after the send: a failover sender reports whoever handled it
            let provider = self.sender.provider_name().to_string();

            match result {
                Ok(message_id) => {
                    debug!(
                        phone = %mask_phone_number(phone),
                        provider = %provider,
                        attempt = attempt,
                        message_id = %message_id,
                        event = "sms_dispatched",
                        "SMS accepted by provider"
                    );
                    return Ok(DispatchReceipt {
                        message_id,
                        attempts: attempt,
                        provider,
                    });
                }
                Err(e) if e.is_retryable() && attempt < max_attempts => {
                    let delay = self.backoff(attempt);
                    warn!(
                        phone = %mask_phone_number(phone),
                        provider = %provider,
                        error = %e,
                        attempt = attempt,
                        max_attempts = max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        event = "sms_dispatch_retry",
                        "SMS send failed, retrying..."
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    warn!(
                        phone = %mask_phone_number(phone),
                        provider = %provider,
                        error = %e,
                        attempt = attempt,
                        retryable = e.is_retryable(),
                        event = "sms_dispatch_failed",
                        "SMS send failed, giving up"
                    );
                    return Err(DispatchError {
                        attempts: attempt,
                        provider,
                        last_error: e,
                    });
                }
            }
        }
    }

    /// Pause after failed attempt number `attempt`
    pub fn backoff(&self, attempt: u32) -> Duration {
        let millis = self
            .config
            .retry_delay_ms
            .saturating_mul(attempt as u64)
            .min(self.config.max_delay_ms);
        Duration::from_millis(millis)
    }

    /// Name of the underlying provider
    pub fn provider_name(&self) -> &str {
        self.sender.provider_name()
    }

    /// Health of the underlying provider
    pub async fn health_check(&self) -> bool {
        self.sender.health_check().await
    }
}

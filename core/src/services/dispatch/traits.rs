//! SMS sender seam

use async_trait::async_trait;
use thiserror::Error;

/// Failure reported by an SMS provider adapter
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SmsError {
    /// The provider rejected the recipient number
    #[error("Invalid recipient: {0}")]
    InvalidRecipient(String),

    /// The provider rejected the request itself (credentials, sender number, payload)
    #[error("Request rejected: {0}")]
    Rejected(String),

    /// Network failure or timeout before the provider answered
    #[error("Transport error: {0}")]
    Transport(String),

    /// The provider answered with a server-side error
    #[error("Provider error: {0}")]
    Provider(String),

    /// The provider asked us to slow down
    #[error("Provider rate limit: {0}")]
    RateLimited(String),
}

impl SmsError {
    /// Whether sending the same message again might succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SmsError::Transport(_) | SmsError::Provider(_) | SmsError::RateLimited(_)
        )
    }
}

/// Trait for SMS provider integration
#[async_trait]
pub trait SmsSender: Send + Sync {
    /// Send `message` to `phone`
    ///
    /// # Arguments
    /// * `phone` - Normalized domestic phone number (digits only)
    /// * `message` - Message body
    ///
    /// # Returns
    /// * `Ok(String)` - Provider message id
    /// * `Err(SmsError)` - Delivery was not accepted
    async fn send(&self, phone: &str, message: &str) -> Result<String, SmsError>;

    /// Whether the provider currently looks reachable
    async fn health_check(&self) -> bool {
        true
    }

    /// Name used for logging and unit cost lookup
    fn provider_name(&self) -> &str;
}
